#![deny(
    missing_debug_implementations,
    clippy::print_stderr,
    clippy::print_stdout
)]

//! # Micro SNS
//!
//! A small social network backend: accounts, posts with images and hashtags,
//! comments, likes and follows, served over a JSON API.
//!
//! The crate is split the way a SeaORM application usually is:
//!
//! - [`entity`] and [`migration`] (separate workspace crates) hold the schema
//! - [`service`] holds every domain operation, each taking a connection
//!   (and, where it needs one, the resolved caller id)
//! - [`api`] maps HTTP requests onto the service layer
//!
//! ```no_run
//! use micro_sns::{
//!     auth::TokenIssuer,
//!     service::{AccountService, NewUser},
//! };
//! use sea_orm::Database;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite::memory:").await?;
//! let tokens = TokenIssuer::new("secret", chrono::Duration::minutes(30));
//!
//! let user = AccountService::register(
//!     &db,
//!     NewUser {
//!         email: "alice@example.com".to_owned(),
//!         username: "alice".to_owned(),
//!         password: "hunter2".to_owned(),
//!         bio: None,
//!     },
//! )
//! .await?;
//! let token = tokens.issue(user.user_id)?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod service;
pub mod storage;

pub use entity;
pub use migration;
