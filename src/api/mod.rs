//! HTTP surface. Handlers are thin: they resolve the caller, call one service
//! operation and serialize its result.

mod comments;
mod error;
mod extract;
mod posts;
mod tags;
mod users;

pub use error::ApiError;
pub use extract::{AuthUser, Form, Json, MaybeAuthUser, Path, Query};

use crate::{auth::TokenIssuer, service::Page, storage::BlobStore};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Upper bound for a request body, multipart uploads included.
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub store: Arc<dyn BlobStore>,
    pub tokens: TokenIssuer,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

/// Every API route, with request tracing and the body limit applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(users::routes())
        .merge(posts::routes())
        .merge(comments::routes())
        .merge(tags::routes())
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origins. Origins that are not valid header
/// values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::HEAD,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to Micro SNS Backend!" }))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageParams {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl From<PageParams> for Page {
    fn from(params: PageParams) -> Self {
        Page::new(params.skip, params.limit)
    }
}
