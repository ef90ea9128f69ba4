//! SeaORM entities of the Micro SNS schema.
//!
//! `follower_count`, `following_count` and `like_count` are denormalized
//! counters. They are only written by the follow and like operations of the
//! service layer, in the same transaction as the rows they count.

pub mod prelude;

pub mod comment;
pub mod follow;
pub mod hashtag;
pub mod like;
pub mod post;
pub mod post_hashtag;
pub mod post_image;
pub mod user;
