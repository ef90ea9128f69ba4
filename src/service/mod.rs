//! Domain operations over the relational store.
//!
//! Every operation that touches more than one row to keep an invariant
//! (follow counters, like counters, hashtag links, images) runs inside a
//! single [`sea_orm::DatabaseTransaction`]. Returning early with `?` drops the
//! transaction, which rolls it back.

mod account;
mod comment;
mod follow;
mod hashtag;
mod like;
mod post;
mod view;

pub use account::{
    AccountService, Credentials, NewUser, PasswordChange, ProfileUpdate, EMAIL_MAX_LEN,
    USERNAME_MAX_LEN,
};
pub use comment::CommentService;
pub use follow::FollowService;
pub use hashtag::{extract_hashtags, HashtagService};
pub use like::{LikeService, LikeToggle};
pub use post::{NewImage, NewPost, PostFilter, PostService, PostUpdate, SortBy};
pub use view::{PostView, UserView};

pub use crate::error::{Conflict, Error, Invalid, Resource, Result};

/// Offset pagination shared by every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Page {
    pub const DEFAULT_LIMIT: u64 = 100;
    pub const MAX_LIMIT: u64 = 100;

    pub fn new(skip: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            skip: skip.unwrap_or(0),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .min(Self::MAX_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Reject blank text input.
pub(crate) fn non_blank(content: String) -> Result<String> {
    if content.trim().is_empty() {
        Err(Invalid::EmptyContent.into())
    } else {
        Ok(content)
    }
}
