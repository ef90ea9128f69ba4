//! Per-caller annotations of listings.
//!
//! Each annotation is one batched query over the whole listing, never one
//! query per row.

use super::Result;
use entity::{follow, hashtag, like, post, post_hashtag, post_image, user};
use sea_orm::{entity::*, query::*, ConnectionTrait};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A user as seen by a (possibly anonymous) viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    #[serde(flatten)]
    pub user: user::Model,
    /// Whether the viewer follows this user; always false for anonymous callers
    pub is_following: bool,
}

/// A post with its images and hashtags, as seen by a (possibly anonymous) viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: post::Model,
    pub images: Vec<String>,
    pub hashtags: Vec<String>,
    /// Whether the viewer likes this post; always false for anonymous callers
    pub is_liked: bool,
}

pub(crate) async fn user_views<C>(
    db: &C,
    viewer: Option<i32>,
    users: Vec<user::Model>,
) -> Result<Vec<UserView>>
where
    C: ConnectionTrait,
{
    let followed: HashSet<i32> = match viewer {
        Some(viewer) if !users.is_empty() => follow::Entity::find()
            .select_only()
            .column(follow::Column::FollowingId)
            .filter(follow::Column::FollowerId.eq(viewer))
            .filter(follow::Column::FollowingId.is_in(users.iter().map(|u| u.user_id)))
            .into_tuple::<i32>()
            .all(db)
            .await?
            .into_iter()
            .collect(),
        _ => HashSet::new(),
    };

    Ok(users
        .into_iter()
        .map(|user| UserView {
            is_following: followed.contains(&user.user_id),
            user,
        })
        .collect())
}

pub(crate) async fn user_view<C>(db: &C, viewer: Option<i32>, user: user::Model) -> Result<UserView>
where
    C: ConnectionTrait,
{
    let mut views = user_views(db, viewer, vec![user]).await?;
    Ok(views.remove(0))
}

pub(crate) async fn post_views<C>(
    db: &C,
    viewer: Option<i32>,
    posts: Vec<post::Model>,
) -> Result<Vec<PostView>>
where
    C: ConnectionTrait,
{
    if posts.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = posts.iter().map(|p| p.post_id).collect();

    let mut images: HashMap<i32, Vec<String>> = HashMap::new();
    for image in post_image::Entity::find()
        .filter(post_image::Column::PostId.is_in(ids.clone()))
        .order_by_asc(post_image::Column::ImageId)
        .all(db)
        .await?
    {
        images.entry(image.post_id).or_default().push(image.url);
    }

    let mut hashtags: HashMap<i32, Vec<String>> = HashMap::new();
    for (link, tag) in post_hashtag::Entity::find()
        .filter(post_hashtag::Column::PostId.is_in(ids.clone()))
        .find_also_related(hashtag::Entity)
        .order_by_asc(hashtag::Column::HashtagId)
        .all(db)
        .await?
    {
        if let Some(tag) = tag {
            hashtags.entry(link.post_id).or_default().push(tag.name);
        }
    }

    let liked: HashSet<i32> = match viewer {
        Some(viewer) => like::Entity::find()
            .select_only()
            .column(like::Column::PostId)
            .filter(like::Column::UserId.eq(viewer))
            .filter(like::Column::PostId.is_in(ids))
            .into_tuple::<i32>()
            .all(db)
            .await?
            .into_iter()
            .collect(),
        None => HashSet::new(),
    };

    Ok(posts
        .into_iter()
        .map(|post| PostView {
            images: images.remove(&post.post_id).unwrap_or_default(),
            hashtags: hashtags.remove(&post.post_id).unwrap_or_default(),
            is_liked: liked.contains(&post.post_id),
            post,
        })
        .collect())
}

pub(crate) async fn post_view<C>(db: &C, viewer: Option<i32>, post: post::Model) -> Result<PostView>
where
    C: ConnectionTrait,
{
    let mut views = post_views(db, viewer, vec![post]).await?;
    Ok(views.remove(0))
}
