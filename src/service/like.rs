use super::{
    account::find_user,
    post::find_post,
    view::{post_views, PostView},
    Conflict, Error, Page, Result,
};
use chrono::Utc;
use entity::{like, post};
use sea_orm::{entity::*, query::*, sea_query::Expr, DbConn, TransactionTrait};
use serde::Serialize;
use std::collections::HashMap;

/// Outcome of [`LikeService::toggle_like`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeToggle {
    pub liked: bool,
    pub like_count: i32,
}

#[derive(Debug)]
pub struct LikeService;

impl LikeService {
    /// Like the post if `actor` has not liked it yet, unlike it otherwise.
    ///
    /// The like row and `posts.like_count` change in one transaction. Two
    /// racing likes by the same user are settled by the primary key of
    /// `likes`: the loser fails with [`Conflict::AlreadyLiked`].
    pub async fn toggle_like(db: &DbConn, actor: i32, post_id: i32) -> Result<LikeToggle> {
        let txn = db.begin().await?;
        find_post(&txn, post_id).await?;

        let removed = like::Entity::delete_many()
            .filter(like::Column::UserId.eq(actor))
            .filter(like::Column::PostId.eq(post_id))
            .exec(&txn)
            .await?
            .rows_affected;

        let liked = if removed > 0 {
            false
        } else {
            like::ActiveModel {
                user_id: Set(actor),
                post_id: Set(post_id),
                created_at: Set(Utc::now()),
            }
            .insert(&txn)
            .await
            .map_err(|err| Error::unique_or(err, Conflict::AlreadyLiked))?;
            true
        };

        let delta = if liked { 1 } else { -1 };
        post::Entity::update_many()
            .col_expr(
                post::Column::LikeCount,
                Expr::col(post::Column::LikeCount).add(delta),
            )
            .filter(post::Column::PostId.eq(post_id))
            .exec(&txn)
            .await?;

        let like_count = find_post(&txn, post_id).await?.like_count;
        txn.commit().await?;

        tracing::info!(post_id, actor, liked, like_count, "like toggled");
        Ok(LikeToggle { liked, like_count })
    }

    /// Like rows of a post, newest first.
    pub async fn list_likes_for_post(db: &DbConn, post_id: i32, page: Page) -> Result<Vec<like::Model>> {
        find_post(db, post_id).await?;

        Ok(like::Entity::find()
            .filter(like::Column::PostId.eq(post_id))
            .order_by_desc(like::Column::CreatedAt)
            .order_by_asc(like::Column::UserId)
            .offset(page.skip)
            .limit(page.limit)
            .all(db)
            .await?)
    }

    /// Posts liked by `user_id`, most recently liked first.
    pub async fn list_liked_posts_by_user(
        db: &DbConn,
        viewer: Option<i32>,
        user_id: i32,
        page: Page,
    ) -> Result<Vec<PostView>> {
        find_user(db, user_id).await?;

        let post_ids: Vec<i32> = like::Entity::find()
            .select_only()
            .column(like::Column::PostId)
            .filter(like::Column::UserId.eq(user_id))
            .order_by_desc(like::Column::CreatedAt)
            .order_by_desc(like::Column::PostId)
            .offset(page.skip)
            .limit(page.limit)
            .into_tuple()
            .all(db)
            .await?;
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut posts: HashMap<i32, post::Model> = post::Entity::find()
            .filter(post::Column::PostId.is_in(post_ids.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|post| (post.post_id, post))
            .collect();
        let posts = post_ids
            .iter()
            .filter_map(|id| posts.remove(id))
            .collect();

        post_views(db, viewer, posts).await
    }
}
