use super::{
    account::find_user,
    view::{user_views, UserView},
    Conflict, Error, Page, Result,
};
use chrono::Utc;
use entity::{follow, user};
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ConnectionTrait, DbConn, JoinType, TransactionTrait,
};

#[derive(Debug)]
pub struct FollowService;

impl FollowService {
    /// Add the edge `actor -> target` and bump both counters.
    pub async fn follow(db: &DbConn, actor: i32, target: i32) -> Result<()> {
        if actor == target {
            return Err(Conflict::SelfFollow.into());
        }

        let txn = db.begin().await?;
        find_user(&txn, target).await?;

        let existing = follow::Entity::find_by_id((actor, target))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(Conflict::AlreadyFollowing.into());
        }

        follow::ActiveModel {
            follower_id: Set(actor),
            following_id: Set(target),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|err| Error::unique_or(err, Conflict::AlreadyFollowing))?;

        adjust_count(&txn, actor, user::Column::FollowingCount, 1).await?;
        adjust_count(&txn, target, user::Column::FollowerCount, 1).await?;
        txn.commit().await?;

        tracing::info!(actor, target, "followed");
        Ok(())
    }

    /// Remove the edge `actor -> target` and drop both counters.
    pub async fn unfollow(db: &DbConn, actor: i32, target: i32) -> Result<()> {
        let txn = db.begin().await?;
        find_user(&txn, target).await?;

        let res = follow::Entity::delete_by_id((actor, target))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(Conflict::NotFollowing.into());
        }

        adjust_count(&txn, actor, user::Column::FollowingCount, -1).await?;
        adjust_count(&txn, target, user::Column::FollowerCount, -1).await?;
        txn.commit().await?;

        tracing::info!(actor, target, "unfollowed");
        Ok(())
    }

    /// Users following `user_id`, most recent first.
    pub async fn list_followers(
        db: &DbConn,
        viewer: Option<i32>,
        user_id: i32,
        page: Page,
    ) -> Result<Vec<UserView>> {
        find_user(db, user_id).await?;

        let users = user::Entity::find()
            .join(JoinType::InnerJoin, follow::Relation::Follower.def().rev())
            .filter(follow::Column::FollowingId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .order_by_asc(user::Column::UserId)
            .offset(page.skip)
            .limit(page.limit)
            .all(db)
            .await?;

        user_views(db, viewer, users).await
    }

    /// Users `user_id` follows, most recent first.
    pub async fn list_following(
        db: &DbConn,
        viewer: Option<i32>,
        user_id: i32,
        page: Page,
    ) -> Result<Vec<UserView>> {
        find_user(db, user_id).await?;

        let users = user::Entity::find()
            .join(JoinType::InnerJoin, follow::Relation::Following.def().rev())
            .filter(follow::Column::FollowerId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .order_by_asc(user::Column::UserId)
            .offset(page.skip)
            .limit(page.limit)
            .all(db)
            .await?;

        user_views(db, viewer, users).await
    }
}

/// `column += delta` for one user, evaluated by the store.
async fn adjust_count<C>(db: &C, user_id: i32, column: user::Column, delta: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    user::Entity::update_many()
        .col_expr(column, Expr::col(column).add(delta))
        .filter(user::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(())
}
