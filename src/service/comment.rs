use super::{non_blank, post::find_post, Error, Page, Resource, Result};
use chrono::Utc;
use entity::comment;
use sea_orm::{entity::*, query::*, DbConn};

#[derive(Debug)]
pub struct CommentService;

impl CommentService {
    pub async fn add_comment(
        db: &DbConn,
        author: i32,
        post_id: i32,
        content: String,
    ) -> Result<comment::Model> {
        let content = non_blank(content)?;
        find_post(db, post_id).await?;

        let comment = comment::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(author),
            content: Set(content),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(comment_id = comment.comment_id, post_id, author, "comment added");
        Ok(comment)
    }

    /// Comments of a post in the order they were written.
    pub async fn list_comments(db: &DbConn, post_id: i32, page: Page) -> Result<Vec<comment::Model>> {
        find_post(db, post_id).await?;

        Ok(comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::CommentId)
            .offset(page.skip)
            .limit(page.limit)
            .all(db)
            .await?)
    }

    pub async fn update_comment(
        db: &DbConn,
        actor: i32,
        comment_id: i32,
        content: String,
    ) -> Result<comment::Model> {
        let comment = find_owned_comment(db, actor, comment_id).await?;
        let content = non_blank(content)?;

        let mut comment: comment::ActiveModel = comment.into();
        comment.content = Set(content);
        Ok(comment.update(db).await?)
    }

    pub async fn delete_comment(db: &DbConn, actor: i32, comment_id: i32) -> Result<()> {
        let comment = find_owned_comment(db, actor, comment_id).await?;
        comment.delete(db).await?;

        tracing::info!(comment_id, actor, "comment deleted");
        Ok(())
    }
}

async fn find_owned_comment(db: &DbConn, actor: i32, comment_id: i32) -> Result<comment::Model> {
    let comment = comment::Entity::find_by_id(comment_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound(Resource::Comment))?;
    if comment.user_id != actor {
        return Err(Error::Forbidden(Resource::Comment));
    }
    Ok(comment)
}
