use entity::{comment, like, post, post_image, user};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(post::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(post::Column::PostId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(post::Column::UserId).integer().not_null())
                    .col(ColumnDef::new(post::Column::Content).text().not_null())
                    .col(
                        ColumnDef::new(post::Column::LikeCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(post::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_user")
                            .from(post::Entity, post::Column::UserId)
                            .to(user::Entity, user::Column::UserId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_posts_user_id")
                    .table(post::Entity)
                    .col(post::Column::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_posts_created_at")
                    .table(post::Entity)
                    .col(post::Column::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(comment::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(comment::Column::CommentId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(comment::Column::PostId).integer().not_null())
                    .col(ColumnDef::new(comment::Column::UserId).integer().not_null())
                    .col(ColumnDef::new(comment::Column::Content).text().not_null())
                    .col(
                        ColumnDef::new(comment::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_post")
                            .from(comment::Entity, comment::Column::PostId)
                            .to(post::Entity, post::Column::PostId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_user")
                            .from(comment::Entity, comment::Column::UserId)
                            .to(user::Entity, user::Column::UserId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(like::Entity)
                    .if_not_exists()
                    .col(ColumnDef::new(like::Column::UserId).integer().not_null())
                    .col(ColumnDef::new(like::Column::PostId).integer().not_null())
                    .col(
                        ColumnDef::new(like::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(like::Column::UserId)
                            .col(like::Column::PostId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_likes_user")
                            .from(like::Entity, like::Column::UserId)
                            .to(user::Entity, user::Column::UserId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_likes_post")
                            .from(like::Entity, like::Column::PostId)
                            .to(post::Entity, post::Column::PostId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(post_image::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(post_image::Column::ImageId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(post_image::Column::PostId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(post_image::Column::Url)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(post_image::Column::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_images_post")
                            .from(post_image::Entity, post_image::Column::PostId)
                            .to(post::Entity, post::Column::PostId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(post_image::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(like::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(comment::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(post::Entity).to_owned())
            .await
    }
}
