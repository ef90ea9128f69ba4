use entity::{hashtag, post, post_hashtag};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(hashtag::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(hashtag::Column::HashtagId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(hashtag::Column::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(post_hashtag::Entity)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(post_hashtag::Column::PostId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(post_hashtag::Column::HashtagId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(post_hashtag::Column::PostId)
                            .col(post_hashtag::Column::HashtagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_hashtags_post")
                            .from(post_hashtag::Entity, post_hashtag::Column::PostId)
                            .to(post::Entity, post::Column::PostId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_hashtags_hashtag")
                            .from(post_hashtag::Entity, post_hashtag::Column::HashtagId)
                            .to(hashtag::Entity, hashtag::Column::HashtagId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(post_hashtag::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(hashtag::Entity).to_owned())
            .await
    }
}
