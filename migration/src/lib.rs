pub use sea_orm_migration::prelude::*;

mod m20241020_000001_create_users_and_follows;
mod m20241020_000002_create_posts;
mod m20241020_000003_create_hashtags;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241020_000001_create_users_and_follows::Migration),
            Box::new(m20241020_000002_create_posts::Migration),
            Box::new(m20241020_000003_create_hashtags::Migration),
        ]
    }
}
