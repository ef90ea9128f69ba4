#![allow(dead_code)]

use micro_sns::{
    api::{self, AppState},
    auth::TokenIssuer,
    service::{AccountService, NewImage, NewPost, NewUser, PostService, PostView},
    storage::{image_extension, BlobStore},
};
use entity::{post, user};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection, EntityTrait};
use std::{
    collections::BTreeMap,
    io,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

pub const PASSWORD: &str = "correct horse battery staple";

/// Blob store kept in memory. Optionally fails every write after the first
/// `fail_after` ones.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
    next: AtomicUsize,
    fail_after: Option<usize>,
}

impl MemoryBlobStore {
    pub fn failing_after(writes: usize) -> Self {
        Self {
            fail_after: Some(writes),
            ..Default::default()
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.blobs.lock().unwrap().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, content_type: &str, bytes: &[u8]) -> io::Result<String> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| n >= limit) {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        let ext = image_extension(content_type)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "not an image"))?;
        let path = format!("/uploads/{n}.{ext}");
        self.blobs.lock().unwrap().insert(path.clone(), bytes.to_vec());
        Ok(path)
    }

    async fn remove(&self, path: &str) -> io::Result<()> {
        match self.blobs.lock().unwrap().remove(path) {
            Some(_) => Ok(()),
            None => Err(io::ErrorKind::NotFound.into()),
        }
    }
}

pub struct TestContext {
    pub db: DatabaseConnection,
    pub store: Arc<MemoryBlobStore>,
    pub tokens: TokenIssuer,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_store(MemoryBlobStore::default()).await
    }

    pub async fn with_store(store: MemoryBlobStore) -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        Self {
            db,
            store: Arc::new(store),
            tokens: TokenIssuer::new("test-secret", chrono::Duration::minutes(30)),
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            db: self.db.clone(),
            store: self.store.clone(),
            tokens: self.tokens.clone(),
        }
    }

    pub fn router(&self) -> axum::Router {
        api::router(self.state())
    }

    /// Register `name` with email `<name>@example.com` and [`PASSWORD`].
    pub async fn user(&self, name: &str) -> user::Model {
        AccountService::register(
            &self.db,
            NewUser {
                email: format!("{name}@example.com"),
                username: name.to_owned(),
                password: PASSWORD.to_owned(),
                bio: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn post(&self, author: &user::Model, content: &str) -> PostView {
        PostService::create_post(
            &self.db,
            self.store.as_ref(),
            author.user_id,
            NewPost {
                content: content.to_owned(),
                images: Vec::new(),
            },
        )
        .await
        .unwrap()
    }

    pub fn bearer(&self, user: &user::Model) -> String {
        format!("Bearer {}", self.tokens.issue(user.user_id).unwrap().access_token)
    }

    pub async fn reload_user(&self, user_id: i32) -> Option<user::Model> {
        user::Entity::find_by_id(user_id).one(&self.db).await.unwrap()
    }

    pub async fn reload_post(&self, post_id: i32) -> Option<post::Model> {
        post::Entity::find_by_id(post_id).one(&self.db).await.unwrap()
    }
}

pub fn png(bytes: &[u8]) -> NewImage {
    NewImage::new("image/png", bytes)
}
