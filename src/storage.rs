//! Blob store for post images.

use std::{
    io,
    path::PathBuf,
};
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

/// Image MIME types accepted for upload, with the file extension they are
/// stored under.
pub const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// Extension for an allowed image type, `None` for anything else.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

/// Persists uploaded bytes and hands out a stable retrieval path.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` and return the path they can be fetched from.
    async fn put(&self, content_type: &str, bytes: &[u8]) -> io::Result<String>;

    /// Remove a blob previously returned by [`BlobStore::put`].
    async fn remove(&self, path: &str) -> io::Result<()>;
}

/// Writes blobs to a local directory that is served under `public_prefix`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_prefix: "/uploads".to_owned(),
        }
    }

    fn local_path(&self, path: &str) -> io::Result<PathBuf> {
        let name = path
            .strip_prefix(&self.public_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| {
                !name.is_empty()
                    && !name.starts_with('.')
                    && !name.contains(|c: char| c == '/' || c == '\\')
            })
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("not a blob path: {path}"))
            })?;
        Ok(self.root.join(name))
    }
}

#[async_trait::async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, content_type: &str, bytes: &[u8]) -> io::Result<String> {
        let ext = image_extension(content_type).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unsupported content type: {content_type}"),
            )
        })?;
        fs::create_dir_all(&self.root).await?;

        let name = format!("{}.{ext}", Uuid::new_v4());
        let mut f = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(self.root.join(&name))
            .await?;
        f.write_all(bytes).await?;
        f.flush().await?;

        Ok(format!("{}/{name}", self.public_prefix))
    }

    async fn remove(&self, path: &str) -> io::Result<()> {
        fs::remove_file(self.local_path(path)?).await
    }
}
