use super::{
    hashtag::HashtagService,
    non_blank,
    view::{post_view, post_views, PostView},
    Error, Invalid, Page, Resource, Result,
};
use crate::storage::{image_extension, BlobStore};
use chrono::{Duration, Utc};
use entity::{comment, follow, like, post, post_hashtag, post_image};
use sea_orm::{entity::*, query::*, ConnectionTrait, DbConn, DatabaseTransaction, TransactionTrait};
use serde::Deserialize;

/// How far back trending looks.
pub const TRENDING_WINDOW_DAYS: i64 = 7;

/// An uploaded file as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl NewImage {
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPost {
    pub content: String,
    pub images: Vec<NewImage>,
}

/// New content for a post. `images` are appended to the ones it already has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostUpdate {
    pub content: String,
    pub images: Vec<NewImage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Likes,
    /// Also what any unrecognized value means.
    #[default]
    #[serde(other)]
    Latest,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub owner_id: Option<i32>,
    pub sort_by: SortBy,
}

#[derive(Debug)]
pub struct PostService;

impl PostService {
    /// Insert a post together with its hashtag links and images.
    ///
    /// Every image is checked against the allow-list before anything is
    /// written; one bad file rejects the whole post.
    pub async fn create_post(
        db: &DbConn,
        store: &dyn BlobStore,
        author: i32,
        new_post: NewPost,
    ) -> Result<PostView> {
        let content = non_blank(new_post.content)?;
        check_images(&new_post.images)?;

        let txn = db.begin().await?;

        let post = post::ActiveModel {
            user_id: Set(author),
            content: Set(content),
            like_count: Set(0),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        HashtagService::relink(&txn, post.post_id, &post.content).await?;
        Self::commit_with_images(txn, store, post.post_id, &new_post.images).await?;

        tracing::info!(post_id = post.post_id, author, "post created");
        post_view(db, Some(author), post).await
    }

    pub async fn get_post(db: &DbConn, viewer: Option<i32>, post_id: i32) -> Result<PostView> {
        let post = find_post(db, post_id).await?;
        post_view(db, viewer, post).await
    }

    /// Replace the content of a post owned by `actor`, re-deriving its
    /// hashtags from scratch.
    pub async fn update_post(
        db: &DbConn,
        store: &dyn BlobStore,
        actor: i32,
        post_id: i32,
        update: PostUpdate,
    ) -> Result<PostView> {
        let txn = db.begin().await?;
        let post = find_owned_post(&txn, actor, post_id).await?;

        let content = non_blank(update.content)?;
        check_images(&update.images)?;

        let mut post: post::ActiveModel = post.into();
        post.content = Set(content);
        let post = post.update(&txn).await?;

        HashtagService::relink(&txn, post.post_id, &post.content).await?;
        Self::commit_with_images(txn, store, post.post_id, &update.images).await?;

        tracing::info!(post_id, actor, "post updated");
        post_view(db, Some(actor), post).await
    }

    /// Delete a post owned by `actor` along with its comments, likes, images
    /// and hashtag links.
    pub async fn delete_post(
        db: &DbConn,
        store: &dyn BlobStore,
        actor: i32,
        post_id: i32,
    ) -> Result<()> {
        let txn = db.begin().await?;
        find_owned_post(&txn, actor, post_id).await?;

        let blobs = purge_posts(&txn, vec![post_id]).await?;
        txn.commit().await?;

        discard_blobs(store, &blobs).await;
        tracing::info!(post_id, actor, "post deleted");
        Ok(())
    }

    pub async fn list_posts(
        db: &DbConn,
        viewer: Option<i32>,
        filter: PostFilter,
        page: Page,
    ) -> Result<Vec<PostView>> {
        let mut query = post::Entity::find();
        if let Some(owner_id) = filter.owner_id {
            query = query.filter(post::Column::UserId.eq(owner_id));
        }
        let query = match filter.sort_by {
            SortBy::Latest => query,
            SortBy::Likes => query.order_by_desc(post::Column::LikeCount),
        };

        let posts = newest_first(query)
            .offset(page.skip)
            .limit(page.limit)
            .all(db)
            .await?;

        post_views(db, viewer, posts).await
    }

    /// Posts by everyone `actor` follows, newest first.
    pub async fn feed(db: &DbConn, actor: i32, page: Page) -> Result<Vec<PostView>> {
        let following: Vec<i32> = follow::Entity::find()
            .select_only()
            .column(follow::Column::FollowingId)
            .filter(follow::Column::FollowerId.eq(actor))
            .into_tuple()
            .all(db)
            .await?;
        if following.is_empty() {
            return Ok(Vec::new());
        }

        let posts = newest_first(post::Entity::find().filter(post::Column::UserId.is_in(following)))
            .offset(page.skip)
            .limit(page.limit)
            .all(db)
            .await?;

        post_views(db, Some(actor), posts).await
    }

    /// Posts from the last [`TRENDING_WINDOW_DAYS`] days, most liked first.
    pub async fn trending(db: &DbConn, viewer: Option<i32>, page: Page) -> Result<Vec<PostView>> {
        let since = Utc::now() - Duration::days(TRENDING_WINDOW_DAYS);

        let posts = newest_first(
            post::Entity::find()
                .filter(post::Column::CreatedAt.gte(since))
                .order_by_desc(post::Column::LikeCount),
        )
        .offset(page.skip)
        .limit(page.limit)
        .all(db)
        .await?;

        post_views(db, viewer, posts).await
    }

    /// Write `images` to the blob store, record them, then commit.
    ///
    /// If anything fails after the first blob is written, the blobs written so
    /// far are removed and the transaction is rolled back.
    async fn commit_with_images(
        txn: DatabaseTransaction,
        store: &dyn BlobStore,
        post_id: i32,
        images: &[NewImage],
    ) -> Result<()> {
        let mut written = Vec::with_capacity(images.len());
        let result = async {
            for image in images {
                let url = store.put(&image.content_type, &image.bytes).await?;
                written.push(url.clone());
                post_image::ActiveModel {
                    post_id: Set(post_id),
                    url: Set(url),
                    created_at: Set(Utc::now()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
            txn.commit().await?;
            Ok::<_, Error>(())
        }
        .await;

        if result.is_err() {
            discard_blobs(store, &written).await;
        }
        result
    }
}

fn check_images(images: &[NewImage]) -> Result<()> {
    match images
        .iter()
        .find(|image| image_extension(&image.content_type).is_none())
    {
        Some(image) => Err(Invalid::UnsupportedMediaType(image.content_type.clone()).into()),
        None => Ok(()),
    }
}

fn newest_first(query: Select<post::Entity>) -> Select<post::Entity> {
    query
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::PostId)
}

pub(crate) async fn find_post<C>(db: &C, post_id: i32) -> Result<post::Model>
where
    C: ConnectionTrait,
{
    post::Entity::find_by_id(post_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound(Resource::Post))
}

async fn find_owned_post<C>(db: &C, actor: i32, post_id: i32) -> Result<post::Model>
where
    C: ConnectionTrait,
{
    let post = find_post(db, post_id).await?;
    if post.user_id != actor {
        return Err(Error::Forbidden(Resource::Post));
    }
    Ok(post)
}

/// Delete posts and every row hanging off them. Returns the blob paths of
/// their images, to be removed once the transaction has committed.
pub(crate) async fn purge_posts<C>(db: &C, post_ids: Vec<i32>) -> Result<Vec<String>>
where
    C: ConnectionTrait,
{
    if post_ids.is_empty() {
        return Ok(Vec::new());
    }

    let blobs: Vec<String> = post_image::Entity::find()
        .select_only()
        .column(post_image::Column::Url)
        .filter(post_image::Column::PostId.is_in(post_ids.clone()))
        .into_tuple()
        .all(db)
        .await?;

    comment::Entity::delete_many()
        .filter(comment::Column::PostId.is_in(post_ids.clone()))
        .exec(db)
        .await?;
    like::Entity::delete_many()
        .filter(like::Column::PostId.is_in(post_ids.clone()))
        .exec(db)
        .await?;
    post_image::Entity::delete_many()
        .filter(post_image::Column::PostId.is_in(post_ids.clone()))
        .exec(db)
        .await?;
    post_hashtag::Entity::delete_many()
        .filter(post_hashtag::Column::PostId.is_in(post_ids.clone()))
        .exec(db)
        .await?;
    let res = post::Entity::delete_many()
        .filter(post::Column::PostId.is_in(post_ids))
        .exec(db)
        .await?;

    tracing::debug!("purged {} posts", res.rows_affected);
    Ok(blobs)
}

/// Best-effort removal of blobs that are no longer referenced.
pub(crate) async fn discard_blobs(store: &dyn BlobStore, paths: &[String]) {
    for path in paths {
        if let Err(err) = store.remove(path).await {
            tracing::warn!("could not remove blob {path}: {err}");
        }
    }
}
