use super::{ApiError, AppState, AuthUser, Json, MaybeAuthUser, PageParams, Path, Query};
use crate::{
    error::Invalid,
    service::{
        LikeService, LikeToggle, NewImage, NewPost, Page, PostFilter, PostService, PostUpdate,
        PostView, SortBy,
    },
};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use entity::like;
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/feed", get(feed))
        .route("/posts/trending", get(trending))
        .route(
            "/posts/{post_id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/posts/{post_id}/like", post(toggle_like))
        .route("/posts/{post_id}/likes", get(list_likes))
}

#[derive(Debug, Deserialize)]
struct ListParams {
    user_id: Option<i32>,
    #[serde(default)]
    sort_by: SortBy,
    skip: Option<u64>,
    limit: Option<u64>,
}

/// Fields of a post form: `content` once, `images` any number of times.
struct PostForm {
    content: Option<String>,
    images: Vec<NewImage>,
}

impl PostForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self {
            content: None,
            images: Vec::new(),
        };

        while let Some(field) = multipart.next_field().await.map_err(ApiError::malformed)? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "content" => {
                    form.content = Some(field.text().await.map_err(ApiError::malformed)?);
                }
                "images" => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_owned();
                    let unnamed = field.file_name().is_none_or(str::is_empty);
                    let bytes = field.bytes().await.map_err(ApiError::malformed)?;
                    // browsers send an empty part when no file was picked
                    if unnamed && bytes.is_empty() {
                        continue;
                    }
                    form.images.push(NewImage::new(content_type, bytes.to_vec()));
                }
                _ => tracing::debug!("ignoring multipart field {name:?}"),
            }
        }

        Ok(form)
    }

    fn content(&mut self) -> Result<String, ApiError> {
        self.content
            .take()
            .ok_or_else(|| ApiError(Invalid::MissingField("content").into()))
    }
}

async fn create_post(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    multipart: Multipart,
) -> Result<Json<PostView>, ApiError> {
    let mut form = PostForm::read(multipart).await?;
    let new_post = NewPost {
        content: form.content()?,
        images: form.images,
    };
    let post = PostService::create_post(&state.db, state.store.as_ref(), actor, new_post).await?;
    Ok(Json(post))
}

async fn list_posts(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<PostView>>, ApiError> {
    let filter = PostFilter {
        owner_id: params.user_id,
        sort_by: params.sort_by,
    };
    let page = Page::new(params.skip, params.limit);
    let posts = PostService::list_posts(&state.db, viewer, filter, page).await?;
    Ok(Json(posts))
}

async fn feed(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<PostView>>, ApiError> {
    let posts = PostService::feed(&state.db, actor, page.into()).await?;
    Ok(Json(posts))
}

async fn trending(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<PostView>>, ApiError> {
    let posts = PostService::trending(&state.db, viewer, page.into()).await?;
    Ok(Json(posts))
}

async fn get_post(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(post_id): Path<i32>,
) -> Result<Json<PostView>, ApiError> {
    let post = PostService::get_post(&state.db, viewer, post_id).await?;
    Ok(Json(post))
}

async fn update_post(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(post_id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<PostView>, ApiError> {
    let mut form = PostForm::read(multipart).await?;
    let update = PostUpdate {
        content: form.content()?,
        images: form.images,
    };
    let post =
        PostService::update_post(&state.db, state.store.as_ref(), actor, post_id, update).await?;
    Ok(Json(post))
}

async fn delete_post(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(post_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    PostService::delete_post(&state.db, state.store.as_ref(), actor, post_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_like(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(post_id): Path<i32>,
) -> Result<Json<LikeToggle>, ApiError> {
    let toggle = LikeService::toggle_like(&state.db, actor, post_id).await?;
    Ok(Json(toggle))
}

async fn list_likes(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<like::Model>>, ApiError> {
    let likes = LikeService::list_likes_for_post(&state.db, post_id, page.into()).await?;
    Ok(Json(likes))
}
