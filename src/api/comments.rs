use super::{ApiError, AppState, AuthUser, Json, PageParams, Path, Query};
use crate::service::CommentService;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Router,
};
use entity::comment;
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/posts/{post_id}/comments",
            get(list_comments).post(add_comment),
        )
        .route(
            "/comments/{comment_id}",
            put(update_comment).delete(delete_comment),
        )
}

#[derive(Debug, Deserialize)]
struct CommentBody {
    content: String,
}

async fn add_comment(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(post_id): Path<i32>,
    Json(body): Json<CommentBody>,
) -> Result<Json<comment::Model>, ApiError> {
    let comment = CommentService::add_comment(&state.db, actor, post_id, body.content).await?;
    Ok(Json(comment))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<comment::Model>>, ApiError> {
    let comments = CommentService::list_comments(&state.db, post_id, page.into()).await?;
    Ok(Json(comments))
}

async fn update_comment(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(comment_id): Path<i32>,
    Json(body): Json<CommentBody>,
) -> Result<Json<comment::Model>, ApiError> {
    let comment =
        CommentService::update_comment(&state.db, actor, comment_id, body.content).await?;
    Ok(Json(comment))
}

async fn delete_comment(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(comment_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    CommentService::delete_comment(&state.db, actor, comment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
