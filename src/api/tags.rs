use super::{ApiError, AppState, Json, MaybeAuthUser, PageParams, Path, Query};
use crate::service::{HashtagService, PostView};
use axum::{
    extract::State,
    routing::get,
    Router,
};

pub(super) fn routes() -> Router<AppState> {
    Router::new().route("/tags/{tag_name}/posts", get(posts_for_tag))
}

async fn posts_for_tag(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(tag_name): Path<String>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<PostView>>, ApiError> {
    let posts = HashtagService::posts_for_tag(&state.db, viewer, &tag_name, page.into()).await?;
    Ok(Json(posts))
}
