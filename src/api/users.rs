use super::{ApiError, AppState, AuthUser, Form, Json, MaybeAuthUser, PageParams, Path, Query};
use crate::{
    auth::Token,
    service::{
        AccountService, Credentials, FollowService, LikeService, NewUser, PasswordChange, Page,
        PostView, ProfileUpdate, UserView,
    },
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use entity::user;
use serde::Deserialize;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(signup))
        .route("/users/token", post(login))
        .route("/users/search", get(search))
        .route(
            "/users/{user_id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{user_id}/password", put(change_password))
        .route("/users/{user_id}/follow", post(follow).delete(unfollow))
        .route("/users/{user_id}/followers", get(followers))
        .route("/users/{user_id}/following", get(following))
        .route("/users/{user_id}/likes", get(liked_posts))
}

/// OAuth2 password form; `username` carries the email address.
#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: String,
    skip: Option<u64>,
    limit: Option<u64>,
}

async fn signup(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> Result<Json<user::Model>, ApiError> {
    let user = AccountService::register(&state.db, new_user).await?;
    Ok(Json(user))
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<Token>, ApiError> {
    let credentials = Credentials {
        email: form.username,
        password: form.password,
    };
    let token = AccountService::authenticate(&state.db, &state.tokens, credentials).await?;
    Ok(Json(token))
}

async fn search(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let page = Page::new(params.skip, params.limit);
    let users = AccountService::search(&state.db, viewer, &params.q, page).await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(user_id): Path<i32>,
) -> Result<Json<UserView>, ApiError> {
    let user = AccountService::get_user(&state.db, viewer, user_id).await?;
    Ok(Json(user))
}

async fn update_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<i32>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<user::Model>, ApiError> {
    let user = AccountService::update_profile(&state.db, actor, user_id, update).await?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    AccountService::delete_account(&state.db, state.store.as_ref(), actor, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn change_password(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<i32>,
    Json(change): Json<PasswordChange>,
) -> Result<Json<user::Model>, ApiError> {
    let user = AccountService::change_password(&state.db, actor, user_id, change).await?;
    Ok(Json(user))
}

async fn follow(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    FollowService::follow(&state.db, actor, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unfollow(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(user_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    FollowService::unfollow(&state.db, actor, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn followers(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(user_id): Path<i32>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = FollowService::list_followers(&state.db, viewer, user_id, page.into()).await?;
    Ok(Json(users))
}

async fn following(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(user_id): Path<i32>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = FollowService::list_following(&state.db, viewer, user_id, page.into()).await?;
    Ok(Json(users))
}

async fn liked_posts(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(user_id): Path<i32>,
    Query(page): Query<PageParams>,
) -> Result<Json<Vec<PostView>>, ApiError> {
    let posts =
        LikeService::list_liked_posts_by_user(&state.db, viewer, user_id, page.into()).await?;
    Ok(Json(posts))
}
