use super::{
    post::{discard_blobs, purge_posts},
    view::{user_view, user_views, UserView},
    Conflict, Error, Invalid, Page, Resource, Result,
};
use crate::{
    auth::{hash_password, verify_password, Token, TokenIssuer},
    storage::BlobStore,
};
use chrono::Utc;
use entity::{comment, follow, like, post, user};
use sea_orm::{
    entity::*,
    query::*,
    sea_query::{Expr, Func, LikeExpr, Query},
    ConnectionTrait, DbConn, TransactionTrait,
};
use serde::Deserialize;

/// Column widths of `users.email` and `users.username`, in characters.
pub const EMAIL_MAX_LEN: usize = 255;
pub const USERNAME_MAX_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Fields left as `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug)]
pub struct AccountService;

impl AccountService {
    pub async fn register(db: &DbConn, new_user: NewUser) -> Result<user::Model> {
        validate_email(&new_user.email)?;
        validate_username(&new_user.username)?;
        if new_user.password.is_empty() {
            return Err(Invalid::MissingField("password").into());
        }

        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(new_user.email.as_str()))
            .one(db)
            .await?;
        if taken.is_some() {
            return Err(Conflict::EmailTaken.into());
        }

        let user = user::ActiveModel {
            email: Set(new_user.email),
            password: Set(hash_password(&new_user.password)?),
            username: Set(new_user.username),
            bio: Set(new_user.bio),
            follower_count: Set(0),
            following_count: Set(0),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|err| Error::unique_or(err, Conflict::EmailTaken))?;

        tracing::info!(user_id = user.user_id, "user registered");
        Ok(user)
    }

    /// Exchange email and password for an access token.
    ///
    /// Unknown email and wrong password fail the same way.
    pub async fn authenticate(
        db: &DbConn,
        tokens: &TokenIssuer,
        credentials: Credentials,
    ) -> Result<Token> {
        let user = user::Entity::find()
            .filter(user::Column::Email.eq(credentials.email.as_str()))
            .one(db)
            .await?;

        match user {
            Some(user) if verify_password(&credentials.password, &user.password) => {
                tokens.issue(user.user_id)
            }
            _ => Err(Error::Unauthenticated),
        }
    }

    pub async fn get_user(db: &DbConn, viewer: Option<i32>, user_id: i32) -> Result<UserView> {
        let user = find_user(db, user_id).await?;
        user_view(db, viewer, user).await
    }

    pub async fn update_profile(
        db: &DbConn,
        actor: i32,
        user_id: i32,
        update: ProfileUpdate,
    ) -> Result<user::Model> {
        ensure_self(actor, user_id)?;
        let user = find_user(db, user_id).await?;

        let mut user: user::ActiveModel = user.into();
        if let Some(username) = update.username {
            validate_username(&username)?;
            user.username = Set(username);
        }
        if let Some(bio) = update.bio {
            user.bio = Set(Some(bio));
        }

        Ok(user.update(db).await?)
    }

    pub async fn change_password(
        db: &DbConn,
        actor: i32,
        user_id: i32,
        change: PasswordChange,
    ) -> Result<user::Model> {
        ensure_self(actor, user_id)?;
        let user = find_user(db, user_id).await?;

        if !verify_password(&change.old_password, &user.password) {
            return Err(Invalid::WrongOldPassword.into());
        }
        if change.new_password.is_empty() {
            return Err(Invalid::MissingField("new_password").into());
        }

        let mut user: user::ActiveModel = user.into();
        user.password = Set(hash_password(&change.new_password)?);
        let user = user.update(db).await?;

        tracing::info!(user_id, "password changed");
        Ok(user)
    }

    /// Case-insensitive substring match on the username. `%` and `_` in
    /// `query` match themselves.
    pub async fn search(
        db: &DbConn,
        viewer: Option<i32>,
        query: &str,
        page: Page,
    ) -> Result<Vec<UserView>> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let users = user::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(user::Column::Username)))
                    .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
            )
            .order_by_asc(user::Column::Username)
            .order_by_asc(user::Column::UserId)
            .offset(page.skip)
            .limit(page.limit)
            .all(db)
            .await?;

        user_views(db, viewer, users).await
    }

    /// Delete an account and everything it owns.
    ///
    /// Counters on the other side of every relation are repaired in the same
    /// transaction: followees lose a follower, followers lose a followee and
    /// posts liked by this user lose a like.
    pub async fn delete_account(
        db: &DbConn,
        store: &dyn BlobStore,
        actor: i32,
        user_id: i32,
    ) -> Result<()> {
        ensure_self(actor, user_id)?;

        let txn = db.begin().await?;
        find_user(&txn, user_id).await?;

        user::Entity::update_many()
            .col_expr(
                user::Column::FollowerCount,
                Expr::col(user::Column::FollowerCount).sub(1),
            )
            .filter(
                user::Column::UserId.in_subquery(
                    Query::select()
                        .column(follow::Column::FollowingId)
                        .from(follow::Entity)
                        .and_where(follow::Column::FollowerId.eq(user_id))
                        .to_owned(),
                ),
            )
            .exec(&txn)
            .await?;
        user::Entity::update_many()
            .col_expr(
                user::Column::FollowingCount,
                Expr::col(user::Column::FollowingCount).sub(1),
            )
            .filter(
                user::Column::UserId.in_subquery(
                    Query::select()
                        .column(follow::Column::FollowerId)
                        .from(follow::Entity)
                        .and_where(follow::Column::FollowingId.eq(user_id))
                        .to_owned(),
                ),
            )
            .exec(&txn)
            .await?;
        post::Entity::update_many()
            .col_expr(
                post::Column::LikeCount,
                Expr::col(post::Column::LikeCount).sub(1),
            )
            .filter(
                post::Column::PostId.in_subquery(
                    Query::select()
                        .column(like::Column::PostId)
                        .from(like::Entity)
                        .and_where(like::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            )
            .exec(&txn)
            .await?;

        follow::Entity::delete_many()
            .filter(
                Condition::any()
                    .add(follow::Column::FollowerId.eq(user_id))
                    .add(follow::Column::FollowingId.eq(user_id)),
            )
            .exec(&txn)
            .await?;
        like::Entity::delete_many()
            .filter(like::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        comment::Entity::delete_many()
            .filter(comment::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let post_ids: Vec<i32> = post::Entity::find()
            .select_only()
            .column(post::Column::PostId)
            .filter(post::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&txn)
            .await?;
        let blobs = purge_posts(&txn, post_ids).await?;

        user::Entity::delete_by_id(user_id).exec(&txn).await?;
        txn.commit().await?;

        discard_blobs(store, &blobs).await;
        tracing::info!(user_id, "account deleted");
        Ok(())
    }
}

pub(crate) async fn find_user<C>(db: &C, user_id: i32) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound(Resource::User))
}

fn ensure_self(actor: i32, user_id: i32) -> Result<()> {
    if actor == user_id {
        Ok(())
    } else {
        Err(Error::Forbidden(Resource::User))
    }
}

/// Not a string-literal escape on any backend, unlike `\`.
const LIKE_ESCAPE: char = '!';

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, LIKE_ESCAPE | '%' | '_') {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(Invalid::MissingField("username").into());
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err(Invalid::Malformed(format!(
            "username longer than {USERNAME_MAX_LEN} characters"
        ))
        .into());
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    if email.chars().count() > EMAIL_MAX_LEN {
        return Err(Invalid::Malformed(format!(
            "email longer than {EMAIL_MAX_LEN} characters"
        ))
        .into());
    }
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Invalid::Malformed(format!("invalid email address: {email}")).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@").is_err());
        assert!(validate_email("alice@localhost").is_err());
        assert!(validate_email("al ice@example.com").is_err());
    }

    #[test]
    fn length_limits() {
        let local = "a".repeat(EMAIL_MAX_LEN - "@example.com".len());
        assert!(validate_email(&format!("{local}@example.com")).is_ok());
        assert!(matches!(
            validate_email(&format!("{local}a@example.com")),
            Err(Error::Validation(Invalid::Malformed(_)))
        ));
        assert!(validate_username(&"é".repeat(USERNAME_MAX_LEN)).is_ok());
        assert!(matches!(
            validate_username(&"x".repeat(USERNAME_MAX_LEN + 1)),
            Err(Error::Validation(Invalid::Malformed(_)))
        ));
    }

    #[test]
    fn like_wildcards_escaped() {
        assert_eq!(escape_like("a_b"), "a!_b");
        assert_eq!(escape_like("100%"), "100!%");
        assert_eq!(escape_like("hey!"), "hey!!");
        assert_eq!(escape_like("back\\slash"), "back\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn only_self_may_modify_account() {
        assert!(ensure_self(1, 1).is_ok());
        assert!(matches!(
            ensure_self(1, 2),
            Err(Error::Forbidden(Resource::User))
        ));
    }
}
