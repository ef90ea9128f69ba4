use sea_orm::{DbErr, SqlErr};
use std::fmt;

/// An error from an unsuccessful domain operation.
///
/// Every operation signals exactly one of these. Storage details stay inside
/// [`Error::Db`], [`Error::Storage`] and [`Error::Internal`], which the HTTP
/// layer reports as a generic internal failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The referenced entity does not exist
    #[error("{0} not found")]
    NotFound(Resource),
    /// Authenticated, but the resource belongs to someone else
    #[error("not authorized to modify this {0}")]
    Forbidden(Resource),
    /// The request collides with existing state
    #[error(transparent)]
    Conflict(Conflict),
    /// Missing or invalid credentials
    #[error("could not validate credentials")]
    Unauthenticated,
    /// Malformed input
    #[error(transparent)]
    Validation(Invalid),
    /// Error from the database, already rolled back
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    /// Error from the blob store
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    /// Any other unexpected failure
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Post,
    Comment,
    Hashtag,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Post => write!(f, "post"),
            Self::Comment => write!(f, "comment"),
            Self::Hashtag => write!(f, "hashtag"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Conflict {
    #[error("email already registered")]
    EmailTaken,
    #[error("you cannot follow yourself")]
    SelfFollow,
    #[error("you are already following this user")]
    AlreadyFollowing,
    #[error("you are not following this user")]
    NotFollowing,
    #[error("you already like this post")]
    AlreadyLiked,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Invalid {
    #[error("incorrect old password")]
    WrongOldPassword,
    #[error("content must not be empty")]
    EmptyContent,
    #[error("unsupported file type: {0}")]
    UnsupportedMediaType(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("malformed request: {0}")]
    Malformed(String),
}

impl From<Conflict> for Error {
    fn from(conflict: Conflict) -> Self {
        Self::Conflict(conflict)
    }
}

impl From<Invalid> for Error {
    fn from(invalid: Invalid) -> Self {
        Self::Validation(invalid)
    }
}

impl Error {
    /// Translate a unique violation into `conflict`, keep anything else as a
    /// database error.
    pub(crate) fn unique_or(err: DbErr, conflict: Conflict) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict(conflict),
            _ => Self::Db(err),
        }
    }

    /// Whether this is one of the internal kinds rather than a domain outcome.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Db(_) | Self::Storage(_) | Self::Internal(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
