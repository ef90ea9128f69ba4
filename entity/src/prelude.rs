pub use super::comment::Entity as Comment;
pub use super::follow::Entity as Follow;
pub use super::hashtag::Entity as Hashtag;
pub use super::like::Entity as Like;
pub use super::post::Entity as Post;
pub use super::post_hashtag::Entity as PostHashtag;
pub use super::post_image::Entity as PostImage;
pub use super::user::Entity as User;
