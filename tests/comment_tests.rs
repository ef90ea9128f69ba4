pub mod common;

use common::TestContext;
use micro_sns::service::{CommentService, Error, Invalid, Page, Resource};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn comment_lifecycle() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    let post = ctx.post(&alice, "discuss").await.post;

    let first = CommentService::add_comment(&ctx.db, bob.user_id, post.post_id, "first!".to_owned())
        .await
        .unwrap();
    let second =
        CommentService::add_comment(&ctx.db, alice.user_id, post.post_id, "thanks".to_owned())
            .await
            .unwrap();
    assert_eq!(first.post_id, post.post_id);
    assert_eq!(first.user_id, bob.user_id);

    let listed = CommentService::list_comments(&ctx.db, post.post_id, Page::default())
        .await
        .unwrap();
    assert_eq!(listed, [first.clone(), second.clone()]);

    let edited =
        CommentService::update_comment(&ctx.db, bob.user_id, first.comment_id, "edited".to_owned())
            .await
            .unwrap();
    assert_eq!(edited.content, "edited");
    assert_eq!(edited.comment_id, first.comment_id);

    CommentService::delete_comment(&ctx.db, alice.user_id, second.comment_id)
        .await
        .unwrap();
    let listed = CommentService::list_comments(&ctx.db, post.post_id, Page::default())
        .await
        .unwrap();
    assert_eq!(listed, [edited]);
}

#[tokio::test]
async fn only_the_author_may_edit() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    let post = ctx.post(&alice, "discuss").await.post;
    let comment = CommentService::add_comment(&ctx.db, bob.user_id, post.post_id, "mine".to_owned())
        .await
        .unwrap();

    // not even the post owner
    assert!(matches!(
        CommentService::update_comment(&ctx.db, alice.user_id, comment.comment_id, "x".to_owned())
            .await,
        Err(Error::Forbidden(Resource::Comment))
    ));
    assert!(matches!(
        CommentService::delete_comment(&ctx.db, alice.user_id, comment.comment_id).await,
        Err(Error::Forbidden(Resource::Comment))
    ));
    assert!(matches!(
        CommentService::delete_comment(&ctx.db, bob.user_id, 4242).await,
        Err(Error::NotFound(Resource::Comment))
    ));
}

#[tokio::test]
async fn comment_on_missing_post_or_blank() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let post = ctx.post(&alice, "discuss").await.post;

    assert!(matches!(
        CommentService::add_comment(&ctx.db, alice.user_id, 4242, "hello".to_owned()).await,
        Err(Error::NotFound(Resource::Post))
    ));
    assert!(matches!(
        CommentService::add_comment(&ctx.db, alice.user_id, post.post_id, "".to_owned()).await,
        Err(Error::Validation(Invalid::EmptyContent))
    ));
    assert!(matches!(
        CommentService::list_comments(&ctx.db, 4242, Page::default()).await,
        Err(Error::NotFound(Resource::Post))
    ));
}
