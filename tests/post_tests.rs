pub mod common;

use chrono::{Duration, Utc};
use common::{png, MemoryBlobStore, TestContext};
use entity::{comment, hashtag, like, post, post_hashtag, post_image};
use micro_sns::service::{
    CommentService, Error, FollowService, HashtagService, Invalid, LikeService, NewImage, NewPost,
    Page, PostFilter, PostService, PostUpdate, Resource, SortBy,
};
use pretty_assertions::assert_eq;
use sea_orm::{entity::*, query::*};

macro_rules! count {
    ($entity:ty, $db:expr) => {
        <$entity>::find().count($db).await.unwrap()
    };
}

#[tokio::test]
async fn duplicate_tags_collapse_and_rows_are_reused() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;

    let first = ctx.post(&alice, "hello #Rust and #rust #Rust").await;
    assert_eq!(first.hashtags, ["Rust", "rust"]);
    assert_eq!(count!(hashtag::Entity, &ctx.db), 2);
    assert_eq!(count!(post_hashtag::Entity, &ctx.db), 2);

    let second = ctx.post(&alice, "more #Rust").await;
    assert_eq!(second.hashtags, ["Rust"]);
    assert_eq!(count!(hashtag::Entity, &ctx.db), 2);

    let rust = hashtag::Entity::find()
        .filter(hashtag::Column::Name.eq("Rust"))
        .one(&ctx.db)
        .await
        .unwrap()
        .unwrap();
    let tagged: Vec<i32> = rust
        .find_related(post::Entity)
        .all(&ctx.db)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.post_id)
        .collect();
    assert_eq!(tagged.len(), 2);
    assert!(tagged.contains(&first.post.post_id));
    assert!(tagged.contains(&second.post.post_id));
}

#[tokio::test]
async fn resolve_creates_only_missing_tags() {
    let ctx = TestContext::new().await;

    let tags = HashtagService::resolve(&ctx.db, "#a #b").await.unwrap();
    assert_eq!(tags.len(), 2);
    let again = HashtagService::resolve(&ctx.db, "#b #c #a").await.unwrap();
    let names: Vec<_> = again.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["b", "c", "a"]);
    assert_eq!(again[0].hashtag_id, tags[1].hashtag_id);
    assert_eq!(again[2].hashtag_id, tags[0].hashtag_id);
    assert_eq!(count!(hashtag::Entity, &ctx.db), 3);

    assert!(HashtagService::resolve(&ctx.db, "no tags # here")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn create_post_with_images() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;

    let view = PostService::create_post(
        &ctx.db,
        ctx.store.as_ref(),
        alice.user_id,
        NewPost {
            content: "pics #cats".to_owned(),
            images: vec![png(b"one"), NewImage::new("image/jpeg", b"two".as_slice())],
        },
    )
    .await
    .unwrap();

    assert_eq!(view.post.user_id, alice.user_id);
    assert_eq!(view.post.like_count, 0);
    assert_eq!(view.hashtags, ["cats"]);
    assert_eq!(view.images.len(), 2);
    assert!(view.images[1].ends_with(".jpg"));
    assert!(!view.is_liked);
    assert_eq!(ctx.store.paths().len(), 2);
}

#[tokio::test]
async fn one_disallowed_file_rolls_back_everything() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;

    let res = PostService::create_post(
        &ctx.db,
        ctx.store.as_ref(),
        alice.user_id,
        NewPost {
            content: "three pics and a pdf #oops".to_owned(),
            images: vec![
                png(b"1"),
                png(b"2"),
                NewImage::new("application/pdf", b"%PDF".as_slice()),
                png(b"3"),
            ],
        },
    )
    .await;

    match res {
        Err(Error::Validation(Invalid::UnsupportedMediaType(mime))) => {
            assert_eq!(mime, "application/pdf")
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(count!(post::Entity, &ctx.db), 0);
    assert_eq!(count!(post_image::Entity, &ctx.db), 0);
    assert_eq!(count!(post_hashtag::Entity, &ctx.db), 0);
    assert_eq!(count!(hashtag::Entity, &ctx.db), 0);
    assert_eq!(ctx.store.len(), 0);
}

#[tokio::test]
async fn failed_blob_write_rolls_back_post_and_written_blobs() {
    let ctx = TestContext::with_store(MemoryBlobStore::failing_after(2)).await;
    let alice = ctx.user("alice").await;

    let res = PostService::create_post(
        &ctx.db,
        ctx.store.as_ref(),
        alice.user_id,
        NewPost {
            content: "#partial upload".to_owned(),
            images: vec![png(b"1"), png(b"2"), png(b"3")],
        },
    )
    .await;

    assert!(matches!(res, Err(Error::Storage(_))));
    assert_eq!(count!(post::Entity, &ctx.db), 0);
    assert_eq!(count!(post_image::Entity, &ctx.db), 0);
    assert_eq!(count!(post_hashtag::Entity, &ctx.db), 0);
    assert_eq!(ctx.store.len(), 0);
}

#[tokio::test]
async fn blank_content_is_rejected() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;

    let res = PostService::create_post(
        &ctx.db,
        ctx.store.as_ref(),
        alice.user_id,
        NewPost {
            content: "   ".to_owned(),
            images: Vec::new(),
        },
    )
    .await;
    assert!(matches!(res, Err(Error::Validation(Invalid::EmptyContent))));
}

#[tokio::test]
async fn only_the_owner_may_update_or_delete() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    let alices = ctx.post(&alice, "alice #one").await.post;
    let bobs = ctx.post(&bob, "bob #two").await.post;

    for (actor, post) in [(&alice, &bobs), (&bob, &alices)] {
        let update = PostUpdate {
            content: "hijacked".to_owned(),
            images: Vec::new(),
        };
        assert!(matches!(
            PostService::update_post(&ctx.db, ctx.store.as_ref(), actor.user_id, post.post_id, update)
                .await,
            Err(Error::Forbidden(Resource::Post))
        ));
        assert!(matches!(
            PostService::delete_post(&ctx.db, ctx.store.as_ref(), actor.user_id, post.post_id).await,
            Err(Error::Forbidden(Resource::Post))
        ));
    }

    let updated = PostService::update_post(
        &ctx.db,
        ctx.store.as_ref(),
        alice.user_id,
        alices.post_id,
        PostUpdate {
            content: "alice #three #one".to_owned(),
            images: vec![png(b"new")],
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.post.content, "alice #three #one");
    assert_eq!(updated.images.len(), 1);
    let mut tags = updated.hashtags.clone();
    tags.sort();
    assert_eq!(tags, ["one", "three"]);

    assert_eq!(ctx.reload_post(bobs.post_id).await.unwrap().content, "bob #two");

    assert!(matches!(
        PostService::update_post(
            &ctx.db,
            ctx.store.as_ref(),
            alice.user_id,
            4242,
            PostUpdate::default()
        )
        .await,
        Err(Error::NotFound(Resource::Post))
    ));
}

#[tokio::test]
async fn delete_post_cascades_to_dependents() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;

    let view = PostService::create_post(
        &ctx.db,
        ctx.store.as_ref(),
        alice.user_id,
        NewPost {
            content: "bye #soon".to_owned(),
            images: vec![png(b"x")],
        },
    )
    .await
    .unwrap();
    let post_id = view.post.post_id;
    LikeService::toggle_like(&ctx.db, bob.user_id, post_id)
        .await
        .unwrap();
    CommentService::add_comment(&ctx.db, bob.user_id, post_id, "nice".to_owned())
        .await
        .unwrap();

    PostService::delete_post(&ctx.db, ctx.store.as_ref(), alice.user_id, post_id)
        .await
        .unwrap();

    assert!(ctx.reload_post(post_id).await.is_none());
    assert_eq!(count!(comment::Entity, &ctx.db), 0);
    assert_eq!(count!(like::Entity, &ctx.db), 0);
    assert_eq!(count!(post_image::Entity, &ctx.db), 0);
    assert_eq!(count!(post_hashtag::Entity, &ctx.db), 0);
    // the tag itself stays
    assert_eq!(count!(hashtag::Entity, &ctx.db), 1);
    assert_eq!(ctx.store.len(), 0);
}

#[tokio::test]
async fn listings_are_annotated_per_caller() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    let p = ctx.post(&alice, "P").await.post;
    let q = ctx.post(&alice, "Q").await.post;

    LikeService::toggle_like(&ctx.db, bob.user_id, p.post_id)
        .await
        .unwrap();

    let anonymous = PostService::list_posts(&ctx.db, None, PostFilter::default(), Page::default())
        .await
        .unwrap();
    assert_eq!(anonymous.len(), 2);
    assert!(anonymous.iter().all(|v| !v.is_liked));

    let for_bob = PostService::list_posts(
        &ctx.db,
        Some(bob.user_id),
        PostFilter::default(),
        Page::default(),
    )
    .await
    .unwrap();
    let liked: Vec<(i32, bool)> = for_bob
        .iter()
        .map(|v| (v.post.post_id, v.is_liked))
        .collect();
    // newest first
    assert_eq!(liked, [(q.post_id, false), (p.post_id, true)]);
}

#[tokio::test]
async fn list_posts_filters_and_sorts() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    let a1 = ctx.post(&alice, "a1").await.post;
    let a2 = ctx.post(&alice, "a2").await.post;
    let b1 = ctx.post(&bob, "b1").await.post;

    LikeService::toggle_like(&ctx.db, bob.user_id, a1.post_id)
        .await
        .unwrap();
    LikeService::toggle_like(&ctx.db, alice.user_id, a1.post_id)
        .await
        .unwrap();
    LikeService::toggle_like(&ctx.db, alice.user_id, b1.post_id)
        .await
        .unwrap();

    let ids = |views: Vec<micro_sns::service::PostView>| -> Vec<i32> {
        views.into_iter().map(|v| v.post.post_id).collect()
    };

    let latest = PostService::list_posts(&ctx.db, None, PostFilter::default(), Page::default())
        .await
        .unwrap();
    assert_eq!(ids(latest), [b1.post_id, a2.post_id, a1.post_id]);

    let by_likes = PostService::list_posts(
        &ctx.db,
        None,
        PostFilter {
            owner_id: None,
            sort_by: SortBy::Likes,
        },
        Page::default(),
    )
    .await
    .unwrap();
    assert_eq!(ids(by_likes), [a1.post_id, b1.post_id, a2.post_id]);

    let alices = PostService::list_posts(
        &ctx.db,
        None,
        PostFilter {
            owner_id: Some(alice.user_id),
            sort_by: SortBy::Latest,
        },
        Page::default(),
    )
    .await
    .unwrap();
    assert_eq!(ids(alices), [a2.post_id, a1.post_id]);

    let paged = PostService::list_posts(&ctx.db, None, PostFilter::default(), Page::new(Some(1), Some(1)))
        .await
        .unwrap();
    assert_eq!(ids(paged), [a2.post_id]);
}

#[tokio::test]
async fn feed_shows_followed_authors_only() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    let carol = ctx.user("carol").await;

    assert!(PostService::feed(&ctx.db, alice.user_id, Page::default())
        .await
        .unwrap()
        .is_empty());

    let b1 = ctx.post(&bob, "from bob").await.post;
    ctx.post(&carol, "from carol").await;
    let b2 = ctx.post(&bob, "bob again").await.post;
    ctx.post(&alice, "my own").await;

    FollowService::follow(&ctx.db, alice.user_id, bob.user_id)
        .await
        .unwrap();

    let feed: Vec<i32> = PostService::feed(&ctx.db, alice.user_id, Page::default())
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.post.post_id)
        .collect();
    assert_eq!(feed, [b2.post_id, b1.post_id]);
}

#[tokio::test]
async fn trending_is_limited_to_the_last_week() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;

    let old = post::ActiveModel {
        user_id: Set(alice.user_id),
        content: Set("ancient".to_owned()),
        like_count: Set(0),
        created_at: Set(Utc::now() - Duration::days(10)),
        ..Default::default()
    }
    .insert(&ctx.db)
    .await
    .unwrap();
    LikeService::toggle_like(&ctx.db, alice.user_id, old.post_id)
        .await
        .unwrap();
    LikeService::toggle_like(&ctx.db, bob.user_id, old.post_id)
        .await
        .unwrap();

    let quiet = ctx.post(&alice, "quiet").await.post;
    let popular = ctx.post(&alice, "popular").await.post;
    LikeService::toggle_like(&ctx.db, bob.user_id, popular.post_id)
        .await
        .unwrap();

    let trending: Vec<i32> = PostService::trending(&ctx.db, None, Page::default())
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.post.post_id)
        .collect();
    assert_eq!(trending, [popular.post_id, quiet.post_id]);
}

#[tokio::test]
async fn posts_for_tag() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let first = ctx.post(&alice, "#rust is fun").await.post;
    ctx.post(&alice, "#go is fine").await;
    let second = ctx.post(&alice, "more #rust").await.post;

    for name in ["rust", "#rust"] {
        let ids: Vec<i32> = HashtagService::posts_for_tag(&ctx.db, None, name, Page::default())
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.post.post_id)
            .collect();
        assert_eq!(ids, [second.post_id, first.post_id]);
    }

    assert!(matches!(
        HashtagService::posts_for_tag(&ctx.db, None, "Rust", Page::default()).await,
        Err(Error::NotFound(Resource::Hashtag))
    ));
}

#[tokio::test]
async fn get_post() {
    let ctx = TestContext::new().await;
    let alice = ctx.user("alice").await;
    let created = ctx.post(&alice, "hi #there").await;

    let fetched = PostService::get_post(&ctx.db, None, created.post.post_id)
        .await
        .unwrap();
    assert_eq!(fetched, created);

    assert!(matches!(
        PostService::get_post(&ctx.db, None, 4242).await,
        Err(Error::NotFound(Resource::Post))
    ));
}
