//! Content interaction behavior: posts, feed paging, comment trees,
//! like toggling, cascade delete.

mod common;

use flicksy::{AppError, posts, posts::LikeTarget};
use uuid::Uuid;

#[tokio::test]
async fn post_needs_text_or_media() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;

    let err = posts::create_post(&db, a, String::new(), None).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let err = posts::create_post(&db, a, "   ".to_string(), None).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // media alone is enough
    posts::create_post(&db, a, String::new(), Some("cdn://cat.png".to_string()))
        .await
        .unwrap();
}

#[tokio::test]
async fn feed_pages_newest_first_with_cursor() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;
    let b = common::user(&db, "bob").await;

    let mut created = Vec::new();
    for i in 0..5 {
        let author = if i % 2 == 0 { a } else { b };
        created.push(posts::create_post(&db, author, format!("post {i}"), None).await.unwrap().uuid);
    }

    let mut seen = Vec::new();
    let mut cursor = None;
    loop {
        let page = posts::feed(&db, a, cursor, 2).await.unwrap();
        assert!(page.posts.len() <= 2);
        seen.extend(page.posts.iter().map(|p| p.uuid));
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    created.reverse();
    assert_eq!(seen, created);
}

#[tokio::test]
async fn feed_resolves_author_and_counts() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;
    let b = common::user(&db, "bob").await;

    let post = posts::create_post(&db, a, "hello".to_string(), None).await.unwrap();
    posts::toggle_like(&db, b, LikeTarget::Post, post.uuid).await.unwrap();
    posts::add_comment(&db, b, post.uuid, "hi!".to_string()).await.unwrap();

    let page = posts::feed(&db, a, None, 20).await.unwrap();
    assert_eq!(page.posts.len(), 1);
    let seen = &page.posts[0];
    assert_eq!(seen.author.name, "alice");
    assert_eq!(seen.likes, 1);
    assert!(!seen.liked);
    assert_eq!(seen.comments, 1);

    let page = posts::feed(&db, b, None, 20).await.unwrap();
    assert!(page.posts[0].liked);
}

#[tokio::test]
async fn user_posts_filter_by_author() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;
    let b = common::user(&db, "bob").await;

    let first = posts::create_post(&db, a, "one".to_string(), None).await.unwrap();
    let second = posts::create_post(&db, a, "two".to_string(), None).await.unwrap();
    posts::create_post(&db, b, "other".to_string(), None).await.unwrap();

    let of_a = posts::user_posts(&db, b, a).await.unwrap();
    let ids: Vec<Uuid> = of_a.iter().map(|p| p.uuid).collect();
    assert_eq!(ids, vec![second.uuid, first.uuid]);

    let err = posts::user_posts(&db, b, Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn toggle_like_is_idempotent_per_pair() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;
    let b = common::user(&db, "bob").await;
    let post = posts::create_post(&db, a, "hello".to_string(), None).await.unwrap();

    let on = posts::toggle_like(&db, b, LikeTarget::Post, post.uuid).await.unwrap();
    assert!(on.liked);
    assert_eq!(on.likes, 1);

    let off = posts::toggle_like(&db, b, LikeTarget::Post, post.uuid).await.unwrap();
    assert!(!off.liked);
    assert_eq!(off.likes, 0);

    // two actors count independently
    posts::toggle_like(&db, a, LikeTarget::Post, post.uuid).await.unwrap();
    let state = posts::toggle_like(&db, b, LikeTarget::Post, post.uuid).await.unwrap();
    assert!(state.liked);
    assert_eq!(state.likes, 2);
}

#[tokio::test]
async fn toggle_like_works_at_every_level() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;
    let b = common::user(&db, "bob").await;
    let post = posts::create_post(&db, a, "hello".to_string(), None).await.unwrap();
    let comment = posts::add_comment(&db, b, post.uuid, "hi".to_string()).await.unwrap();
    let reply = posts::add_reply(&db, a, post.uuid, comment.uuid, "hey".to_string())
        .await
        .unwrap();

    let state = posts::toggle_like(&db, a, LikeTarget::Comment, comment.uuid).await.unwrap();
    assert!(state.liked);
    assert_eq!(state.likes, 1);

    let state = posts::toggle_like(&db, b, LikeTarget::Reply, reply.uuid).await.unwrap();
    assert!(state.liked);
    assert_eq!(state.likes, 1);

    for kind in [LikeTarget::Post, LikeTarget::Comment, LikeTarget::Reply] {
        let err = posts::toggle_like(&db, a, kind, Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

#[tokio::test]
async fn comments_and_replies_append_in_order() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;
    let b = common::user(&db, "bob").await;
    let post = posts::create_post(&db, a, "hello".to_string(), None).await.unwrap();

    let c1 = posts::add_comment(&db, b, post.uuid, "first".to_string()).await.unwrap();
    let c2 = posts::add_comment(&db, a, post.uuid, "second".to_string()).await.unwrap();
    let r1 = posts::add_reply(&db, a, post.uuid, c1.uuid, "a reply".to_string())
        .await
        .unwrap();

    let comments = posts::list_comments(&db, post.uuid).await.unwrap();
    let ids: Vec<Uuid> = comments.iter().map(|c| c.uuid).collect();
    assert_eq!(ids, vec![c1.uuid, c2.uuid]);

    assert_eq!(comments[0].author.name, "bob");
    assert_eq!(comments[0].replies.len(), 1);
    assert_eq!(comments[0].replies[0].uuid, r1.uuid);
    assert_eq!(comments[0].replies[0].author.name, "alice");
    assert!(comments[1].replies.is_empty());
}

#[tokio::test]
async fn empty_or_misparented_comments_are_rejected() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;
    let post = posts::create_post(&db, a, "hello".to_string(), None).await.unwrap();
    let other = posts::create_post(&db, a, "unrelated".to_string(), None).await.unwrap();
    let comment = posts::add_comment(&db, a, post.uuid, "hi".to_string()).await.unwrap();

    let err = posts::add_comment(&db, a, post.uuid, "  ".to_string()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let err = posts::add_reply(&db, a, post.uuid, comment.uuid, String::new()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = posts::add_comment(&db, a, Uuid::now_v7(), "hi".to_string()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // the comment exists, but not under that post
    let err = posts::add_reply(&db, a, other.uuid, comment.uuid, "hey".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = posts::list_comments(&db, Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn get_post_resolves_the_full_tree() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;
    let b = common::user(&db, "bob").await;
    let post = posts::create_post(&db, a, "hello".to_string(), Some("cdn://p.png".to_string()))
        .await
        .unwrap();
    let comment = posts::add_comment(&db, b, post.uuid, "hi".to_string()).await.unwrap();
    posts::add_reply(&db, a, post.uuid, comment.uuid, "hey".to_string()).await.unwrap();
    posts::toggle_like(&db, b, LikeTarget::Post, post.uuid).await.unwrap();

    let detail = posts::get_post(&db, b, post.uuid).await.unwrap();
    assert_eq!(detail.uuid, post.uuid);
    assert_eq!(detail.author.uuid, a);
    assert_eq!(detail.media_url.as_deref(), Some("cdn://p.png"));
    assert_eq!(detail.likes, 1);
    assert!(detail.liked);
    assert_eq!(detail.comments.len(), 1);
    assert_eq!(detail.comments[0].replies.len(), 1);

    let err = posts::get_post(&db, b, Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn delete_cascades_to_comments_replies_and_likes() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;
    let b = common::user(&db, "bob").await;
    let post = posts::create_post(&db, a, "hello".to_string(), None).await.unwrap();
    let c1 = posts::add_comment(&db, b, post.uuid, "one".to_string()).await.unwrap();
    posts::add_comment(&db, a, post.uuid, "two".to_string()).await.unwrap();
    let r1 = posts::add_reply(&db, a, post.uuid, c1.uuid, "deep".to_string()).await.unwrap();
    posts::toggle_like(&db, b, LikeTarget::Post, post.uuid).await.unwrap();
    posts::toggle_like(&db, a, LikeTarget::Comment, c1.uuid).await.unwrap();
    posts::toggle_like(&db, b, LikeTarget::Reply, r1.uuid).await.unwrap();

    let err = posts::delete_post(&db, b, post.uuid).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    posts::delete_post(&db, a, post.uuid).await.unwrap();

    let err = posts::get_post(&db, a, post.uuid).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = posts::toggle_like(&db, a, LikeTarget::Comment, c1.uuid).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = posts::toggle_like(&db, a, LikeTarget::Reply, r1.uuid).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    for table in ["comments", "replies", "post_likes", "comment_likes", "reply_likes"] {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 0, "{table} should be empty after the cascade");
    }

    let err = posts::delete_post(&db, a, post.uuid).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
