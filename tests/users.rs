//! Profile operations and view tracking.

mod common;

use flicksy::{AppError, friends, users};
use uuid::Uuid;

#[tokio::test]
async fn profile_views_count_each_viewer_once() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;
    let b = common::user(&db, "bob").await;
    let c = common::user(&db, "carol").await;

    for _ in 0..3 {
        let count = users::record_view(&db, b, a).await.unwrap();
        assert_eq!(count.views, 1);
    }

    let count = users::record_view(&db, c, a).await.unwrap();
    assert_eq!(count.views, 2);

    assert_eq!(users::get_user(&db, a).await.unwrap().views, 2);
}

#[tokio::test]
async fn self_views_are_not_counted() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;

    let count = users::record_view(&db, a, a).await.unwrap();
    assert_eq!(count.views, 0);
}

#[tokio::test]
async fn view_of_unknown_profile_is_not_found() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;

    let err = users::record_view(&db, a, Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn profile_resolves_friend_list() {
    let db = common::pool().await;
    let a = common::user(&db, "alice").await;
    let b = common::user(&db, "bob").await;

    let req = friends::send_friend_request(&db, a, b).await.unwrap();
    friends::respond_request(&db, b, req.uuid, true).await.unwrap();

    let profile = users::get_user(&db, a).await.unwrap();
    assert_eq!(profile.user.name, "alice");
    assert_eq!(profile.friends.len(), 1);
    assert_eq!(profile.friends[0].uuid, b);
    assert_eq!(profile.friends[0].name, "bob");

    let err = users::get_user(&db, Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn registration_requires_a_name() {
    let db = common::pool().await;

    let err = users::create_user(&db, "  ".to_string(), None, None, None).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn update_changes_only_the_given_fields() {
    let db = common::pool().await;
    let a = users::create_user(
        &db,
        "alice".to_string(),
        Some("engineer".to_string()),
        Some("berlin".to_string()),
        None,
    )
    .await
    .unwrap()
    .uuid;

    let updated = users::update_user(
        &db,
        a,
        users::UserChanges {
            location: Some("lisbon".to_string()),
            avatar_url: Some("cdn://a.png".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "alice");
    assert_eq!(updated.profession.as_deref(), Some("engineer"));
    assert_eq!(updated.location.as_deref(), Some("lisbon"));
    assert_eq!(updated.avatar_url.as_deref(), Some("cdn://a.png"));

    let err = users::update_user(&db, a, users::UserChanges::default()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = users::update_user(
        &db,
        a,
        users::UserChanges { name: Some("  ".to_string()), ..Default::default() },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = users::update_user(
        &db,
        Uuid::now_v7(),
        users::UserChanges { name: Some("ghost".to_string()), ..Default::default() },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
