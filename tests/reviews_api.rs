// tests/reviews_api.rs
// DOCUMENTATION: Reviews and comments against a real database
// PURPOSE: One review per author, title scoping, object permissions

mod common;

use actix_web::http::StatusCode;
use common::{create_user, delete, get, patch, post, send, seed_catalog};
use serde_json::json;
use sqlx::PgPool;
use yamdb::models::Role;

#[sqlx::test(migrations = "./migrations")]
async fn test_second_review_by_same_author_rejected(pool: PgPool) {
    let mail = tempfile::tempdir().unwrap();
    let catalog = seed_catalog(&pool, mail.path()).await;
    let (_, token) = create_user(&pool, "repeat", Role::User).await;
    let uri = format!("/api/v1/titles/{}/reviews/", catalog.solaris);

    let (status, review) = send(
        &pool,
        mail.path(),
        post(&uri, json!({"text": "Once", "score": 6}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(review["author"], "repeat");

    let (status, _) = send(
        &pool,
        mail.path(),
        post(&uri, json!({"text": "Twice", "score": 9}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(common::count(&pool, "reviews").await, 1);

    let other_title = format!("/api/v1/titles/{}/reviews/", catalog.picnic);
    let (status, _) = send(
        &pool,
        mail.path(),
        post(&other_title, json!({"text": "Different title", "score": 9}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_review_addressed_through_other_title_is_not_found(pool: PgPool) {
    let mail = tempfile::tempdir().unwrap();
    let catalog = seed_catalog(&pool, mail.path()).await;
    let (_, token) = create_user(&pool, "scoped", Role::User).await;

    let (_, review) = send(
        &pool,
        mail.path(),
        post(
            &format!("/api/v1/titles/{}/reviews/", catalog.solaris),
            json!({"text": "Here", "score": 5}),
            Some(&token),
        ),
    )
    .await;
    let review_id = review["id"].as_i64().expect("review id");

    let own = format!("/api/v1/titles/{}/reviews/{}/comments/", catalog.solaris, review_id);
    let create = post(&own, json!({"text": "Hi"}), Some(&token));
    let (status, comment) = send(&pool, mail.path(), create).await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = comment["id"].as_i64().expect("comment id");

    let (status, page) = send(&pool, mail.path(), get(&own, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);

    let foreign = format!("/api/v1/titles/{}/reviews/{}", catalog.ivan, review_id);
    for uri in [
        format!("{}/", foreign),
        format!("{}/comments/", foreign),
        format!("{}/comments/{}/", foreign, comment_id),
    ] {
        let (status, _) = send(&pool, mail.path(), get(&uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
    }

    let (status, _) = send(
        &pool,
        mail.path(),
        post(&format!("{}/comments/", foreign), json!({"text": "Lost"}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(common::count(&pool, "comments").await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_review_edit_permissions(pool: PgPool) {
    let mail = tempfile::tempdir().unwrap();
    let catalog = seed_catalog(&pool, mail.path()).await;
    let (_, author) = create_user(&pool, "author", Role::User).await;
    let (_, stranger) = create_user(&pool, "stranger", Role::User).await;
    let (_, moderator) = create_user(&pool, "moderator", Role::Moderator).await;

    let (_, review) = send(
        &pool,
        mail.path(),
        post(
            &format!("/api/v1/titles/{}/reviews/", catalog.picnic),
            json!({"text": "Original", "score": 4}),
            Some(&author),
        ),
    )
    .await;
    let uri = format!("/api/v1/titles/{}/reviews/{}/", catalog.picnic, review["id"]);

    let edit = patch(&uri, json!({"score": 1}), Some(&stranger));
    let (status, _) = send(&pool, mail.path(), edit).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&pool, mail.path(), patch(&uri, json!({"score": 1}), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let edit = patch(&uri, json!({"score": 5}), Some(&author));
    let (status, edited) = send(&pool, mail.path(), edit).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["score"], 5);
    assert_eq!(edited["text"], "Original");

    let (status, _) = send(&pool, mail.path(), delete(&uri, Some(&stranger))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&pool, mail.path(), delete(&uri, Some(&moderator))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&pool, mail.path(), get(&uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
