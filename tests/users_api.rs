// tests/users_api.rs
// DOCUMENTATION: User administration and the own profile against a real database
// PURPOSE: Read-only role on /users/me/, nullable bio, admin edits, account deletion

mod common;

use actix_web::http::StatusCode;
use common::{create_user, delete, get, patch, post, send, seed_catalog};
use serde_json::{json, Value};
use sqlx::PgPool;
use yamdb::models::Role;

#[sqlx::test(migrations = "./migrations")]
async fn test_me_cannot_change_own_role(pool: PgPool) {
    let mail = tempfile::tempdir().unwrap();
    let (_, token) = create_user(&pool, "climber", Role::User).await;

    let (status, me) = send(
        &pool,
        mail.path(),
        patch(
            "/api/v1/users/me/",
            json!({"role": "admin", "first_name": "Ann"}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "user");
    assert_eq!(me["first_name"], "Ann");

    let (status, _) = send(&pool, mail.path(), get("/api/v1/users/", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bio_is_kept_when_absent_and_cleared_by_null(pool: PgPool) {
    let mail = tempfile::tempdir().unwrap();
    let (_, token) = create_user(&pool, "writer", Role::User).await;

    let (_, me) = send(
        &pool,
        mail.path(),
        patch("/api/v1/users/me/", json!({"last_name": "Lem"}), Some(&token)),
    )
    .await;
    assert_eq!(me["bio"], "writer bio");

    let (status, me) = send(
        &pool,
        mail.path(),
        patch("/api/v1/users/me/", json!({"bio": null}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["bio"], Value::Null);
    assert_eq!(me["last_name"], "Lem");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_manages_users(pool: PgPool) {
    let mail = tempfile::tempdir().unwrap();
    let (_, admin) = create_user(&pool, "root_admin", Role::Admin).await;
    let admin = Some(admin.as_str());

    let (status, created) = send(
        &pool,
        mail.path(),
        post(
            "/api/v1/users/",
            json!({"username": "newbie", "email": "newbie@yamdb.test"}),
            admin,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "user");

    let (status, _) = send(
        &pool,
        mail.path(),
        post(
            "/api/v1/users/",
            json!({"username": "newbie", "email": "another@yamdb.test"}),
            admin,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, promoted) = send(
        &pool,
        mail.path(),
        patch("/api/v1/users/newbie/", json!({"role": "moderator"}), admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(promoted["role"], "moderator");

    let (status, page) = send(&pool, mail.path(), get("/api/v1/users/?search=newb", admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["username"], "newbie");

    let (status, _) = send(&pool, mail.path(), get("/api/v1/users/nobody/", admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deleting_user_removes_their_reviews_and_comments(pool: PgPool) {
    let mail = tempfile::tempdir().unwrap();
    let catalog = seed_catalog(&pool, mail.path()).await;
    let (_, token) = create_user(&pool, "leaving", Role::User).await;

    let reviews_uri = format!("/api/v1/titles/{}/reviews/", catalog.ivan);
    let (_, review) = send(
        &pool,
        mail.path(),
        post(&reviews_uri, json!({"text": "Funny", "score": 10}), Some(&token)),
    )
    .await;
    send(
        &pool,
        mail.path(),
        post(
            &format!("{}{}/comments/", reviews_uri, review["id"]),
            json!({"text": "Very"}),
            Some(&token),
        ),
    )
    .await;

    let (status, _) = send(
        &pool,
        mail.path(),
        delete("/api/v1/users/leaving/", Some(&catalog.admin_token)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(common::count(&pool, "reviews").await, 0);
    assert_eq!(common::count(&pool, "comments").await, 0);

    let (status, _) = send(&pool, mail.path(), get("/api/v1/users/me/", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
