// tests/common/mod.rs
// DOCUMENTATION: Shared harness for database-backed API tests
// PURPOSE: Build the /api app over a per-test pool and seed users and catalog rows

#![allow(dead_code)]

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::path::Path;
use yamdb::auth::generate_access_token;
use yamdb::config::Config;
use yamdb::db::UserRepository;
use yamdb::handlers::api_config;
use yamdb::models::{CreateUserRequest, Role, User};
use yamdb::services::{AuthRateLimiter, FileMailer};

/// Configuration with safe defaults; the pool comes from `#[sqlx::test]`
pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_address: "127.0.0.1".to_string(),
        server_port: 0,
        environment: "test".to_string(),
        log_level: "debug".to_string(),
        secret_key: "integration-secret-that-is-long-enough".to_string(),
        access_token_lifetime_days: 1,
        page_size: 10,
        email_file_path: String::new(),
        default_from_email: "webmaster@localhost".to_string(),
        auth_rate_limit_per_minute: 0,
        trusted_proxies: Vec::new(),
        db_max_connections: 5,
        db_connection_timeout: 5,
        data_dir: "static/data".to_string(),
    }
}

/// Send one request through the full /api scope
/// Returns the status and the JSON body (`Null` for empty bodies)
pub async fn send(pool: &PgPool, mail_dir: &Path, req: test::TestRequest) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(test_config()))
            .app_data(web::Data::new(AuthRateLimiter::new(0)))
            .app_data(web::Data::new(FileMailer::new(mail_dir, "webmaster@localhost")))
            .configure(api_config),
    )
    .await;

    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("response body should be JSON")
    };
    (status, json)
}

fn with_token(req: test::TestRequest, token: Option<&str>) -> test::TestRequest {
    match token {
        Some(token) => req.insert_header(("Authorization", format!("Bearer {}", token))),
        None => req,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> test::TestRequest {
    with_token(test::TestRequest::get().uri(uri), token)
}

pub fn post(uri: &str, body: Value, token: Option<&str>) -> test::TestRequest {
    with_token(test::TestRequest::post().uri(uri).set_json(body), token)
}

pub fn patch(uri: &str, body: Value, token: Option<&str>) -> test::TestRequest {
    with_token(test::TestRequest::patch().uri(uri).set_json(body), token)
}

pub fn delete(uri: &str, token: Option<&str>) -> test::TestRequest {
    with_token(test::TestRequest::delete().uri(uri), token)
}

/// Insert a user directly and return it with a valid access token
pub async fn create_user(pool: &PgPool, username: &str, role: Role) -> (User, String) {
    let req = CreateUserRequest {
        username: username.to_string(),
        email: format!("{}@yamdb.test", username),
        first_name: String::new(),
        last_name: String::new(),
        bio: Some(format!("{} bio", username)),
        role,
    };
    let user = UserRepository::create(pool, &req)
        .await
        .expect("user creation should succeed");
    let token =
        generate_access_token(user.id, &test_config()).expect("token generation should succeed");
    (user, token)
}

pub async fn count(pool: &PgPool, table: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("count should succeed");
    n
}

/// Catalog seeded through the API by an admin
/// Categories movie/book; genres drama/sci-fi/comedy; titles:
/// Solaris (1972, movie, drama + sci-fi), Roadside Picnic (1972, book, sci-fi),
/// Ivan Vasilievich (1973, movie, comedy)
pub struct Catalog {
    pub admin_token: String,
    pub solaris: i64,
    pub picnic: i64,
    pub ivan: i64,
}

pub async fn seed_catalog(pool: &PgPool, mail_dir: &Path) -> Catalog {
    let (_, admin_token) = create_user(pool, "catalog_admin", Role::Admin).await;
    let token = Some(admin_token.as_str());

    for (name, slug) in [("Movie", "movie"), ("Book", "book")] {
        let (status, _) = send(
            pool,
            mail_dir,
            post("/api/v1/categories/", json!({"name": name, "slug": slug}), token),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    for (name, slug) in [("Drama", "drama"), ("Sci-fi", "sci-fi"), ("Comedy", "comedy")] {
        let (status, _) = send(
            pool,
            mail_dir,
            post("/api/v1/genres/", json!({"name": name, "slug": slug}), token),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let mut ids = Vec::new();
    for body in [
        json!({"name": "Solaris", "year": 1972, "description": "Ocean",
               "genre": ["drama", "sci-fi"], "category": "movie"}),
        json!({"name": "Roadside Picnic", "year": 1972,
               "genre": ["sci-fi"], "category": "book"}),
        json!({"name": "Ivan Vasilievich", "year": 1973,
               "genre": ["comedy"], "category": "movie"}),
    ] {
        let (status, title) = send(pool, mail_dir, post("/api/v1/titles/", body, token)).await;
        assert_eq!(status, StatusCode::CREATED, "{}", title);
        ids.push(title["id"].as_i64().expect("title id"));
    }

    Catalog {
        admin_token,
        solaris: ids[0],
        picnic: ids[1],
        ivan: ids[2],
    }
}
