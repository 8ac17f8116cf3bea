//! HTTP-level tests for the full router

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use data_encoding::BASE64;
use serde_json::{json, Value};

use super::{build_router, AppState};
use crate::db::repositories::{
    SqlxAccessTokenRepository, SqlxPostRepository, SqlxTagRepository, SqlxUserRepository,
};
use crate::db::{create_test_pool, migrations::run_migrations};
use crate::services::{AuthService, PostService, TagService};

async fn test_state() -> AppState {
    let pool = create_test_pool().await.unwrap();
    run_migrations(&pool).await.unwrap();

    let tag_repo = SqlxTagRepository::boxed(pool.clone());
    AppState {
        auth_service: Arc::new(AuthService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxAccessTokenRepository::boxed(pool.clone()),
        )),
        post_service: Arc::new(PostService::new(
            SqlxPostRepository::boxed(pool.clone()),
            tag_repo.clone(),
        )),
        tag_service: Arc::new(TagService::new(tag_repo)),
    }
}

async fn test_server() -> TestServer {
    TestServer::new(build_router(test_state().await, "*")).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

fn basic(username: &str, password: &str) -> HeaderValue {
    let encoded = BASE64.encode(format!("{}:{}", username, password).as_bytes());
    HeaderValue::from_str(&format!("Basic {}", encoded)).unwrap()
}

/// Register an account and return its token
async fn register(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post("/register")
        .json(&json!({ "username": username, "password": password }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_post(server: &TestServer, token: &str, title: &str) -> Value {
    let response = server
        .post("/api/v1/posts")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(&json!({ "title": title, "content": "Body", "published": false }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

async fn create_tag(server: &TestServer, token: &str, title: &str) -> Value {
    let response = server
        .post("/api/v1/tags")
        .add_header(header::AUTHORIZATION, bearer(token))
        .json(&json!({ "title": title }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

#[tokio::test]
async fn test_public_routes() {
    let server = test_server().await;

    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().starts_with("Postboard"));

    let response = server.get("/hello").await;
    assert_eq!(response.json::<Value>(), json!({ "Hello": "World!" }));

    let response = server.get("/hello/Grant").await;
    assert_eq!(response.text(), "Hello, Grant!");
}

#[tokio::test]
async fn test_websocket_replies_reversed() {
    // Upgrades need a real socket rather than the mock transport
    let server = TestServer::builder()
        .http_transport()
        .build(build_router(test_state().await, "*"))
        .unwrap();

    let mut websocket = server.get_websocket("/ws").await.into_websocket().await;

    websocket.send_text("hello").await;
    websocket.assert_receive_text("olleh").await;

    websocket.send_text("e\u{301}a").await;
    websocket.assert_receive_text("ae\u{301}").await;
}

#[tokio::test]
async fn test_register_returns_token_and_user() {
    let server = test_server().await;

    let response = server
        .post("/register")
        .json(&json!({ "username": "alice", "password": "secret" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let server = test_server().await;
    register(&server, "alice", "secret").await;

    let response = server
        .post("/register")
        .json(&json!({ "username": "alice", "password": "other" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_missing_fields() {
    let server = test_server().await;

    let response = server
        .post("/register")
        .json(&json!({ "username": "alice" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/register")
        .json(&json!({ "username": "", "password": "secret" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_token_with_basic_credentials() {
    let server = test_server().await;
    register(&server, "alice", "secret").await;

    let response = server
        .post("/token")
        .add_header(header::AUTHORIZATION, basic("alice", "secret"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let token = response.json::<Value>()["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server
        .get("/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "alice");
}

#[tokio::test]
async fn test_token_rejects_bad_credentials() {
    let server = test_server().await;
    register(&server, "alice", "secret").await;

    let response = server
        .post("/token")
        .add_header(header::AUTHORIZATION, basic("alice", "wrong"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server.post("/token").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_bearer() {
    let server = test_server().await;

    for path in ["/me", "/users", "/posts", "/api/v1/posts", "/api/v1/tags"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED, "{}", path);

        let response = server
            .get(path)
            .add_header(header::AUTHORIZATION, bearer("not-a-token"))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED, "{}", path);
    }
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let server = test_server().await;
    let token = register(&server, "alice", "secret").await;

    let response = server
        .post("/logout")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get("/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_users_excludes_caller() {
    let server = test_server().await;
    let token = register(&server, "alice", "secret").await;
    register(&server, "bob", "secret").await;

    let response = server
        .get("/users")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let users: Value = response.json();
    let names: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|user| user["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["bob"]);
}

#[tokio::test]
async fn test_post_create_and_show() {
    let server = test_server().await;
    let token = register(&server, "alice", "secret").await;

    let created = create_post(&server, &token, "First").await;
    assert_eq!(created["data"]["type"], "posts");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = server
        .get(&format!("/api/v1/posts/{}", id))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["attributes"]["title"], "First");
    assert_eq!(body["data"]["attributes"]["content"], "Body");
    assert_eq!(body["data"]["attributes"]["published"], false);
    assert_eq!(body["data"]["relationships"]["tags"]["data"], json!([]));
    assert!(body.get("included").is_none());
}

#[tokio::test]
async fn test_post_create_validation() {
    let server = test_server().await;
    let token = register(&server, "alice", "secret").await;

    let response = server
        .post("/api/v1/posts")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "No body", "published": true }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // Wrong JSON type is a bad request, not a 422
    let response = server
        .post("/api/v1/posts")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": 5, "content": "Body", "published": true }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_ids_are_not_found() {
    let server = test_server().await;
    let token = register(&server, "alice", "secret").await;

    for path in [
        "/api/v1/posts/abc",
        "/api/v1/posts/99999999999999999999",
        "/api/v1/tags/abc",
        "/api/v1/tags/99999999999999999999",
    ] {
        let response = server
            .get(path)
            .add_header(header::AUTHORIZATION, bearer(&token))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "{}", path);
        assert_eq!(response.json::<Value>()["error"]["code"], "NOT_FOUND", "{}", path);
    }

    let response = server
        .post("/api/v1/posts/abc/tags/1")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server
        .delete("/api/v1/posts/abc")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_patch_and_replace() {
    let server = test_server().await;
    let token = register(&server, "alice", "secret").await;
    let created = create_post(&server, &token, "Draft").await;
    let path = format!("/api/v1/posts/{}", created["data"]["id"].as_str().unwrap());

    let response = server
        .patch(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "published": true, "author": "ignored" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["attributes"]["title"], "Draft");
    assert_eq!(body["data"]["attributes"]["published"], true);

    // Replace without content fails and leaves the post alone
    let response = server
        .put(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "Final", "published": true }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let body: Value = server
        .get(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(body["data"]["attributes"]["title"], "Draft");

    let response = server
        .put(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "Final", "content": "Done", "published": false }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["attributes"]["title"], "Final");
    assert_eq!(body["data"]["attributes"]["content"], "Done");
    assert_eq!(body["data"]["attributes"]["published"], false);
}

#[tokio::test]
async fn test_post_soft_delete() {
    let server = test_server().await;
    let token = register(&server, "alice", "secret").await;
    let created = create_post(&server, &token, "Doomed").await;
    create_post(&server, &token, "Survivor").await;
    let path = format!("/api/v1/posts/{}", created["data"]["id"].as_str().unwrap());

    let response = server
        .delete(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .get(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server
        .delete(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let body: Value = server
        .get("/posts")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|post| post["attributes"]["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Survivor"]);
}

#[tokio::test]
async fn test_add_tag_to_post() {
    let server = test_server().await;
    let token = register(&server, "alice", "secret").await;
    let post = create_post(&server, &token, "Tagged").await;
    let tag = create_tag(&server, &token, "News").await;
    let post_id = post["data"]["id"].as_str().unwrap();
    let tag_id = tag["data"]["id"].as_str().unwrap();
    let path = format!("/api/v1/posts/{}/tags/{}", post_id, tag_id);

    let response = server
        .post(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(
        body["data"]["relationships"]["tags"]["data"],
        json!([{ "type": "tags", "id": tag_id }])
    );
    assert_eq!(body["included"][0]["attributes"]["title"], "News");

    let response = server
        .post(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "This tag has already been added"
    );

    let body: Value = server
        .get(&format!("/api/v1/tags/{}", tag_id))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(body["data"]["attributes"]["post-count"], 1);

    let response = server
        .post(&format!("/api/v1/posts/{}/tags/999", post_id))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tag_lifecycle_and_clear() {
    let server = test_server().await;
    let token = register(&server, "alice", "secret").await;
    let tag = create_tag(&server, &token, "News").await;
    create_tag(&server, &token, "Happening").await;
    let path = format!("/api/v1/tags/{}", tag["data"]["id"].as_str().unwrap());

    let response = server
        .patch(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "title": "Breaking" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>()["data"]["attributes"]["title"],
        "Breaking"
    );

    let response = server
        .put(&path)
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .delete("/api/v1/tags")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = server
        .get("/api/v1/tags")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(body["data"], json!([]));
}
