use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use petadopt_auth::SigningSecret;
use petadopt_infra::{AppConfig, InMemoryStore};
use reqwest::StatusCode;
use serde_json::{Value, json};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = AppConfig {
            jwt_secret: SigningSecret::new(JWT_SECRET),
            password_hash_cost: 4,
            ..AppConfig::default()
        };

        // Same router as prod, in-memory store, ephemeral port.
        let app = petadopt_api::app::build_app(&config, Arc::new(InMemoryStore::new()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn signup(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/signup"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Sign up and return the session token.
    async fn token_for(&self, username: &str) -> String {
        let res = self.signup(username, "hunter2").await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_listing(&self, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/listings"))
            .header("x-auth-token", token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn rex() -> Value {
    json!({
        "name": "Rex",
        "pet_type": "dog",
        "breed": "lab",
        "sex": "m",
        "date_of_birth": "2020-01-01",
    })
}

fn mint_jwt(secret: &str, alg: Algorithm, claims: Value) -> String {
    jsonwebtoken::encode(&Header::new(alg), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("failed to encode jwt")
}

async fn error_of(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    body["error"].as_str().expect("error field").to_string()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn listing_lifecycle_for_owner() {
    let srv = TestServer::spawn().await;

    let res = srv.signup("Alice", "hunter2").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    let token = body["token"].as_str().unwrap().to_string();

    let res = srv.create_listing(&token, rex()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["listed_by"], "alice");
    assert_eq!(created["name"], "Rex");
    assert_eq!(created["sex"], "m");
    let id = created["id"].as_i64().unwrap();

    let res = srv
        .client
        .get(srv.url(&format!("/listings/{id}")))
        .header("x-auth-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched["id"], created["id"]);

    let res = srv
        .client
        .delete(srv.url(&format!("/listings/{id}")))
        .header("x-auth-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["deleted"].as_i64(), Some(id));

    // Delete is not idempotent.
    let res = srv
        .client
        .delete(srv.url(&format!("/listings/{id}")))
        .header("x-auth-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_owner_is_forbidden() {
    let srv = TestServer::spawn().await;
    let alice = srv.token_for("alice").await;
    let bob = srv.token_for("bob").await;

    let created: Value = srv.create_listing(&alice, rex()).await.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    for req in [
        srv.client.get(srv.url(&format!("/listings/{id}"))),
        srv.client.delete(srv.url(&format!("/listings/{id}"))),
        srv.client.patch(srv.url(&format!("/listings/{id}"))).json(&json!({ "name": "Max" })),
    ] {
        let res = req.header("x-auth-token", &bob).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(!error_of(res).await.is_empty());
    }

    // Still there for the owner.
    let res = srv
        .client
        .get(srv.url(&format!("/listings/{id}")))
        .header("x-auth-token", &alice)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_signup_is_case_insensitive() {
    let srv = TestServer::spawn().await;
    assert_eq!(srv.signup("alice", "pw").await.status(), StatusCode::CREATED);

    let res = srv.signup("ALICE", "other").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(error_of(res).await.contains("alice"));
}

#[tokio::test]
async fn malformed_signups_are_bad_requests() {
    let srv = TestServer::spawn().await;

    let res = srv.signup("al ice", "pw").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(!error_of(res).await.is_empty());

    let res = srv.signup("alice", "").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .post(srv.url("/signup"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(!error_of(res).await.is_empty());
}

#[tokio::test]
async fn login_issues_token_only_for_valid_credentials() {
    let srv = TestServer::spawn().await;
    srv.signup("alice", "hunter2").await;

    let res = srv
        .client
        .post(srv.url("/login"))
        .json(&json!({ "username": "Alice", "password": "hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(srv.create_listing(&token, rex()).await.status(), StatusCode::CREATED);

    for (username, password) in [("alice", "wrong"), ("nobody", "hunter2")] {
        let res = srv
            .client
            .post(srv.url("/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_of(res).await, "invalid credentials");
    }
}

#[tokio::test]
async fn missing_or_bad_tokens_are_forbidden() {
    let srv = TestServer::spawn().await;
    srv.signup("alice", "hunter2").await;

    let res = srv
        .client
        .post(srv.url("/listings"))
        .json(&rex())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_of(res).await, "invalid token");

    let now = Utc::now().timestamp();
    let expired = mint_jwt(
        JWT_SECRET,
        Algorithm::HS256,
        json!({ "username": "alice", "iat": now - 7200, "exp": now - 3600 }),
    );
    let wrong_alg = mint_jwt(
        JWT_SECRET,
        Algorithm::HS512,
        json!({ "username": "alice", "iat": now, "exp": now + 3600 }),
    );
    let wrong_secret = mint_jwt(
        "other-secret",
        Algorithm::HS256,
        json!({ "username": "alice", "iat": now, "exp": now + 3600 }),
    );

    for token in [expired, wrong_alg, wrong_secret, "garbage".to_string()] {
        let res = srv.create_listing(&token, rex()).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn token_for_unknown_user_cannot_create() {
    let srv = TestServer::spawn().await;
    let now = Utc::now();
    let token = mint_jwt(
        JWT_SECRET,
        Algorithm::HS256,
        json!({
            "username": "ghost",
            "iat": now.timestamp(),
            "exp": (now + ChronoDuration::minutes(10)).timestamp(),
        }),
    );

    let res = srv.create_listing(&token, rex()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bearer_header_is_accepted() {
    let srv = TestServer::spawn().await;
    let token = srv.token_for("alice").await;

    let res = srv
        .client
        .post(srv.url("/listings"))
        .bearer_auth(&token)
        .json(&rex())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn public_listing_routes_need_no_token() {
    let srv = TestServer::spawn().await;
    let alice = srv.token_for("alice").await;
    let bob = srv.token_for("bob").await;

    srv.create_listing(&alice, rex()).await;
    srv.create_listing(&bob, json!({ "name": "Tom", "pet_type": "cat", "sex": "f", "date_of_birth": "2021-06-01" }))
        .await;
    srv.create_listing(&alice, json!({ "name": "Bun", "pet_type": "rabbit", "sex": "f", "date_of_birth": "2022-02-02" }))
        .await;

    let all: Vec<Value> = srv.client.get(srv.url("/listings")).send().await.unwrap().json().await.unwrap();
    let names: Vec<&str> = all.iter().map(|l| l["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Rex", "Tom", "Bun"]);

    let res = srv.client.get(srv.url("/Alice/listings")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let mine: Vec<Value> = res.json().await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|l| l["listed_by"] == "alice"));

    let none: Vec<Value> = srv.client.get(srv.url("/carol/listings")).send().await.unwrap().json().await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn listing_validation_errors_are_bad_requests() {
    let srv = TestServer::spawn().await;
    let token = srv.token_for("alice").await;

    let future = (Utc::now() + ChronoDuration::days(30)).date_naive().to_string();
    let cases = [
        json!({ "name": "", "pet_type": "dog", "sex": "m", "date_of_birth": "2020-01-01" }),
        json!({ "name": "Rex", "pet_type": "dog", "sex": "x", "date_of_birth": "2020-01-01" }),
        json!({ "name": "Rex", "pet_type": "dog", "sex": "m", "date_of_birth": future }),
        json!({ "name": "Rex", "sex": "m", "date_of_birth": "2020-01-01" }),
    ];
    for body in cases {
        let res = srv.create_listing(&token, body).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(!error_of(res).await.is_empty());
    }
}

#[tokio::test]
async fn owner_can_patch_but_not_reassign() {
    let srv = TestServer::spawn().await;
    let token = srv.token_for("alice").await;
    let created: Value = srv.create_listing(&token, rex()).await.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    let res = srv
        .client
        .patch(srv.url(&format!("/listings/{id}")))
        .header("x-auth-token", &token)
        .json(&json!({ "name": "Max", "breed": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["name"], "Max");
    assert_eq!(updated["breed"], "");
    assert_eq!(updated["pet_type"], "dog");
    assert_eq!(updated["listed_by"], "alice");

    for body in [json!({ "listed_by": "bob" }), json!({})] {
        let res = srv
            .client
            .patch(srv.url(&format!("/listings/{id}")))
            .header("x-auth-token", &token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn listing_ids_are_checked() {
    let srv = TestServer::spawn().await;
    let token = srv.token_for("alice").await;

    for raw in ["abc", "0", "-3"] {
        let res = srv
            .client
            .get(srv.url(&format!("/listings/{raw}")))
            .header("x-auth-token", &token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    let res = srv
        .client
        .get(srv.url("/listings/999"))
        .header("x-auth-token", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(error_of(res).await.contains("not found"));
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/nope/nope/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(!error_of(res).await.is_empty());
}

#[tokio::test]
async fn wrong_method_is_json_method_not_allowed() {
    let srv = TestServer::spawn().await;

    for req in [
        srv.client.get(srv.url("/signup")),
        srv.client.put(srv.url("/listings/1")),
        srv.client.delete(srv.url("/listings")),
    ] {
        let res = req.send().await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(res.headers().contains_key("allow"));
        assert_eq!(error_of(res).await, "method not allowed");
    }
}

#[tokio::test]
async fn lowercasing_cannot_stretch_a_username_past_the_limit() {
    let srv = TestServer::spawn().await;

    let res = srv.signup(&"İ".repeat(30), "hunter2").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Exactly at the limit once lowercased: the token must keep working.
    let res = srv.signup(&"İ".repeat(25), "hunter2").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(srv.create_listing(&token, rex()).await.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn route_names_cannot_be_usernames() {
    let srv = TestServer::spawn().await;
    for name in ["listings", "Signup"] {
        let res = srv.signup(name, "hunter2").await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(error_of(res).await.contains("reserved"));
    }
}
