//! Shared harness for the HTTP integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use yamdb::config::Config;
use yamdb::db::repositories::user::NewUser;
use yamdb::domain::Role;
use yamdb::services::{Email, MailError, Mailer};
use yamdb::state::SharedState;

pub const API: &str = "/api/v1";

/// Keeps every message so tests can read confirmation codes back.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// Confirmation code from the latest message sent to `to`.
    pub fn code_for(&self, to: &str) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        sent.iter().rev().find(|m| m.to == to).and_then(|m| {
            m.body
                .lines()
                .find_map(|line| line.strip_prefix("Your confirmation code: "))
                .map(|code| code.trim().to_string())
        })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &Email) -> Result<(), MailError> {
        Err(MailError::Transport("connection refused".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub shared: Arc<SharedState>,
    pub mailer: Arc<RecordingMailer>,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

fn test_config() -> (Config, PathBuf) {
    let db_path =
        std::env::temp_dir().join(format!("yamdb-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    config.auth.secret_key = "integration-test-secret".to_string();
    (config, db_path)
}

pub async fn spawn_app() -> TestApp {
    let mailer = Arc::new(RecordingMailer::default());
    let (router, shared, db_path) = build(mailer.clone()).await;
    TestApp {
        router,
        shared,
        mailer,
        db_path,
    }
}

/// App whose mail transport always fails.
pub async fn spawn_app_with_failing_mailer() -> TestApp {
    let (router, shared, db_path) = build(Arc::new(FailingMailer)).await;
    TestApp {
        router,
        shared,
        mailer: Arc::new(RecordingMailer::default()),
        db_path,
    }
}

async fn build(mailer: Arc<dyn Mailer>) -> (Router, Arc<SharedState>, PathBuf) {
    let (config, db_path) = test_config();
    let shared = Arc::new(
        SharedState::with_mailer(config, mailer)
            .await
            .expect("failed to create shared state"),
    );
    let state = yamdb::api::create_app_state(shared.clone(), None);
    let router = yamdb::api::router(state).await;
    (router, shared, db_path)
}

impl TestApp {
    /// Sends a request under the API prefix and returns status and JSON body
    /// (`Value::Null` for empty or non-JSON bodies).
    pub async fn send(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{API}{path}"));
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("GET", path, token, None).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("POST", path, token, Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send("PATCH", path, token, Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send("DELETE", path, token, None).await
    }

    /// Runs signup and token exchange for `username` and returns the token.
    pub async fn login(&self, username: &str) -> String {
        let email = format!("{username}@example.com");
        let (status, body) = self
            .post(
                "/auth/signup/",
                None,
                json!({"username": username, "email": email}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "signup failed: {body}");

        let code = self.mailer.code_for(&email).expect("no confirmation code");
        let (status, body) = self
            .post(
                "/auth/token/",
                None,
                json!({"username": username, "confirmation_code": code}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "token failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Creates `username` with `role` directly in storage and logs in.
    pub async fn login_as(&self, username: &str, role: Role) -> String {
        self.shared
            .store
            .user_repo()
            .create(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                role,
                ..NewUser::default()
            })
            .await
            .expect("failed to create user");
        self.login(username).await
    }

    /// Category `books`, genres `drama` and `comedy`, and one title in them.
    /// Returns the title id.
    pub async fn seed_catalog(&self, admin: &str) -> i64 {
        for (path, name, slug) in [
            ("/categories/", "Books", "books"),
            ("/genres/", "Drama", "drama"),
            ("/genres/", "Comedy", "comedy"),
        ] {
            let (status, body) = self
                .post(path, Some(admin), json!({"name": name, "slug": slug}))
                .await;
            assert_eq!(status, StatusCode::CREATED, "seeding {slug}: {body}");
        }

        self.create_title(admin, "War and Peace", 1869, "books", &["drama"])
            .await
    }

    pub async fn create_title(
        &self,
        admin: &str,
        name: &str,
        year: i32,
        category: &str,
        genres: &[&str],
    ) -> i64 {
        let (status, body) = self
            .post(
                "/titles/",
                Some(admin),
                json!({
                    "name": name,
                    "year": year,
                    "description": "",
                    "category": category,
                    "genre": genres,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "creating title: {body}");
        body["id"].as_i64().unwrap()
    }
}
