/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - An application over an in-memory store, seeded with the demo data
/// - JWT token generation for the seeded users
/// - Request helpers that drive the router directly

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use tasklist_api::app::{build_router, AppState};
use tasklist_api::config::Config;
use tasklist_shared::auth::password::Argon2Hasher;
use tasklist_shared::db::seed::seed_demo_data;
use tasklist_shared::models::user::User;
use tasklist_shared::repository::{InMemoryStore, UserRepository};
use tower::Service as _;

pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

pub const ADMIN_EMAIL: &str = "jhex@email.com";
pub const ARMANDO_EMAIL: &str = "armando@email.com";
pub const AMELIA_EMAIL: &str = "amelia@email.com";
pub const JOSE_EMAIL: &str = "josecardamomo@email.com";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: InMemoryStore,
    pub state: AppState,
    pub app: axum::Router,
}

/// Response status and parsed JSON body (`Null` when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// Messages of an error envelope
    pub fn errors(&self) -> Vec<String> {
        self.body["errors"]
            .as_array()
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl TestContext {
    /// Creates a new test context over a freshly seeded store
    pub async fn new() -> Self {
        let store = InMemoryStore::new();
        let hasher = Arc::new(Argon2Hasher::with_cost(1024, 1, 1).unwrap());

        seed_demo_data(&store, &store, hasher.as_ref()).await.unwrap();

        let state = AppState::from_parts(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            hasher,
            Config::for_testing(SECRET),
        );
        let app = build_router(state.clone());

        Self { store, state, app }
    }

    pub async fn user(&self, email: &str) -> User {
        UserRepository::find_by_email(&self.store, email)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("no user {email}"))
    }

    /// Authorization header value for the user with `email`
    pub async fn bearer(&self, email: &str) -> String {
        let user = self.user(email).await;
        format!("Bearer {}", self.state.issue_token(&user).unwrap())
    }

    /// Sends a request and parses the response
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(bearer) = bearer {
            builder = builder.header(header::AUTHORIZATION, bearer);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_request(request).await
    }

    /// Sends a prepared request, e.g. one with a raw body
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })
        };

        TestResponse { status, body }
    }

    /// Sends a request as the user with `email`
    pub async fn send_as(
        &self,
        email: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> TestResponse {
        let bearer = self.bearer(email).await;
        self.send(method, uri, Some(&bearer), body).await
    }
}
