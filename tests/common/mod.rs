#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use booking_auth::{
    build_router,
    config::{
        AuthConfig, DatabaseConfig, Environment, RedisConfig, SecurityConfig, SessionConfig,
        TokenConfig,
    },
    models::{Identity, Role},
    services::{MemoryAuditSink, MemoryOwnership, MemoryRecordStore, MemorySessionStore},
    utils::password::{hash_password, Password},
    AppState,
};

pub fn test_config() -> AuthConfig {
    AuthConfig {
        environment: Environment::Development,
        service_name: "booking-auth-test".to_string(),
        log_level: "warn".to_string(),
        port: 0,
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
        },
        redis: RedisConfig {
            url: "redis://unused".to_string(),
        },
        token: TokenConfig {
            secret: "test-secret-with-at-least-32-chars!!".to_string(),
            validity_days: 30,
        },
        session: SessionConfig {
            ttl_seconds: 2_592_000,
            cookie_secure: false,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        otlp_endpoint: None,
    }
}

/// A full router over in-memory stores, plus handles to those stores for
/// seeding and assertions.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryRecordStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub ownership: Arc<MemoryOwnership>,
    pub audit: Arc<MemoryAuditSink>,
}

impl TestApp {
    pub fn spawn() -> Self {
        let store = Arc::new(MemoryRecordStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let ownership = Arc::new(MemoryOwnership::new());
        let audit = Arc::new(MemoryAuditSink::new());

        let state = AppState::new(
            test_config(),
            Arc::clone(&store) as _,
            Arc::clone(&sessions) as _,
            Arc::clone(&ownership) as _,
            Arc::clone(&audit) as _,
        )
        .expect("failed to build test state");
        let router = build_router(state.clone());

        Self {
            router,
            state,
            store,
            sessions,
            ownership,
            audit,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("failed to build request"),
            None => builder.body(Body::empty()).expect("failed to build request"),
        };
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.request(Method::POST, uri, Some(body), &[]).await
    }

    /// Inserts an identity directly, bypassing the registration endpoint.
    pub async fn seed_identity(&self, email: &str, password: &str, role: Role) -> Identity {
        let hash = hash_password(&Password::new(password.to_string()))
            .expect("failed to hash seed password");
        let mut identity = Identity::new(
            email.to_string(),
            hash.into_string(),
            "Test".to_string(),
            "User".to_string(),
        );
        identity.role_code = role.as_str().to_string();
        use booking_auth::services::RecordStore;
        self.store
            .insert(&identity)
            .await
            .expect("failed to seed identity");
        identity
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body was not JSON")
}

/// Extracts the `name=value` pair of the session cookie from a response.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// The raw session handle (cookie value) from a response.
pub fn session_handle(response: &Response<Body>) -> Option<String> {
    session_cookie(response)
        .and_then(|pair| pair.split_once('=').map(|(_, value)| value.to_string()))
}
