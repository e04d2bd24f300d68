mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use booking_auth::{models::Role, services::RecordStore};
use common::{body_json, session_cookie, TestApp};

#[tokio::test]
async fn login_returns_token_user_payload_and_session_cookie() {
    let app = TestApp::spawn();
    app.seed_identity("alice@example.com", "Str0ng@pass", Role::User)
        .await;

    let response = app
        .post_json(
            "/api/auth/login",
            json!({"email": "alice@example.com", "password": "Str0ng@pass"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).expect("no session cookie set");
    assert!(cookie.starts_with("booking_session="));

    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Login successful");
    assert!(body["token"].is_string());
    assert!(body["userId"].is_string());
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["firstName"], "Test");
    assert_eq!(body["user"]["lastName"], "User");
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
async fn login_email_is_case_insensitive() {
    let app = TestApp::spawn();
    app.seed_identity("alice@example.com", "Str0ng@pass", Role::User)
        .await;

    let response = app
        .post_json(
            "/api/auth/login",
            json!({"email": "ALICE@example.COM", "password": "Str0ng@pass"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_email_and_wrong_password_are_indistinguishable() {
    let app = TestApp::spawn();
    app.seed_identity("alice@example.com", "Str0ng@pass", Role::User)
        .await;

    let wrong_password = app
        .post_json(
            "/api/auth/login",
            json!({"email": "alice@example.com", "password": "Wr0ng@pass1"}),
        )
        .await;
    let unknown_email = app
        .post_json(
            "/api/auth/login",
            json!({"email": "nobody@example.com", "password": "Wr0ng@pass1"}),
        )
        .await;

    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_email.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(wrong_password).await,
        body_json(unknown_email).await
    );
}

#[tokio::test]
async fn malformed_email_is_rejected_before_lookup() {
    let app = TestApp::spawn();
    let response = app
        .post_json(
            "/api/auth/login",
            json!({"email": "not-an-email", "password": "Str0ng@pass"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fifth_failure_locks_the_account() {
    let app = TestApp::spawn();
    let identity = app
        .seed_identity("bob@example.com", "Str0ng@pass", Role::User)
        .await;

    for _ in 0..5 {
        let response = app
            .post_json(
                "/api/auth/login",
                json!({"email": "bob@example.com", "password": "Wr0ng@pass1"}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // even the correct password is refused while locked
    let locked = app
        .post_json(
            "/api/auth/login",
            json!({"email": "bob@example.com", "password": "Str0ng@pass"}),
        )
        .await;
    assert_eq!(locked.status(), StatusCode::LOCKED);
    let body = body_json(locked).await;
    assert_eq!(body["status"], "error");

    let stored = app.store.find_by_id(identity.identity_id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_attempts, 5);
    assert!(stored.locked_until.is_some());
}

#[tokio::test]
async fn expired_lock_allows_login_and_clears_the_counter() {
    let app = TestApp::spawn();
    let identity = app
        .seed_identity("carol@example.com", "Str0ng@pass", Role::User)
        .await;

    for _ in 0..5 {
        app.post_json(
            "/api/auth/login",
            json!({"email": "carol@example.com", "password": "Wr0ng@pass1"}),
        )
        .await;
    }

    // the two-hour window elapses
    app.store.set_locked_until(
        identity.identity_id,
        Some(Utc::now() - Duration::minutes(1)),
    );

    let response = app
        .post_json(
            "/api/auth/login",
            json!({"email": "carol@example.com", "password": "Str0ng@pass"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = app.store.find_by_id(identity.identity_id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_attempts, 0);
    assert!(stored.locked_until.is_none());
    assert!(stored.last_login_utc.is_some());
}

#[tokio::test]
async fn failure_after_expired_lock_restarts_the_counter() {
    let app = TestApp::spawn();
    let identity = app
        .seed_identity("dave@example.com", "Str0ng@pass", Role::User)
        .await;

    for _ in 0..5 {
        app.post_json(
            "/api/auth/login",
            json!({"email": "dave@example.com", "password": "Wr0ng@pass1"}),
        )
        .await;
    }
    app.store.set_locked_until(
        identity.identity_id,
        Some(Utc::now() - Duration::minutes(1)),
    );

    let response = app
        .post_json(
            "/api/auth/login",
            json!({"email": "dave@example.com", "password": "Wr0ng@pass1"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stored = app.store.find_by_id(identity.identity_id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_attempts, 1);
    assert!(stored.locked_until.is_none());
}

#[tokio::test]
async fn successful_login_resets_an_existing_counter() {
    let app = TestApp::spawn();
    let identity = app
        .seed_identity("erin@example.com", "Str0ng@pass", Role::User)
        .await;

    for _ in 0..3 {
        app.post_json(
            "/api/auth/login",
            json!({"email": "erin@example.com", "password": "Wr0ng@pass1"}),
        )
        .await;
    }

    let response = app
        .post_json(
            "/api/auth/login",
            json!({"email": "erin@example.com", "password": "Str0ng@pass"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = app.store.find_by_id(identity.identity_id).await.unwrap().unwrap();
    assert_eq!(stored.failed_login_attempts, 0);
}

#[tokio::test]
async fn issued_token_passes_validate_endpoint() {
    let app = TestApp::spawn();
    app.seed_identity("frank@example.com", "Str0ng@pass", Role::User)
        .await;

    let login = app
        .post_json(
            "/api/auth/login",
            json!({"email": "frank@example.com", "password": "Str0ng@pass"}),
        )
        .await;
    let body = body_json(login).await;
    let token = body["token"].as_str().unwrap().to_string();
    let user_id = body["userId"].as_str().unwrap().to_string();
    assert!(Uuid::parse_str(&user_id).is_ok());

    let bearer = format!("Bearer {token}");
    let response = app
        .request(
            Method::GET,
            "/api/auth/validate-token",
            None,
            &[("authorization", bearer.as_str())],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["userId"], user_id.as_str());
}
