mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use booking_auth::models::Role;
use common::{body_json, TestApp};

async fn bearer_for(app: &TestApp, email: &str, password: &str) -> String {
    let login = app
        .post_json("/api/auth/login", json!({"email": email, "password": password}))
        .await;
    assert_eq!(login.status(), StatusCode::OK);
    let body = body_json(login).await;
    format!("Bearer {}", body["token"].as_str().unwrap())
}

async fn change_password(
    app: &TestApp,
    bearer: &str,
    current: &str,
    new: &str,
) -> axum::response::Response {
    app.request(
        Method::POST,
        "/api/auth/change-password",
        Some(json!({"currentPassword": current, "newPassword": new})),
        &[("authorization", bearer)],
    )
    .await
}

#[tokio::test]
async fn change_password_rotates_the_credential() {
    let app = TestApp::spawn();
    app.seed_identity("alice@example.com", "Str0ng@pass", Role::User)
        .await;
    let bearer = bearer_for(&app, "alice@example.com", "Str0ng@pass").await;

    let response = change_password(&app, &bearer, "Str0ng@pass", "N3w@secret").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Password changed successfully"
    );

    // old password no longer works, new one does
    let old = app
        .post_json(
            "/api/auth/login",
            json!({"email": "alice@example.com", "password": "Str0ng@pass"}),
        )
        .await;
    assert_eq!(old.status(), StatusCode::BAD_REQUEST);
    let new = app
        .post_json(
            "/api/auth/login",
            json!({"email": "alice@example.com", "password": "N3w@secret"}),
        )
        .await;
    assert_eq!(new.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_current_password_is_rejected() {
    let app = TestApp::spawn();
    app.seed_identity("bob@example.com", "Str0ng@pass", Role::User)
        .await;
    let bearer = bearer_for(&app, "bob@example.com", "Str0ng@pass").await;

    let response = change_password(&app, &bearer, "Wr0ng@pass1", "N3w@secret").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "Current password is incorrect"
    );
}

#[tokio::test]
async fn new_password_must_satisfy_the_policy() {
    let app = TestApp::spawn();
    app.seed_identity("carol@example.com", "Str0ng@pass", Role::User)
        .await;
    let bearer = bearer_for(&app, "carol@example.com", "Str0ng@pass").await;

    let response = change_password(&app, &bearer, "Str0ng@pass", "weak").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["errors"].is_array());
}

#[tokio::test]
async fn reusing_a_recent_password_is_rejected() {
    let app = TestApp::spawn();
    app.seed_identity("dave@example.com", "Str0ng@pas1", Role::User)
        .await;
    let bearer = bearer_for(&app, "dave@example.com", "Str0ng@pas1").await;

    let rotated = change_password(&app, &bearer, "Str0ng@pas1", "Str0ng@pas2").await;
    assert_eq!(rotated.status(), StatusCode::OK);

    // the original is now in the history
    let reuse = change_password(&app, &bearer, "Str0ng@pas2", "Str0ng@pas1").await;
    assert_eq!(reuse.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(reuse).await["message"],
        "New password cannot be the same as any of your previous 5 passwords"
    );
}

#[tokio::test]
async fn unchanged_password_counts_as_reuse() {
    let app = TestApp::spawn();
    app.seed_identity("erin@example.com", "Str0ng@pas1", Role::User)
        .await;
    let bearer = bearer_for(&app, "erin@example.com", "Str0ng@pas1").await;

    let response = change_password(&app, &bearer, "Str0ng@pas1", "Str0ng@pas1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_depth_is_five_so_the_sixth_oldest_becomes_usable() {
    let app = TestApp::spawn();
    app.seed_identity("frank@example.com", "Str0ng@pas0", Role::User)
        .await;
    let bearer = bearer_for(&app, "frank@example.com", "Str0ng@pas0").await;

    // rotate through six distinct passwords; pas0 then falls off the history
    for n in 0..6 {
        let current = format!("Str0ng@pas{n}");
        let next = format!("Str0ng@pas{}", n + 1);
        let response = change_password(&app, &bearer, &current, &next).await;
        assert_eq!(response.status(), StatusCode::OK, "rotation {n} failed");
    }

    let response = change_password(&app, &bearer, "Str0ng@pas6", "Str0ng@pas0").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn vanished_identity_yields_not_found() {
    let app = TestApp::spawn();
    let identity = app
        .seed_identity("gone@example.com", "Str0ng@pass", Role::User)
        .await;
    let bearer = bearer_for(&app, "gone@example.com", "Str0ng@pass").await;

    app.store.remove(identity.identity_id);

    let response = change_password(&app, &bearer, "Str0ng@pass", "N3w@secret").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "User not found");
}

#[tokio::test]
async fn change_password_requires_authentication() {
    let app = TestApp::spawn();
    let response = app
        .post_json(
            "/api/auth/change-password",
            json!({"currentPassword": "Str0ng@pass", "newPassword": "N3w@secret"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
