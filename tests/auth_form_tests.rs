// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Form endpoint tests: sign-up, sign-in and password reset.
//!
//! The identity backend is a recording fake and profiles live in memory,
//! so each test can check both the page feedback and the side effects.

use account_portal::config::Config;
use account_portal::db::{ProfileStore, WriteMode};
use account_portal::middleware::auth::SESSION_COOKIE;
use account_portal::models::{Provider, UserProfile};
use account_portal::services::{AuthErrorCode, FormKind};
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, find_cookie, json_post, set_cookie_headers, Call, FakeIdentityProvider};

#[tokio::test]
async fn test_signup_success_writes_full_profile() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(json_post(
            "/api/auth/signup",
            json!({ "username": "Jane Doe", "email": " jane@example.com ", "password": "Str0ng!pass" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(find_cookie(&set_cookie_headers(&response), SESSION_COOKIE).is_some());

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["button"], "loading");
    assert_eq!(body["redirect"]["to"], "/index.html");
    assert_eq!(body["redirect"]["after_ms"], 2000);
    assert_eq!(
        body["notification"]["message"],
        "Account created successfully! Redirecting..."
    );
    assert_eq!(body["notification"]["display_ms"], 3000);
    assert_eq!(body["clear_fields"], json!(["username", "email", "password"]));

    assert_eq!(
        app.auth.calls(),
        vec![Call::CreateAccount("jane@example.com".to_string())]
    );

    let profile = app.store.snapshot("uid-jane").expect("profile written");
    assert_eq!(profile.name.as_deref(), Some("Jane Doe"));
    assert_eq!(profile.email.as_deref(), Some("jane@example.com"));
    assert_eq!(profile.provider, Some(Provider::Email));
    assert_eq!(profile.uid.as_deref(), Some("uid-jane"));
    assert_eq!(profile.email_verified, Some(false));
    assert_eq!(profile.profile_complete, Some(true));
    assert_eq!(profile.created_at, profile.last_login);
    assert!(profile.created_at.unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_signup_validation_makes_no_backend_call() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(json_post(
            "/api/auth/signup",
            json!({ "username": "J", "email": "jane@example.com", "password": "Str0ng!pass" }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["button"], "idle");
    assert_eq!(
        body["notification"]["message"],
        "Name must be at least 2 characters long"
    );
    // Sign-up clears its inputs even on validation failures
    assert_eq!(body["clear_fields"], json!(["username", "email", "password"]));

    assert!(app.auth.calls().is_empty());
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_signup_weak_password_rejected_locally() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(json_post(
            "/api/auth/signup",
            json!({ "username": "Jane", "email": "jane@example.com", "password": "password1" }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(
        body["notification"]["message"],
        "Password must be at least 8 characters with uppercase, lowercase, number, and special character"
    );
    assert!(app.auth.calls().is_empty());
}

#[tokio::test]
async fn test_signup_existing_email() {
    let app = common::create_test_app_with(
        Config::test_default(),
        FakeIdentityProvider::failing(AuthErrorCode::EmailAlreadyInUse),
    );

    let response = app
        .router
        .oneshot(json_post(
            "/api/auth/signup",
            json!({ "username": "Jane", "email": "jane@example.com", "password": "Str0ng!pass" }),
        ))
        .await
        .unwrap();

    assert!(find_cookie(&set_cookie_headers(&response), SESSION_COOKIE).is_none());
    let body = body_json(response).await;
    assert_eq!(
        body["notification"]["message"],
        "An account already exists with this email address."
    );
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_login_first_time_creates_profile() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(json_post(
            "/api/auth/login",
            json!({ "email": "jane@example.com", "password": "whatever" }),
        ))
        .await
        .unwrap();

    assert!(find_cookie(&set_cookie_headers(&response), SESSION_COOKIE).is_some());
    let body = body_json(response).await;
    assert_eq!(body["redirect"]["to"], "/index.html");
    assert_eq!(body["redirect"]["after_ms"], 0);
    assert_eq!(body["clear_fields"], json!(["email", "password"]));

    let profile = app.store.snapshot("uid-jane").unwrap();
    assert_eq!(profile.name.as_deref(), Some("jane"));
    assert_eq!(profile.email.as_deref(), Some("jane@example.com"));
    assert!(profile.created_at.is_some());
    assert!(profile.provider.is_none());
    assert!(profile.profile_complete.is_none());
}

#[tokio::test]
async fn test_login_existing_profile_only_touches_last_login() {
    let app = common::create_test_app();
    let existing = UserProfile {
        name: Some("Jane Doe".to_string()),
        created_at: Some("2025-01-01T00:00:00.000Z".to_string()),
        last_login: Some("2025-01-01T00:00:00.000Z".to_string()),
        profile_complete: Some(true),
        ..Default::default()
    };
    app.store
        .write_profile("uid-jane", &existing, WriteMode::Replace)
        .await
        .unwrap();

    app.router
        .oneshot(json_post(
            "/api/auth/login",
            json!({ "email": "jane@example.com", "password": "whatever" }),
        ))
        .await
        .unwrap();

    let profile = app.store.snapshot("uid-jane").unwrap();
    assert_eq!(profile.name.as_deref(), Some("Jane Doe"));
    assert_eq!(profile.created_at.as_deref(), Some("2025-01-01T00:00:00.000Z"));
    assert_ne!(profile.last_login, existing.last_login);
    assert_eq!(profile.profile_complete, Some(true));
}

#[tokio::test]
async fn test_login_unknown_backend_code_shows_generic_message() {
    let app = common::create_test_app_with(
        Config::test_default(),
        FakeIdentityProvider::failing(AuthErrorCode::from_code("auth/quota-exceeded")),
    );

    let response = app
        .router
        .oneshot(json_post(
            "/api/auth/login",
            json!({ "email": "jane@example.com", "password": "whatever" }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["button"], "idle");
    assert_eq!(
        body["notification"]["message"],
        "An unexpected error occurred. Please try again."
    );
    assert_eq!(body["notification"]["display_ms"], 5000);
    assert_eq!(app.auth.calls().len(), 1);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = common::create_test_app_with(
        Config::test_default(),
        FakeIdentityProvider::failing(AuthErrorCode::InvalidCredential),
    );

    let response = app
        .router
        .oneshot(json_post(
            "/api/auth/login",
            json!({ "email": "jane@example.com", "password": "nope" }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(
        body["notification"]["message"],
        "Invalid email or password. Please try again."
    );
}

#[tokio::test]
async fn test_login_store_failure_shows_generic_message() {
    let (router, _) = common::create_test_app_with_failing_store();

    let response = router
        .oneshot(json_post(
            "/api/auth/login",
            json!({ "email": "jane@example.com", "password": "whatever" }),
        ))
        .await
        .unwrap();

    assert!(find_cookie(&set_cookie_headers(&response), SESSION_COOKIE).is_none());
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(
        body["notification"]["message"],
        "An unexpected error occurred. Please try again."
    );
}

#[tokio::test]
async fn test_login_empty_fields() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(json_post("/api/auth/login", json!({ "email": "", "password": "" })))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["notification"]["message"], "Please fill in all fields");
    assert!(app.auth.calls().is_empty());
}

#[tokio::test]
async fn test_duplicate_submission_rejected() {
    let app = common::create_test_app();
    let _held = app
        .state
        .in_flight
        .try_begin(FormKind::Login, "jane@example.com")
        .unwrap();

    let response = app
        .router
        .oneshot(json_post(
            "/api/auth/login",
            json!({ "email": "Jane@Example.com", "password": "whatever" }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["button"], "loading");
    assert_eq!(
        body["notification"]["message"],
        "A request is already in progress. Please wait."
    );
    assert!(app.auth.calls().is_empty());
}

#[tokio::test]
async fn test_reset_success_schedules_redirect() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(json_post(
            "/api/auth/reset-password",
            json!({ "email": "jane@example.com" }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["button"], "success");
    assert_eq!(
        body["notification"]["message"],
        "Password reset link sent to jane@example.com. Please check your inbox and spam folder."
    );
    assert_eq!(body["notification"]["display_ms"], 10000);
    assert_eq!(body["followup"]["after_ms"], 3000);
    assert_eq!(
        body["followup"]["notification"]["message"],
        "Redirecting to login page..."
    );
    assert_eq!(body["redirect"]["to"], "/login.html");
    assert_eq!(body["redirect"]["after_ms"], 5000);
    assert_eq!(body["clear_fields"], json!(["email"]));

    assert_eq!(
        app.auth.calls(),
        vec![Call::Reset {
            email: "jane@example.com".to_string(),
            continue_url: "http://localhost:8080/login.html".to_string(),
        }]
    );
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_reset_failure_keeps_email() {
    let app = common::create_test_app_with(
        Config::test_default(),
        FakeIdentityProvider::failing(AuthErrorCode::UserNotFound),
    );

    let response = app
        .router
        .oneshot(json_post(
            "/api/auth/reset-password",
            json!({ "email": "ghost@example.com" }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["button"], "idle");
    assert_eq!(
        body["notification"]["message"],
        "No account found with this email address."
    );
    assert!(body.get("clear_fields").is_none());
}

#[tokio::test]
async fn test_reset_requires_email() {
    let app = common::create_test_app();

    let response = app
        .router
        .oneshot(json_post("/api/auth/reset-password", json!({ "email": "  " })))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["notification"]["message"], "Please enter your email address");
    assert!(app.auth.calls().is_empty());
}
