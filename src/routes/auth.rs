// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication routes: email/password forms, Google OAuth and logout.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::feedback::FormFeedback;
use crate::middleware::auth::{
    clear_auth_cookies, create_session_jwt, current_identity, oauth_nonce_cookie, session_cookie,
    OAUTH_NONCE_COOKIE,
};
use crate::models::Identity;
use crate::services::auth_errors::{federated_message, AuthErrorCode, FederatedIntent};
use crate::services::auth_flow::{self, FlowOutcome, LoginForm, ResetForm, SignupForm};
use crate::services::google_oauth::{callback_error_code, GoogleOAuth, OAuthState, CALLBACK_PATH};
use crate::session::pages;
use crate::AppState;

const LOGOUT_FAILED: &str = "Error signing out. Please try again.";
const LOGOUT_LABEL: &str = "Sign Out";
const CLEAR_SITE_DATA: HeaderName = HeaderName::from_static("clear-site-data");
const GOOGLE_SIGNUP_NOTICE: &str = "Account created with Google! Redirecting...";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/logout", post(logout))
        .route("/auth/google", get(google_start))
        .route(CALLBACK_PATH, get(google_callback))
}

// ─── Email/Password Forms ────────────────────────────────────

async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<SignupForm>,
) -> Result<(CookieJar, Json<FormFeedback>)> {
    let outcome = auth_flow::signup(&state, &form, Utc::now()).await;
    finish_form(&state, jar, outcome)
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(form): Json<LoginForm>,
) -> Result<(CookieJar, Json<FormFeedback>)> {
    let outcome = auth_flow::login(&state, &form, Utc::now()).await;
    finish_form(&state, jar, outcome)
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ResetForm>,
) -> Json<FormFeedback> {
    Json(auth_flow::reset_password(&state, &form).await.feedback)
}

/// Issue the session cookie when the flow signed the user in.
fn finish_form(
    state: &AppState,
    jar: CookieJar,
    outcome: FlowOutcome,
) -> Result<(CookieJar, Json<FormFeedback>)> {
    let jar = match &outcome.identity {
        Some(identity) => start_session(state, jar, identity)?,
        None => jar,
    };
    Ok((jar, Json(outcome.feedback)))
}

fn start_session(state: &AppState, jar: CookieJar, identity: &Identity) -> Result<CookieJar> {
    let jwt = create_session_jwt(identity, &state.config.session_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    state.sessions.publish_signed_in(identity);
    Ok(jar.add(session_cookie(jwt, &state.config)))
}

// ─── Google OAuth ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GoogleStartParams {
    #[serde(default)]
    intent: Option<String>,
}

/// Start OAuth flow - redirect to the Google account chooser.
async fn google_start(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<GoogleStartParams>,
) -> Result<(CookieJar, Redirect)> {
    let intent = params
        .intent
        .as_deref()
        .and_then(FederatedIntent::parse)
        .unwrap_or(FederatedIntent::SignIn);

    let nonce = GoogleOAuth::new_nonce()?;
    let oauth_state = state.google.sign_state(intent, &nonce)?;

    tracing::info!(intent = intent.as_str(), "Starting Google sign-in, redirecting to Google");

    Ok((
        jar.add(oauth_nonce_cookie(nonce, &state.config)),
        Redirect::temporary(&state.google.authorization_url(&oauth_state)),
    ))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code, sign in, create session.
async fn google_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let nonce_cookie = jar.get(OAUTH_NONCE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(oauth_nonce_cookie(String::new(), &state.config));

    let Some(verified) = params
        .state
        .as_deref()
        .and_then(|s| state.google.verify_state(s))
    else {
        tracing::warn!("Invalid or tampered OAuth state parameter");
        return Ok((jar, failure_redirect(FederatedIntent::SignIn, &invalid_state())));
    };
    let intent = verified.intent;

    if !nonce_matches(&verified, nonce_cookie.as_deref()) {
        tracing::warn!("OAuth nonce cookie missing or mismatched");
        return Ok((jar, failure_redirect(intent, &invalid_state())));
    }

    if let Some(error) = params.error {
        let code = callback_error_code(&error);
        tracing::warn!(error = %error, code = %code, "OAuth error from Google");
        return Ok((jar, failure_redirect(intent, &code)));
    }

    let Some(code) = params.code else {
        return Ok((jar, failure_redirect(intent, &invalid_state())));
    };

    let id_token = match state.google.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(code = %e.code, error = %e, "Google code exchange failed");
            return Ok((jar, failure_redirect(intent, &e.code)));
        }
    };

    let identity = match auth_flow::google_sign_in(&state, &id_token, intent, Utc::now()).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(flow = "google", code = %e.code(), error = %e, "Google sign-in failed");
            let message = e.federated_message(intent);
            return Ok((jar, message_redirect(intent, &e.code(), message)));
        }
    };

    let jar = start_session(&state, jar, &identity)?;

    let target = match intent {
        FederatedIntent::SignUp => format!(
            "{}?notice={}",
            pages::DASHBOARD,
            urlencoding::encode(GOOGLE_SIGNUP_NOTICE)
        ),
        FederatedIntent::SignIn => pages::DASHBOARD.to_string(),
    };
    Ok((jar, Redirect::temporary(&target)))
}

fn invalid_state() -> AuthErrorCode {
    AuthErrorCode::from_code("auth/invalid-oauth-state")
}

fn nonce_matches(verified: &OAuthState, cookie: Option<&str>) -> bool {
    cookie.is_some_and(|cookie| bool::from(cookie.as_bytes().ct_eq(verified.nonce.as_bytes())))
}

fn failure_redirect(intent: FederatedIntent, code: &AuthErrorCode) -> Redirect {
    message_redirect(intent, code, federated_message(code, intent))
}

/// Back to the page the flow started from, with the error to display.
fn message_redirect(intent: FederatedIntent, code: &AuthErrorCode, message: &str) -> Redirect {
    Redirect::temporary(&format!(
        "{}?error={}&message={}",
        intent.origin_page(),
        urlencoding::encode(&code.as_code()),
        urlencoding::encode(message)
    ))
}

// ─── Logout ──────────────────────────────────────────────────

/// Sign out, then drop the session cookies and any cached page storage.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    if let Some(identity) = current_identity(&jar, &headers, &state.config) {
        if let Err(e) = state.auth.sign_out(&identity).await {
            tracing::error!(uid = %identity.uid, error = %e, "Error signing out");
            return Json(FormFeedback::alert(LOGOUT_FAILED, LOGOUT_LABEL)).into_response();
        }
        state.sessions.publish_signed_out(&identity.uid);
    }

    let jar = clear_auth_cookies(jar, &state.config);
    (
        jar,
        [(CLEAR_SITE_DATA, HeaderValue::from_static("\"storage\""))],
        Json(FormFeedback::redirecting(pages::LOGIN, std::time::Duration::ZERO)),
    )
        .into_response()
}
