// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-up, sign-in and password reset flows.
//!
//! Each flow validates locally, makes exactly one identity backend call,
//! records the profile document on success and describes the outcome as
//! page feedback.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use crate::db::WriteMode;
use crate::error::AppError;
use crate::feedback::{
    ButtonState, FormFeedback, Notification, RESET_SUCCESS_DISPLAY, SIGNUP_SUCCESS_DISPLAY,
};
use crate::models::{Identity, UserProfile};
use crate::services::auth_errors::{
    federated_message, user_message, AuthError, AuthErrorCode, FederatedIntent, GENERIC_MESSAGE,
};
use crate::services::inflight::FormKind;
use crate::session::pages;
use crate::validation::{self, Credentials, SignupFields};
use crate::AppState;

const LOGIN_FIELDS: &[&str] = &["email", "password"];
const SIGNUP_FIELDS: &[&str] = &["username", "email", "password"];
const RESET_FIELDS: &[&str] = &["email"];

const SIGNUP_REDIRECT_DELAY: Duration = Duration::from_secs(2);
const RESET_NOTICE_DELAY: Duration = Duration::from_secs(3);
const RESET_REDIRECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetForm {
    pub email: String,
}

/// What a submission produced: feedback for the page and, when the user
/// ended up signed in, their identity (for the session cookie).
#[derive(Debug)]
pub struct FlowOutcome {
    pub feedback: FormFeedback,
    pub identity: Option<Identity>,
}

impl FlowOutcome {
    fn without_session(feedback: FormFeedback) -> Self {
        Self {
            feedback,
            identity: None,
        }
    }

    fn signed_in(identity: Identity, feedback: FormFeedback) -> Self {
        Self {
            feedback,
            identity: Some(identity),
        }
    }
}

/// Backend failure during a flow.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("profile write failed: {0}")]
    Store(#[from] AppError),
}

impl FlowError {
    pub fn code(&self) -> AuthErrorCode {
        match self {
            FlowError::Auth(e) => e.code.clone(),
            FlowError::Store(_) => AuthErrorCode::InternalError,
        }
    }

    /// Message for the form that issued the call.
    pub fn user_message(&self) -> &'static str {
        match self {
            FlowError::Auth(e) => user_message(&e.code),
            // Store errors carry no auth code; the table falls through.
            FlowError::Store(_) => GENERIC_MESSAGE,
        }
    }

    /// Message for a Google sign-in started with `intent`.
    pub fn federated_message(&self, intent: FederatedIntent) -> &'static str {
        match self {
            FlowError::Auth(e) => federated_message(&e.code, intent),
            FlowError::Store(_) => GENERIC_MESSAGE,
        }
    }
}

// ─── Email/Password Sign-In ──────────────────────────────────

pub async fn login(state: &AppState, form: &LoginForm, now: DateTime<Utc>) -> FlowOutcome {
    let creds = match validation::validate_login(&form.email, &form.password) {
        Ok(creds) => creds,
        Err(e) => {
            return FlowOutcome::without_session(
                FormFeedback::failed(e.to_string()).clearing(LOGIN_FIELDS),
            )
        }
    };

    let Some(_guard) = state.in_flight.try_begin(FormKind::Login, &creds.email) else {
        return FlowOutcome::without_session(FormFeedback::busy());
    };

    match sign_in_and_record(state, &creds, now).await {
        Ok(identity) => FlowOutcome::signed_in(
            identity,
            FormFeedback::redirecting(pages::DASHBOARD, Duration::ZERO).clearing(LOGIN_FIELDS),
        ),
        Err(e) => {
            tracing::warn!(flow = "login", code = %e.code(), error = %e, "Sign-in failed");
            FlowOutcome::without_session(
                FormFeedback::failed(e.user_message()).clearing(LOGIN_FIELDS),
            )
        }
    }
}

async fn sign_in_and_record(
    state: &AppState,
    creds: &Credentials,
    now: DateTime<Utc>,
) -> Result<Identity, FlowError> {
    let identity = state
        .auth
        .sign_in_with_password(&creds.email, &creds.password)
        .await?;

    match state.profiles.get_profile(&identity.uid).await? {
        None => {
            tracing::info!(uid = %identity.uid, "No profile yet, creating one");
            state
                .profiles
                .write_profile(
                    &identity.uid,
                    &UserProfile::first_sign_in(&identity, now),
                    WriteMode::Replace,
                )
                .await?;
        }
        Some(_) => {
            state
                .profiles
                .write_profile(
                    &identity.uid,
                    &UserProfile::last_login_at(now),
                    WriteMode::Merge,
                )
                .await?;
        }
    }

    tracing::info!(uid = %identity.uid, "User signed in");
    Ok(identity)
}

// ─── Email/Password Sign-Up ──────────────────────────────────

pub async fn signup(state: &AppState, form: &SignupForm, now: DateTime<Utc>) -> FlowOutcome {
    let fields = match validation::validate_signup(&form.username, &form.email, &form.password) {
        Ok(fields) => fields,
        Err(e) => {
            return FlowOutcome::without_session(
                FormFeedback::failed(e.to_string()).clearing(SIGNUP_FIELDS),
            )
        }
    };

    let Some(_guard) = state.in_flight.try_begin(FormKind::Signup, &fields.email) else {
        return FlowOutcome::without_session(FormFeedback::busy());
    };

    match create_and_record(state, &fields, now).await {
        Ok(identity) => FlowOutcome::signed_in(
            identity,
            FormFeedback::redirecting(pages::DASHBOARD, SIGNUP_REDIRECT_DELAY)
                .with_notification(Notification::success(
                    "Account created successfully! Redirecting...",
                    SIGNUP_SUCCESS_DISPLAY,
                ))
                .clearing(SIGNUP_FIELDS),
        ),
        Err(e) => {
            tracing::warn!(flow = "signup", code = %e.code(), error = %e, "Sign-up failed");
            FlowOutcome::without_session(
                FormFeedback::failed(e.user_message()).clearing(SIGNUP_FIELDS),
            )
        }
    }
}

async fn create_and_record(
    state: &AppState,
    fields: &SignupFields,
    now: DateTime<Utc>,
) -> Result<Identity, FlowError> {
    let identity = state
        .auth
        .create_account(&fields.email, &fields.password)
        .await?;

    let profile = UserProfile::email_sign_up(&fields.username, &fields.email, &identity, now);
    state
        .profiles
        .write_profile(&identity.uid, &profile, WriteMode::Replace)
        .await?;

    tracing::info!(uid = %identity.uid, "Account created and profile saved");
    Ok(identity)
}

// ─── Password Reset ──────────────────────────────────────────

pub async fn reset_password(state: &AppState, form: &ResetForm) -> FlowOutcome {
    let email = match validation::validate_reset(&form.email) {
        Ok(email) => email,
        Err(e) => return FlowOutcome::without_session(FormFeedback::failed(e.to_string())),
    };

    let Some(_guard) = state.in_flight.try_begin(FormKind::ResetPassword, &email) else {
        return FlowOutcome::without_session(FormFeedback::busy());
    };

    let continue_url = format!("{}{}", state.config.public_url, pages::LOGIN);

    match state.auth.send_password_reset(&email, &continue_url).await {
        Ok(()) => FlowOutcome::without_session(
            FormFeedback::redirecting(pages::LOGIN, RESET_REDIRECT_DELAY)
                .with_button(ButtonState::Loading.succeed())
                .with_notification(Notification::success(
                    format!(
                        "Password reset link sent to {}. Please check your inbox and spam folder.",
                        email
                    ),
                    RESET_SUCCESS_DISPLAY,
                ))
                .with_followup(
                    RESET_NOTICE_DELAY,
                    Notification::info(
                        "Redirecting to login page...",
                        RESET_REDIRECT_DELAY - RESET_NOTICE_DELAY,
                    ),
                )
                .clearing(RESET_FIELDS),
        ),
        Err(e) => {
            tracing::warn!(flow = "reset", code = %e.code, error = %e, "Password reset failed");
            FlowOutcome::without_session(FormFeedback::failed(user_message(&e.code)))
        }
    }
}

// ─── Google Sign-In ──────────────────────────────────────────

/// Complete a Google sign-in from an ID token and merge the profile.
///
/// `createdAt` is only written when the identity has no document yet.
pub async fn google_sign_in(
    state: &AppState,
    id_token: &str,
    intent: FederatedIntent,
    now: DateTime<Utc>,
) -> Result<Identity, FlowError> {
    let identity = state.auth.sign_in_with_google(id_token).await?;

    let first_seen = state.profiles.get_profile(&identity.uid).await?.is_none();
    let profile = UserProfile::google(
        &identity,
        now,
        first_seen,
        intent == FederatedIntent::SignUp,
    );

    state
        .profiles
        .write_profile(&identity.uid, &profile, WriteMode::Merge)
        .await?;

    tracing::info!(
        uid = %identity.uid,
        intent = intent.as_str(),
        first_seen,
        "Google user profile saved"
    );
    Ok(identity)
}
