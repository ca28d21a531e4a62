// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity backend error codes and the user-facing message table.
//!
//! All forms share one table. Federated sign-in checks the popup codes
//! first because their wording depends on whether the user was signing
//! in or signing up.

use std::borrow::Cow;
use std::fmt;

/// Message shown for any code the table does not know.
pub const GENERIC_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Backend auth error code, in the `auth/<kebab-case>` vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    UserNotFound,
    WrongPassword,
    InvalidEmail,
    UserDisabled,
    TooManyRequests,
    NetworkRequestFailed,
    InvalidCredential,
    EmailAlreadyInUse,
    WeakPassword,
    OperationNotAllowed,
    RequiresRecentLogin,
    InternalError,
    InvalidContinueUri,
    UnauthorizedContinueUri,
    AccountExistsWithDifferentCredential,
    PopupClosedByUser,
    PopupBlocked,
    /// Any other code, stored with its `auth/` prefix.
    Other(String),
}

impl AuthErrorCode {
    /// The `auth/...` code string.
    pub fn as_code(&self) -> Cow<'static, str> {
        let code = match self {
            AuthErrorCode::UserNotFound => "auth/user-not-found",
            AuthErrorCode::WrongPassword => "auth/wrong-password",
            AuthErrorCode::InvalidEmail => "auth/invalid-email",
            AuthErrorCode::UserDisabled => "auth/user-disabled",
            AuthErrorCode::TooManyRequests => "auth/too-many-requests",
            AuthErrorCode::NetworkRequestFailed => "auth/network-request-failed",
            AuthErrorCode::InvalidCredential => "auth/invalid-credential",
            AuthErrorCode::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthErrorCode::WeakPassword => "auth/weak-password",
            AuthErrorCode::OperationNotAllowed => "auth/operation-not-allowed",
            AuthErrorCode::RequiresRecentLogin => "auth/requires-recent-login",
            AuthErrorCode::InternalError => "auth/internal-error",
            AuthErrorCode::InvalidContinueUri => "auth/invalid-continue-uri",
            AuthErrorCode::UnauthorizedContinueUri => "auth/unauthorized-continue-uri",
            AuthErrorCode::AccountExistsWithDifferentCredential => {
                "auth/account-exists-with-different-credential"
            }
            AuthErrorCode::PopupClosedByUser => "auth/popup-closed-by-user",
            AuthErrorCode::PopupBlocked => "auth/popup-blocked",
            AuthErrorCode::Other(code) => return Cow::Owned(code.clone()),
        };
        Cow::Borrowed(code)
    }

    /// Parse an `auth/...` code string. A missing prefix is added.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        match code {
            "auth/user-not-found" => AuthErrorCode::UserNotFound,
            "auth/wrong-password" => AuthErrorCode::WrongPassword,
            "auth/invalid-email" => AuthErrorCode::InvalidEmail,
            "auth/user-disabled" => AuthErrorCode::UserDisabled,
            "auth/too-many-requests" => AuthErrorCode::TooManyRequests,
            "auth/network-request-failed" => AuthErrorCode::NetworkRequestFailed,
            "auth/invalid-credential" => AuthErrorCode::InvalidCredential,
            "auth/email-already-in-use" => AuthErrorCode::EmailAlreadyInUse,
            "auth/weak-password" => AuthErrorCode::WeakPassword,
            "auth/operation-not-allowed" => AuthErrorCode::OperationNotAllowed,
            "auth/requires-recent-login" => AuthErrorCode::RequiresRecentLogin,
            "auth/internal-error" => AuthErrorCode::InternalError,
            "auth/invalid-continue-uri" => AuthErrorCode::InvalidContinueUri,
            "auth/unauthorized-continue-uri" => AuthErrorCode::UnauthorizedContinueUri,
            "auth/account-exists-with-different-credential" => {
                AuthErrorCode::AccountExistsWithDifferentCredential
            }
            "auth/popup-closed-by-user" => AuthErrorCode::PopupClosedByUser,
            "auth/popup-blocked" => AuthErrorCode::PopupBlocked,
            other if other.starts_with("auth/") => AuthErrorCode::Other(other.to_string()),
            other => AuthErrorCode::Other(format!("auth/{other}")),
        }
    }

    /// Translate an Identity Toolkit REST error message
    /// (`EMAIL_EXISTS`, `WEAK_PASSWORD : Password should be...`).
    pub fn from_identity_toolkit(message: &str) -> Self {
        let key = message.split(" : ").next().unwrap_or_default().trim();
        match key {
            "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
            "EMAIL_NOT_FOUND" => AuthErrorCode::UserNotFound,
            "INVALID_PASSWORD" => AuthErrorCode::WrongPassword,
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_IDP_RESPONSE" => {
                AuthErrorCode::InvalidCredential
            }
            "INVALID_EMAIL" | "MISSING_EMAIL" => AuthErrorCode::InvalidEmail,
            "USER_DISABLED" => AuthErrorCode::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthErrorCode::TooManyRequests,
            "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
            "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" | "ADMIN_ONLY_OPERATION" => {
                AuthErrorCode::OperationNotAllowed
            }
            "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" | "TOKEN_EXPIRED" => {
                AuthErrorCode::RequiresRecentLogin
            }
            "INVALID_CONTINUE_URI" | "MISSING_CONTINUE_URI" => AuthErrorCode::InvalidContinueUri,
            "UNAUTHORIZED_DOMAIN" => AuthErrorCode::UnauthorizedContinueUri,
            "FEDERATED_USER_ID_ALREADY_LINKED" => {
                AuthErrorCode::AccountExistsWithDifferentCredential
            }
            "INTERNAL_ERROR" | "" => AuthErrorCode::InternalError,
            other => {
                AuthErrorCode::Other(format!("auth/{}", other.to_lowercase().replace('_', "-")))
            }
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_code())
    }
}

/// Failure reported by the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {detail}")]
pub struct AuthError {
    pub code: AuthErrorCode,
    /// Backend-provided detail, for logs only.
    pub detail: String,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }
}

impl From<AuthErrorCode> for AuthError {
    fn from(code: AuthErrorCode) -> Self {
        let detail = code.to_string();
        Self { code, detail }
    }
}

/// User-facing message for a backend error code.
pub fn user_message(code: &AuthErrorCode) -> &'static str {
    match code {
        AuthErrorCode::UserNotFound => "No account found with this email address.",
        AuthErrorCode::WrongPassword => "Incorrect password. Please try again.",
        AuthErrorCode::InvalidEmail => "Please enter a valid email address.",
        AuthErrorCode::UserDisabled => "This account has been disabled.",
        AuthErrorCode::TooManyRequests => "Too many failed attempts. Please try again later.",
        AuthErrorCode::NetworkRequestFailed => "Network error. Please check your connection.",
        AuthErrorCode::InvalidCredential => "Invalid email or password. Please try again.",
        AuthErrorCode::EmailAlreadyInUse => "An account already exists with this email address.",
        AuthErrorCode::WeakPassword => "Password should be at least 6 characters long.",
        AuthErrorCode::OperationNotAllowed => "Account creation is currently disabled.",
        AuthErrorCode::RequiresRecentLogin => "Please sign in again to complete this action.",
        AuthErrorCode::InternalError => "An internal error occurred. Please try again.",
        AuthErrorCode::InvalidContinueUri => "Invalid redirect URL configuration.",
        AuthErrorCode::UnauthorizedContinueUri => "Unauthorized redirect URL.",
        AuthErrorCode::AccountExistsWithDifferentCredential => {
            "An account already exists with this email. Please sign in instead."
        }
        AuthErrorCode::PopupClosedByUser | AuthErrorCode::PopupBlocked | AuthErrorCode::Other(_) => {
            GENERIC_MESSAGE
        }
    }
}

/// Whether a Google sign-in was started from the login or the signup page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederatedIntent {
    SignIn,
    SignUp,
}

impl FederatedIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            FederatedIntent::SignIn => "signin",
            FederatedIntent::SignUp => "signup",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "signin" => Some(FederatedIntent::SignIn),
            "signup" => Some(FederatedIntent::SignUp),
            _ => None,
        }
    }

    /// Page the user returns to when the flow fails.
    pub fn origin_page(self) -> &'static str {
        match self {
            FederatedIntent::SignIn => "/login.html",
            FederatedIntent::SignUp => "/signup.html",
        }
    }
}

/// User-facing message for a federated sign-in failure.
pub fn federated_message(code: &AuthErrorCode, intent: FederatedIntent) -> &'static str {
    match (code, intent) {
        (AuthErrorCode::PopupClosedByUser, FederatedIntent::SignIn) => {
            "Sign-in was cancelled. Please try again."
        }
        (AuthErrorCode::PopupClosedByUser, FederatedIntent::SignUp) => {
            "Sign-up was cancelled. Please try again."
        }
        (AuthErrorCode::PopupBlocked, _) => "Pop-up blocked. Please enable pop-ups and try again.",
        (code, _) => user_message(code),
    }
}
