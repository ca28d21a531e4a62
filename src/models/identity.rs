//! Signed-in identity as reported by the identity backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Provider;

/// The identity-provider view of a user.
///
/// Carried inside the session cookie, so it is the fallback source for
/// every dashboard field when the profile document is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Backend-issued unique user id (profile document key)
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub provider: Provider,
    /// Account creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Most recent sign-in time
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Part of the email address before `@`.
    pub fn email_local_part(&self) -> Option<&str> {
        self.email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
    }

    /// Display name, falling back to the email local part.
    pub fn fallback_name(&self) -> String {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.email_local_part())
            .unwrap_or_default()
            .to_string()
    }
}
