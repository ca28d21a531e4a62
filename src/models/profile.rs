// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile document stored in the `users` collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Identity;
use crate::time_utils::format_utc_rfc3339;

/// How the user authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Email,
    Google,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Provider {
    /// Map a Firebase provider id (`password`, `google.com`, ...) to a provider.
    pub fn from_provider_id(provider_id: &str) -> Self {
        match provider_id {
            "password" => Provider::Email,
            "google.com" => Provider::Google,
            _ => Provider::Unknown,
        }
    }
}

/// User profile stored in Firestore, keyed by uid.
///
/// Every field is optional: documents created on first email sign-in only
/// carry `name`, `email`, `createdAt` and `lastLogin`. A value of this type
/// doubles as a write payload, where `None` fields are left untouched by a
/// merge write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Profile picture URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    /// First successful authentication (RFC 3339). Written once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Most recent successful sign-in (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_complete: Option<bool>,
}

impl UserProfile {
    /// Profile created on the first email/password sign-in of an identity
    /// that has no document yet.
    pub fn first_sign_in(identity: &Identity, now: DateTime<Utc>) -> Self {
        let now = format_utc_rfc3339(now);
        Self {
            name: Some(identity.fallback_name()),
            email: identity.email.clone(),
            created_at: Some(now.clone()),
            last_login: Some(now),
            ..Default::default()
        }
    }

    /// Merge payload touching only `lastLogin`.
    pub fn last_login_at(now: DateTime<Utc>) -> Self {
        Self {
            last_login: Some(format_utc_rfc3339(now)),
            ..Default::default()
        }
    }

    /// Full profile for a new email/password account.
    pub fn email_sign_up(
        name: &str,
        email: &str,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Self {
        let now = format_utc_rfc3339(now);
        Self {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            photo: None,
            provider: Some(Provider::Email),
            created_at: Some(now.clone()),
            last_login: Some(now),
            email_verified: Some(identity.email_verified),
            uid: Some(identity.uid.clone()),
            profile_complete: Some(true),
        }
    }

    /// Profile merged on every Google sign-in.
    ///
    /// `createdAt` is only included when `first_seen` is set, so repeat
    /// sign-ins never move it.
    pub fn google(
        identity: &Identity,
        now: DateTime<Utc>,
        first_seen: bool,
        sign_up: bool,
    ) -> Self {
        let now = format_utc_rfc3339(now);
        Self {
            name: Some(
                identity
                    .display_name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| "Anonymous User".to_string()),
            ),
            email: identity.email.clone(),
            photo: identity.photo_url.clone(),
            provider: Some(Provider::Google),
            created_at: first_seen.then(|| now.clone()),
            last_login: Some(now),
            email_verified: Some(identity.email_verified),
            uid: Some(identity.uid.clone()),
            profile_complete: sign_up.then_some(true),
        }
    }

    /// Document field paths carried by this value (the merge mask).
    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.email.is_some() {
            fields.push("email");
        }
        if self.photo.is_some() {
            fields.push("photo");
        }
        if self.provider.is_some() {
            fields.push("provider");
        }
        if self.created_at.is_some() {
            fields.push("createdAt");
        }
        if self.last_login.is_some() {
            fields.push("lastLogin");
        }
        if self.email_verified.is_some() {
            fields.push("emailVerified");
        }
        if self.uid.is_some() {
            fields.push("uid");
        }
        if self.profile_complete.is_some() {
            fields.push("profileComplete");
        }
        fields
    }

    /// Apply the fields set on `patch`, leaving the rest as they are.
    pub fn merge(&mut self, patch: &UserProfile) {
        fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if let Some(v) = value {
                *slot = Some(v.clone());
            }
        }

        take(&mut self.name, &patch.name);
        take(&mut self.email, &patch.email);
        take(&mut self.photo, &patch.photo);
        take(&mut self.provider, &patch.provider);
        take(&mut self.created_at, &patch.created_at);
        take(&mut self.last_login, &patch.last_login);
        take(&mut self.email_verified, &patch.email_verified);
        take(&mut self.uid, &patch.uid);
        take(&mut self.profile_complete, &patch.profile_complete);
    }
}
