// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard field derivation from the stored profile and the identity.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::ProfileStore;
use crate::models::{Identity, Provider, UserProfile};
use crate::time_utils::parse_rfc3339;

/// Where the profile shown on the dashboard came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSource {
    Stored,
    /// Synthesized from the identity; never persisted.
    Fallback,
}

/// Avatar element: a picture when there is one, initials otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Avatar {
    Photo(String),
    Initials(String),
}

/// One field per dashboard element, keyed by element id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DashboardView {
    pub user_avatar: Avatar,
    pub user_name: String,
    pub user_info_avatar: Avatar,
    pub user_display_name: String,
    pub user_email: String,
    pub join_date: String,
    pub last_login: String,
    pub account_type: String,
    pub source: ProfileSource,
}

/// Read `users/{uid}`, degrading to the identity on a miss or read error.
pub async fn load_profile(
    store: &dyn ProfileStore,
    identity: &Identity,
) -> (UserProfile, ProfileSource) {
    match store.get_profile(&identity.uid).await {
        Ok(Some(profile)) => (profile, ProfileSource::Stored),
        Ok(None) => {
            tracing::info!(uid = %identity.uid, "No profile document, using identity");
            (fallback_profile(identity), ProfileSource::Fallback)
        }
        Err(e) => {
            tracing::error!(uid = %identity.uid, error = %e, "Error loading user profile");
            (fallback_profile(identity), ProfileSource::Fallback)
        }
    }
}

pub fn fallback_profile(identity: &Identity) -> UserProfile {
    UserProfile {
        name: Some(identity.fallback_name()),
        email: identity.email.clone(),
        photo: identity.photo_url.clone(),
        provider: Some(Provider::Unknown),
        ..Default::default()
    }
}

/// First letter of the first and last words, uppercased.
pub fn initials(name: &str) -> String {
    let mut words = name.split_whitespace();
    let Some(first) = words.next() else {
        return "?".to_string();
    };

    let mut out: String = first.chars().take(1).flat_map(char::to_uppercase).collect();
    if let Some(last) = words.last() {
        out.extend(last.chars().take(1).flat_map(char::to_uppercase));
    }
    out
}

pub fn relative_last_login(now: DateTime<Utc>, then: Option<DateTime<Utc>>) -> String {
    let Some(then) = then else {
        return "Unknown".to_string();
    };

    let hours = (now - then).num_hours();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", hours / 24)
    }
}

pub fn join_date(created: Option<DateTime<Utc>>) -> String {
    created
        .map(|date| date.format("%b %Y").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

pub fn account_type(provider: Option<Provider>) -> &'static str {
    match provider {
        Some(Provider::Google) => "Google",
        _ => "Email",
    }
}

/// Build the dashboard view. Each field falls back on its own.
pub fn present(
    profile: &UserProfile,
    source: ProfileSource,
    identity: &Identity,
    now: DateTime<Utc>,
) -> DashboardView {
    let display_name = profile
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "User".to_string());

    let avatar = match profile.photo.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => Avatar::Photo(url.to_string()),
        None => Avatar::Initials(initials(profile.name.as_deref().unwrap_or_default())),
    };

    let last_login = profile
        .last_login
        .as_deref()
        .and_then(parse_rfc3339)
        .or(identity.last_sign_in_at);

    // A stored createdAt that fails to parse shows as unknown rather than
    // borrowing the identity's date.
    let created = match profile.created_at.as_deref() {
        Some(raw) => parse_rfc3339(raw),
        None => identity.created_at,
    };

    DashboardView {
        user_avatar: avatar.clone(),
        user_name: display_name.clone(),
        user_info_avatar: avatar,
        user_display_name: display_name,
        user_email: profile
            .email
            .clone()
            .or_else(|| identity.email.clone())
            .unwrap_or_default(),
        join_date: join_date(created),
        last_login: relative_last_login(now, last_login),
        account_type: account_type(profile.provider).to_string(),
        source,
    }
}
