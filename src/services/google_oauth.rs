// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth 2.0 authorization-code flow for federated sign-in.
//!
//! The `state` parameter carries the sign-in intent and a nonce, signed
//! with HMAC-SHA256. The same nonce is stored in a cookie scoped to the
//! callback path, so a callback can only complete the flow its own
//! browser started.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Deserialize;
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::services::auth_errors::{AuthError, AuthErrorCode, FederatedIntent};

type HmacSha256 = Hmac<Sha256>;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// `profile` and `email` on top of the OpenID scope that yields the ID token.
pub const SCOPES: &str = "openid profile email";
/// Always show the account chooser.
pub const PROMPT: &str = "select_account";
/// How long a signed `state` stays valid.
pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);

pub const CALLBACK_PATH: &str = "/auth/google/callback";

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleOAuth {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    token_url: String,
    state_key: Vec<u8>,
}

/// Verified contents of a callback `state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub intent: FederatedIntent,
    pub nonce: String,
}

impl GoogleOAuth {
    pub fn new(config: &Config) -> Self {
        Self::with_token_url(config, TOKEN_URL.to_string())
    }

    /// Client exchanging codes at `token_url` instead of Google's endpoint.
    pub fn with_token_url(config: &Config, token_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: format!("{}{}", config.public_url, CALLBACK_PATH),
            token_url,
            state_key: config.oauth_state_key.clone(),
        }
    }

    /// Random URL-safe nonce for the state parameter and its cookie.
    pub fn new_nonce() -> anyhow::Result<String> {
        let mut bytes = [0u8; 24];
        SystemRandom::new()
            .fill(&mut bytes)
            .map_err(|_| anyhow::anyhow!("system RNG unavailable"))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Sign `intent|nonce|timestamp_hex` and encode it for the URL.
    pub fn sign_state(&self, intent: FederatedIntent, nonce: &str) -> anyhow::Result<String> {
        let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let payload = format!("{}|{}|{:x}", intent.as_str(), nonce, timestamp);

        let mut mac = HmacSha256::new_from_slice(&self.state_key)
            .map_err(|e| anyhow::anyhow!("HMAC init failed: {}", e))?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature)))
    }

    /// Verify a callback `state`; `None` when tampered, malformed or expired.
    pub fn verify_state(&self, state: &str) -> Option<OAuthState> {
        verify_state_at(state, &self.state_key, SystemTime::now())
    }

    /// Where to send the browser to start the flow.
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&prompt={}&state={}",
            AUTHORIZE_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPES),
            PROMPT,
            state
        )
    }

    /// Exchange an authorization code for a Google ID token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::new(AuthErrorCode::NetworkRequestFailed, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "Google token exchange failed");
            return Err(AuthError::new(
                AuthErrorCode::InvalidCredential,
                format!("token endpoint returned {}", status),
            ));
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            AuthError::new(AuthErrorCode::InternalError, format!("bad token response: {}", e))
        })?;

        tokens.id_token.ok_or_else(|| {
            AuthError::new(AuthErrorCode::InternalError, "token response had no id_token")
        })
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    id_token: Option<String>,
}

/// Map the `error` parameter Google appends to the callback.
pub fn callback_error_code(error: &str) -> AuthErrorCode {
    match error {
        // The user dismissed the consent screen or account chooser.
        "access_denied" | "popup_closed_by_user" => AuthErrorCode::PopupClosedByUser,
        "popup_blocked" | "popup_blocked_by_browser" => AuthErrorCode::PopupBlocked,
        "unauthorized_client" | "invalid_client" => AuthErrorCode::OperationNotAllowed,
        other => AuthErrorCode::from_code(&other.replace('_', "-")),
    }
}

fn verify_state_at(state: &str, secret: &[u8], now: SystemTime) -> Option<OAuthState> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "intent|nonce|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(4, '|').collect();
    let [intent, nonce, timestamp_hex, signature_hex] = parts.as_slice() else {
        return None;
    };

    let payload = format!("{}|{}|{}", intent, nonce, timestamp_hex);
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if !bool::from(expected.as_bytes().ct_eq(signature_hex.as_bytes())) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let issued = UNIX_EPOCH + Duration::from_secs(u64::from_str_radix(timestamp_hex, 16).ok()?);
    let age = now.duration_since(issued).unwrap_or_default();
    if age > STATE_TTL {
        tracing::warn!(age_secs = age.as_secs(), "OAuth state expired");
        return None;
    }

    Some(OAuthState {
        intent: FederatedIntent::parse(intent)?,
        nonce: (*nonce).to_string(),
    })
}
