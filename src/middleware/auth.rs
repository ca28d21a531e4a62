// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session cookie: JWT issue/verify and the authentication middleware.

use crate::config::Config;
use crate::error::AppError;
use crate::models::Identity;
use crate::services::google_oauth::CALLBACK_PATH;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SESSION_COOKIE: &str = "portal_session";
pub const OAUTH_NONCE_COOKIE: &str = "portal_oauth_nonce";

const SESSION_TTL_DAYS: i64 = 30;
const NONCE_TTL_MINUTES: i64 = 10;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user uid)
    pub sub: String,
    /// Random session id
    pub sid: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    pub identity: Identity,
}

/// Authenticated user extracted from the session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: Identity,
}

/// Middleware that requires a valid session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(&jar, request.headers()).ok_or(AppError::Unauthorized)?;
    let identity = decode_session(&token, &state.config.session_signing_key)
        .ok_or(AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthUser { identity });

    Ok(next.run(request).await)
}

/// Session token from the cookie, else from a bearer header.
pub fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Identity of the current request, if it carries a valid session.
pub fn current_identity(jar: &CookieJar, headers: &HeaderMap, config: &Config) -> Option<Identity> {
    let token = session_token(jar, headers)?;
    decode_session(&token, &config.session_signing_key)
}

/// Verify a session token and return the identity it carries.
pub fn decode_session(token: &str, signing_key: &[u8]) -> Option<Identity> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    match decode::<Claims>(token, &key, &validation) {
        Ok(data) if data.claims.sub == data.claims.identity.uid => Some(data.claims.identity),
        Ok(_) => {
            tracing::warn!("Session subject does not match identity");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session token");
            None
        }
    }
}

/// Create a JWT for a user session.
pub fn create_session_jwt(identity: &Identity, signing_key: &[u8]) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let mut sid = [0u8; 16];
    SystemRandom::new()
        .fill(&mut sid)
        .map_err(|_| anyhow::anyhow!("system RNG unavailable"))?;

    let claims = Claims {
        sub: identity.uid.clone(),
        sid: URL_SAFE_NO_PAD.encode(sid),
        iat: now,
        exp: now + SESSION_TTL_DAYS as usize * 24 * 60 * 60,
        identity: identity.clone(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

// ─── Cookies ─────────────────────────────────────────────────

/// Session cookie holding a signed JWT.
pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies())
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_TTL_DAYS))
        .build()
}

/// Nonce cookie, only sent back to the OAuth callback.
pub fn oauth_nonce_cookie(nonce: String, config: &Config) -> Cookie<'static> {
    Cookie::build((OAUTH_NONCE_COOKIE, nonce))
        .path(CALLBACK_PATH)
        .http_only(true)
        .secure(config.secure_cookies())
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(NONCE_TTL_MINUTES))
        .build()
}

/// Remove the session and nonce cookies with their creation attributes.
pub fn clear_auth_cookies(jar: CookieJar, config: &Config) -> CookieJar {
    jar.remove(session_cookie(String::new(), config))
        .remove(oauth_nonce_cookie(String::new(), config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;

    fn identity() -> Identity {
        Identity {
            uid: "uid-1".to_string(),
            email: Some("jane@example.com".to_string()),
            display_name: Some("Jane Doe".to_string()),
            photo_url: None,
            email_verified: true,
            provider: Provider::Email,
            created_at: None,
            last_sign_in_at: None,
        }
    }

    #[test]
    fn test_session_round_trip() {
        let key = b"test_session_key_32_bytes_min!!!";
        let token = create_session_jwt(&identity(), key).unwrap();
        assert_eq!(decode_session(&token, key), Some(identity()));
    }

    #[test]
    fn test_session_wrong_key() {
        let token = create_session_jwt(&identity(), b"key_one").unwrap();
        assert_eq!(decode_session(&token, b"key_two"), None);
    }

    #[test]
    fn test_session_ids_differ() {
        let key = b"k";
        let a = create_session_jwt(&identity(), key).unwrap();
        let b = create_session_jwt(&identity(), key).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_bearer_header_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(
            session_token(&CookieJar::new(), &headers),
            Some("abc".to_string())
        );

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(session_token(&CookieJar::new(), &headers), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let mut config = Config::test_default();
        let cookie = session_cookie("t".to_string(), &config).to_string();
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Secure"));

        config.public_url = "https://accounts.example.com".to_string();
        let cookie = oauth_nonce_cookie("n".to_string(), &config).to_string();
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Path=/auth/google/callback"));
    }
}
