// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Authentication client over the Identity Toolkit REST API.
//!
//! Handles:
//! - Email/password sign-up and sign-in
//! - Google sign-in from an OAuth ID token (`accounts:signInWithIdp`)
//! - Password reset emails (`accounts:sendOobCode`)
//! - Account lookup for verification status and sign-in metadata

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::{Identity, Provider};
use crate::services::auth_errors::{AuthError, AuthErrorCode};
use crate::services::identity::IdentityProvider;
use crate::time_utils::parse_epoch_millis;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Identity Toolkit REST client.
#[derive(Clone)]
pub struct IdentityToolkitClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    /// `requestUri` sent with IdP sign-ins (our public origin)
    request_uri: String,
}

impl IdentityToolkitClient {
    /// Create a client for the production endpoint.
    pub fn new(api_key: String, request_uri: String) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), api_key, request_uri)
    }

    /// Create a client for the Firebase Auth emulator at `host:port`.
    pub fn for_emulator(host: &str, api_key: String, request_uri: String) -> Self {
        tracing::info!(host, "Using Firebase Auth emulator");
        Self::with_base_url(
            format!("http://{}/identitytoolkit.googleapis.com/v1", host),
            api_key,
            request_uri,
        )
    }

    pub fn with_base_url(base_url: String, api_key: String, request_uri: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            request_uri,
        }
    }

    /// POST `accounts:{method}` and decode the JSON response.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/accounts:{}", self.base_url, method);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::new(AuthErrorCode::NetworkRequestFailed, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error_body(status.as_u16(), &text));
        }

        response.json::<T>().await.map_err(|e| {
            AuthError::new(
                AuthErrorCode::InternalError,
                format!("Unexpected {} response: {}", method, e),
            )
        })
    }

    /// Fetch verification status and metadata for a freshly issued ID token.
    async fn lookup(&self, id_token: &str) -> Result<LookupUser, AuthError> {
        let response: LookupResponse = self
            .call("lookup", &serde_json::json!({ "idToken": id_token }))
            .await?;

        response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::new(AuthErrorCode::UserNotFound, "lookup returned no users"))
    }

    /// Build the identity for a sign-in, enriching it from `accounts:lookup`.
    ///
    /// A failed lookup is logged and the basic fields are kept; the sign-in
    /// itself already succeeded.
    async fn resolve_identity(&self, basic: Identity, id_token: &str) -> Identity {
        match self.lookup(id_token).await {
            Ok(user) => user.into_identity(basic),
            Err(e) => {
                tracing::warn!(uid = %basic.uid, error = %e, "Account lookup failed");
                basic
            }
        }
    }
}

/// Decode `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`.
fn parse_error_body(status: u16, body: &str) -> AuthError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => AuthError::new(
            AuthErrorCode::from_identity_toolkit(&envelope.error.message),
            envelope.error.message,
        ),
        Err(_) => AuthError::new(
            AuthErrorCode::InternalError,
            format!("HTTP {}: {}", status, body),
        ),
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let response: PasswordAuthResponse = self
            .call(
                "signUp",
                &PasswordAuthRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        tracing::info!(uid = %response.local_id, "Account created");

        let basic = response.basic_identity();
        Ok(self.resolve_identity(basic, &response.id_token).await)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let response: PasswordAuthResponse = self
            .call(
                "signInWithPassword",
                &PasswordAuthRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;

        tracing::info!(uid = %response.local_id, "Password sign-in accepted");

        let basic = response.basic_identity();
        Ok(self.resolve_identity(basic, &response.id_token).await)
    }

    async fn sign_in_with_google(&self, id_token: &str) -> Result<Identity, AuthError> {
        let post_body = format!(
            "id_token={}&providerId=google.com",
            urlencoding::encode(id_token)
        );

        let response: IdpResponse = self
            .call(
                "signInWithIdp",
                &IdpRequest {
                    post_body: &post_body,
                    request_uri: &self.request_uri,
                    return_secure_token: true,
                    return_idp_credential: true,
                },
            )
            .await?;

        if response.need_confirmation.unwrap_or(false) {
            return Err(AuthError::new(
                AuthErrorCode::AccountExistsWithDifferentCredential,
                "account exists with a different sign-in method",
            ));
        }
        if let Some(message) = response.error_message.as_deref() {
            return Err(AuthError::new(
                AuthErrorCode::from_identity_toolkit(message),
                message,
            ));
        }

        let id_token = response.id_token.clone().ok_or_else(|| {
            AuthError::new(AuthErrorCode::InternalError, "signInWithIdp returned no idToken")
        })?;

        tracing::info!(
            uid = %response.local_id,
            new_user = response.is_new_user.unwrap_or(false),
            "Google sign-in accepted"
        );

        let basic = Identity {
            uid: response.local_id,
            email: response.email,
            display_name: response.display_name,
            photo_url: response.photo_url,
            email_verified: response.email_verified.unwrap_or(false),
            provider: Provider::Google,
            created_at: None,
            last_sign_in_at: None,
        };
        Ok(self.resolve_identity(basic, &id_token).await)
    }

    async fn send_password_reset(&self, email: &str, continue_url: &str) -> Result<(), AuthError> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &OobCodeRequest {
                    request_type: "PASSWORD_RESET",
                    email,
                    continue_url,
                    can_handle_code_in_app: false,
                },
            )
            .await?;

        tracing::info!("Password reset email requested");
        Ok(())
    }

    async fn sign_out(&self, identity: &Identity) -> Result<(), AuthError> {
        // ID tokens are never kept server-side; ending the session cookie is
        // the whole sign-out.
        tracing::info!(uid = %identity.uid, "Signed out");
        Ok(())
    }
}

// ─── Wire types ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordAuthRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: &'a str,
    request_uri: &'a str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobCodeRequest<'a> {
    request_type: &'a str,
    email: &'a str,
    continue_url: &'a str,
    can_handle_code_in_app: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordAuthResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl PasswordAuthResponse {
    fn basic_identity(&self) -> Identity {
        Identity {
            uid: self.local_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone().filter(|n| !n.is_empty()),
            photo_url: None,
            email_verified: false,
            provider: Provider::Email,
            created_at: None,
            last_sign_in_at: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdpResponse {
    local_id: String,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    is_new_user: Option<bool>,
    #[serde(default)]
    need_confirmation: Option<bool>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    /// Epoch milliseconds, as a string
    #[serde(default)]
    created_at: Option<String>,
    /// Epoch milliseconds, as a string
    #[serde(default)]
    last_login_at: Option<String>,
    #[serde(default)]
    provider_user_info: Vec<ProviderUserInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderUserInfo {
    provider_id: String,
}

impl LookupUser {
    fn into_identity(self, basic: Identity) -> Identity {
        let provider = self
            .provider_user_info
            .first()
            .map(|info| Provider::from_provider_id(&info.provider_id))
            .unwrap_or(basic.provider);

        Identity {
            uid: basic.uid,
            email: self.email.or(basic.email),
            display_name: self.display_name.filter(|n| !n.is_empty()).or(basic.display_name),
            photo_url: self.photo_url.or(basic.photo_url),
            email_verified: self.email_verified.unwrap_or(basic.email_verified),
            provider,
            created_at: self.created_at.as_deref().and_then(parse_epoch_millis),
            last_sign_in_at: self.last_login_at.as_deref().and_then(parse_epoch_millis),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
