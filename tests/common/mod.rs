// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use account_portal::config::Config;
use account_portal::db::{FirestoreDb, MemoryProfileStore, ProfileStore, WriteMode};
use account_portal::error::AppError;
use account_portal::middleware::auth::{create_session_jwt, SESSION_COOKIE};
use account_portal::models::{Identity, Provider, UserProfile};
use account_portal::routes::create_router;
use account_portal::services::{AuthError, AuthErrorCode, GoogleOAuth, IdentityProvider};
use account_portal::AppState;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// A backend call as seen by the fake identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateAccount(String),
    SignIn(String),
    Google(String),
    Reset { email: String, continue_url: String },
    SignOut(String),
}

/// Identity provider that records calls and fails on request.
#[derive(Default)]
pub struct FakeIdentityProvider {
    calls: Mutex<Vec<Call>>,
    error: Mutex<Option<AuthErrorCode>>,
}

#[allow(dead_code)]
impl FakeIdentityProvider {
    pub fn failing(code: AuthErrorCode) -> Self {
        Self {
            calls: Mutex::default(),
            error: Mutex::new(Some(code)),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), AuthError> {
        self.calls.lock().unwrap().push(call);
        match self.error.lock().unwrap().clone() {
            Some(code) => Err(AuthError::new(code, "injected")),
            None => Ok(()),
        }
    }
}

/// Identity the fake backend reports for `email`.
#[allow(dead_code)]
pub fn identity_for(email: &str, provider: Provider) -> Identity {
    Identity {
        uid: format!("uid-{}", email.split('@').next().unwrap_or("anon")),
        email: Some(email.to_string()),
        display_name: None,
        photo_url: None,
        email_verified: false,
        provider,
        created_at: None,
        last_sign_in_at: None,
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn create_account(&self, email: &str, _password: &str) -> Result<Identity, AuthError> {
        self.record(Call::CreateAccount(email.to_string()))?;
        Ok(identity_for(email, Provider::Email))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<Identity, AuthError> {
        self.record(Call::SignIn(email.to_string()))?;
        Ok(identity_for(email, Provider::Email))
    }

    async fn sign_in_with_google(&self, id_token: &str) -> Result<Identity, AuthError> {
        self.record(Call::Google(id_token.to_string()))?;
        let mut identity = identity_for("gina@example.com", Provider::Google);
        identity.display_name = Some("Gina Google".to_string());
        identity.photo_url = Some("https://example.com/gina.png".to_string());
        identity.email_verified = true;
        Ok(identity)
    }

    async fn send_password_reset(&self, email: &str, continue_url: &str) -> Result<(), AuthError> {
        self.record(Call::Reset {
            email: email.to_string(),
            continue_url: continue_url.to_string(),
        })
    }

    async fn sign_out(&self, identity: &Identity) -> Result<(), AuthError> {
        self.record(Call::SignOut(identity.uid.clone()))
    }
}

/// Store whose every operation fails.
pub struct FailingStore;

#[async_trait]
impl ProfileStore for FailingStore {
    async fn get_profile(&self, _uid: &str) -> Result<Option<UserProfile>, AppError> {
        Err(AppError::Database("store unavailable".to_string()))
    }

    async fn write_profile(
        &self,
        _uid: &str,
        _profile: &UserProfile,
        _mode: WriteMode,
    ) -> Result<(), AppError> {
        Err(AppError::Database("store unavailable".to_string()))
    }
}

/// Everything a test needs to drive the router and inspect its effects.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub auth: Arc<FakeIdentityProvider>,
    pub store: Arc<MemoryProfileStore>,
}

#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with(Config::test_default(), FakeIdentityProvider::default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config, auth: FakeIdentityProvider) -> TestApp {
    build_test_app(config, auth, None)
}

/// App whose Google code exchange goes to `token_url`.
#[allow(dead_code)]
pub fn create_test_app_with_token_url(token_url: String) -> TestApp {
    build_test_app(
        Config::test_default(),
        FakeIdentityProvider::default(),
        Some(token_url),
    )
}

#[allow(dead_code)]
fn build_test_app(
    config: Config,
    auth: FakeIdentityProvider,
    token_url: Option<String>,
) -> TestApp {
    let auth = Arc::new(auth);
    let store = Arc::new(MemoryProfileStore::new());
    let mut state = AppState::new(config, auth.clone(), store.clone());
    if let Some(token_url) = token_url {
        state.google = GoogleOAuth::with_token_url(&state.config, token_url);
    }
    let state = Arc::new(state);

    TestApp {
        router: create_router(state.clone()),
        state,
        auth,
        store,
    }
}

/// App whose profile store fails every call.
#[allow(dead_code)]
pub fn create_test_app_with_failing_store() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        Config::test_default(),
        Arc::new(FakeIdentityProvider::default()),
        Arc::new(FailingStore),
    ));
    (create_router(state.clone()), state)
}

/// `Cookie` header value carrying a valid session for `identity`.
#[allow(dead_code)]
pub fn session_cookie_header(identity: &Identity, config: &Config) -> String {
    let token = create_session_jwt(identity, &config.session_signing_key).unwrap();
    format!("{}={}", SESSION_COOKIE, token)
}

#[allow(dead_code)]
pub fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

#[allow(dead_code)]
pub fn find_cookie(headers: &[String], name: &str) -> Option<String> {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
}
