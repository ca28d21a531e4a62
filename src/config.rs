//! Application configuration loaded from environment variables.
//!
//! Secrets (OAuth client secret, signing keys) are read once at startup
//! and kept in memory for the life of the process.

use std::env;

/// Which profile store backs the `users` collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileBackend {
    /// Cloud Firestore (or its emulator when `FIRESTORE_EMULATOR_HOST` is set).
    Firestore,
    /// Process-local store; profiles vanish on restart.
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Firebase Web API key (public, identifies the project to Identity Toolkit)
    pub firebase_api_key: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Public origin of this service, e.g. `https://accounts.example.com`
    pub public_url: String,
    /// Server port
    pub port: u16,
    /// Directory holding the static HTML pages
    pub static_dir: String,
    /// Google OAuth client ID (public)
    pub google_client_id: String,
    /// Profile store selection
    pub profile_backend: ProfileBackend,
    /// Firebase Auth emulator host (`host:port`), if any
    pub auth_emulator_host: Option<String>,

    // --- Secrets ---
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// HS256 key for session cookies (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// HMAC key for the OAuth `state` parameter
    pub oauth_state_key: Vec<u8>,
}

impl Config {
    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            firebase_api_key: "test-api-key".to_string(),
            gcp_project_id: "test-project".to_string(),
            public_url: "http://localhost:8080".to_string(),
            port: 8080,
            static_dir: "web".to_string(),
            google_client_id: "test-client-id.apps.googleusercontent.com".to_string(),
            profile_backend: ProfileBackend::Memory,
            auth_emulator_host: None,
            google_client_secret: "test_secret".to_string(),
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
            oauth_state_key: b"test_oauth_state_key".to_vec(),
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let session_signing_key = env::var("SESSION_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
            .into_bytes();

        let oauth_state_key = env::var("OAUTH_STATE_KEY")
            .map(String::into_bytes)
            .unwrap_or_else(|_| session_signing_key.clone());

        let profile_backend = match env::var("PROFILE_BACKEND").as_deref() {
            Ok("memory") => ProfileBackend::Memory,
            Ok("firestore") | Err(_) => ProfileBackend::Firestore,
            Ok(other) => return Err(ConfigError::Invalid("PROFILE_BACKEND", other.to_string())),
        };

        Ok(Self {
            firebase_api_key: env::var("FIREBASE_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            public_url: env::var("PUBLIC_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "web".to_string()),
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            profile_backend,
            auth_emulator_host: env::var("FIREBASE_AUTH_EMULATOR_HOST").ok(),
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_SECRET"))?,
            session_signing_key,
            oauth_state_key,
        })
    }

    /// Whether cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("FIREBASE_API_KEY", " test_key ");
        env::set_var("GOOGLE_CLIENT_ID", "test_id");
        env::set_var("GOOGLE_CLIENT_SECRET", "test_secret");
        env::set_var("SESSION_SIGNING_KEY", "test_session_key_32_bytes_min!!!");
        env::set_var("PUBLIC_URL", "https://accounts.example.com/");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.firebase_api_key, "test_key");
        assert_eq!(config.google_client_id, "test_id");
        assert_eq!(config.public_url, "https://accounts.example.com");
        assert_eq!(config.oauth_state_key, config.session_signing_key);
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_default_is_insecure_localhost() {
        let config = Config::test_default();
        assert!(!config.secure_cookies());
        assert_eq!(config.profile_backend, ProfileBackend::Memory);
    }
}
