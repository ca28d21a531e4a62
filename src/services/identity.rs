//! The identity backend seam.

use async_trait::async_trait;

use crate::models::Identity;
use crate::services::auth_errors::AuthError;

/// Operations delegated to the identity backend. Each form submission makes
/// exactly one of these calls.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an email/password account and sign it in.
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Sign in with email and password.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Identity, AuthError>;

    /// Sign in (creating the account on first use) with a Google ID token.
    async fn sign_in_with_google(&self, id_token: &str) -> Result<Identity, AuthError>;

    /// Send the password reset email; the link continues to `continue_url`.
    async fn send_password_reset(&self, email: &str, continue_url: &str)
        -> Result<(), AuthError>;

    /// End the session of `identity`.
    async fn sign_out(&self, identity: &Identity) -> Result<(), AuthError>;
}
