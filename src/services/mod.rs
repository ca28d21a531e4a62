// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - authentication flows and dashboard logic.

pub mod auth_errors;
pub mod auth_flow;
pub mod dashboard;
pub mod google_oauth;
pub mod identity;
pub mod identity_toolkit;
pub mod inflight;

pub use auth_errors::{AuthError, AuthErrorCode, FederatedIntent};
pub use dashboard::{DashboardView, ProfileSource};
pub use google_oauth::GoogleOAuth;
pub use identity::IdentityProvider;
pub use identity_toolkit::IdentityToolkitClient;
pub use inflight::{FormKind, InFlight};
