// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Account Portal: email/password and Google sign-in with a profile dashboard
//!
//! This crate serves the login, sign-up, password reset and dashboard pages,
//! and the JSON/SSE endpoints behind them. Credentials are verified by the
//! Firebase identity backend; profiles live in the Firestore `users`
//! collection.

pub mod config;
pub mod db;
pub mod error;
pub mod feedback;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod time_utils;
pub mod validation;

use config::Config;
use db::ProfileStore;
use services::{GoogleOAuth, IdentityProvider, InFlight};
use session::SessionHub;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub auth: Arc<dyn IdentityProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub google: GoogleOAuth,
    pub sessions: SessionHub,
    pub in_flight: InFlight,
}

impl AppState {
    pub fn new(
        config: Config,
        auth: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        let google = GoogleOAuth::new(&config);
        Self {
            config,
            auth,
            profiles,
            google,
            sessions: SessionHub::new(),
            in_flight: InFlight::new(),
        }
    }
}
