// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::middleware::auth::AuthUser;
use crate::services::dashboard::{self, DashboardView};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::Utc;
use std::sync::Arc;

/// API routes (require a session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/dashboard", get(get_dashboard))
}

/// Dashboard fields for the signed-in user.
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<DashboardView> {
    let (profile, source) = dashboard::load_profile(state.profiles.as_ref(), &user.identity).await;
    Json(dashboard::present(&profile, source, &user.identity, Utc::now()))
}
