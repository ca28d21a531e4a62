// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page guards for the static HTML pages.

use crate::middleware::auth::current_identity;
use crate::session::{AuthState, PageRole};
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Redirect page requests that do not match the session state.
pub async fn guard_pages(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let Some(role) = PageRole::for_path(request.uri().path()) else {
        return next.run(request).await;
    };

    let auth = AuthState::from_identity(current_identity(&jar, request.headers(), &state.config));

    match role.route(&auth) {
        Some(target) => {
            tracing::debug!(path = %request.uri().path(), target, "Page guard redirect");
            Redirect::to(target).into_response()
        }
        None => next.run(request).await,
    }
}
