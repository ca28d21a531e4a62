// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-sent auth-state events.

use axum::{
    extract::State,
    http::HeaderMap,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use futures_util::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;

use crate::middleware::auth::current_identity;
use crate::session::{auth_state_stream, AuthState};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/events", get(auth_events))
}

/// Current auth state, then every change until sign-out.
async fn auth_events(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let identity = current_identity(&jar, &headers, &state.config);

    let events = auth_state_stream(&state.sessions, identity.as_ref()).map(|auth| {
        Ok(Event::default()
            .event(event_name(&auth))
            .json_data(&auth)
            .unwrap_or_else(|_| Event::default().event(event_name(&auth))))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn event_name(auth: &AuthState) -> &'static str {
    match auth {
        AuthState::SignedIn { .. } => "signed_in",
        AuthState::SignedOut => "signed_out",
    }
}
