// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session observation: auth-state changes and page routing by role.
//!
//! Each signed-in user has a `watch` channel on the [`SessionHub`]. A page
//! subscribes on load, receives the current state immediately and every
//! later change, and unsubscribes by dropping the stream.

use dashmap::DashMap;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

use crate::models::Identity;

/// Fixed page paths.
pub mod pages {
    pub const DASHBOARD: &str = "/index.html";
    pub const LOGIN: &str = "/login.html";
    pub const SIGNUP: &str = "/signup.html";
    pub const RESET_PASSWORD: &str = "/reset-password.html";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    SignedIn { user: Identity },
    SignedOut,
}

impl AuthState {
    pub fn from_identity(identity: Option<Identity>) -> Self {
        match identity {
            Some(user) => AuthState::SignedIn { user },
            None => AuthState::SignedOut,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn { .. })
    }
}

/// How a page reacts to the auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRole {
    /// Requires a signed-in user (the dashboard).
    Protected,
    /// Entry pages; a signed-in user is sent on to the dashboard.
    Public,
}

impl PageRole {
    /// Role of a request path; `None` for paths the guard ignores.
    pub fn for_path(path: &str) -> Option<Self> {
        match path {
            "/" | pages::DASHBOARD => Some(PageRole::Protected),
            pages::LOGIN | pages::SIGNUP | pages::RESET_PASSWORD => Some(PageRole::Public),
            _ => None,
        }
    }

    /// Where to send the browser, or `None` to show the page.
    pub fn route(self, state: &AuthState) -> Option<&'static str> {
        match (self, state.is_signed_in()) {
            (PageRole::Protected, false) => Some(pages::LOGIN),
            (PageRole::Public, true) => Some(pages::DASHBOARD),
            _ => None,
        }
    }
}

/// Per-user auth-state channels.
///
/// A user's channel lives while at least one page watches it. Sign-out and
/// the last dropped subscription both remove it.
#[derive(Clone, Default)]
pub struct SessionHub {
    channels: Arc<DashMap<String, watch::Sender<AuthState>>>,
}

/// One page's view of a user's channel.
struct Subscription {
    // Declared before `_release` so the receiver is gone when it runs.
    rx: watch::Receiver<AuthState>,
    _release: Release,
}

/// Drops the user's channel once no receiver is left.
struct Release {
    channels: Arc<DashMap<String, watch::Sender<AuthState>>>,
    uid: String,
}

impl Drop for Release {
    fn drop(&mut self) {
        self.channels
            .remove_if(self.uid.as_str(), |_, sender| sender.receiver_count() == 0);
    }
}

impl SessionHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribe(&self, identity: &Identity) -> Subscription {
        let rx = self
            .channels
            .entry(identity.uid.clone())
            .or_insert_with(|| {
                watch::channel(AuthState::SignedIn {
                    user: identity.clone(),
                })
                .0
            })
            .subscribe();

        Subscription {
            rx,
            _release: Release {
                channels: Arc::clone(&self.channels),
                uid: identity.uid.clone(),
            },
        }
    }

    /// Record a sign-in for any pages already watching this user.
    pub fn publish_signed_in(&self, identity: &Identity) {
        if let Some(sender) = self.channels.get(&identity.uid) {
            sender.send_replace(AuthState::SignedIn {
                user: identity.clone(),
            });
        }
    }

    /// Record a sign-out; watchers see `signed_out` and their streams end.
    ///
    /// The channel is removed right away. Receivers still observe the final
    /// value after the sender is gone, and a later subscription for a
    /// session that is still valid starts from a fresh channel.
    pub fn publish_signed_out(&self, uid: &str) {
        let notified = match self.channels.remove(uid) {
            Some((_, sender)) => {
                sender.send_replace(AuthState::SignedOut);
                sender.receiver_count()
            }
            None => 0,
        };
        tracing::debug!(uid, notified, "Published sign-out");
    }

    /// Number of users with a live channel.
    pub fn watched_users(&self) -> usize {
        self.channels.len()
    }
}

/// Auth-state events for one page: the current state first, then changes.
///
/// `current` is the caller's verified session. Ends after `signed_out`; a
/// signed-out page gets exactly one event.
pub fn auth_state_stream(
    hub: &SessionHub,
    current: Option<&Identity>,
) -> BoxStream<'static, AuthState> {
    let Some(identity) = current else {
        return stream::once(async { AuthState::SignedOut }).boxed();
    };

    let subscription = hub.subscribe(identity);
    let first = AuthState::SignedIn {
        user: identity.clone(),
    };

    let changes = stream::unfold(Some(subscription), |subscription| async move {
        let mut subscription = subscription?;
        subscription.rx.changed().await.ok()?;
        let state = subscription.rx.borrow_and_update().clone();
        let next = state.is_signed_in().then_some(subscription);
        Some((state, next))
    });

    stream::once(async move { first }).chain(changes).boxed()
}
