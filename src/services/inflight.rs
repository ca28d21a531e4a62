// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registry of form submissions that are still waiting on the backend.
//!
//! A second submission of the same form for the same email is turned away
//! until the first one finishes.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Which form a submission came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Login,
    Signup,
    ResetPassword,
}

type Key = (FormKind, String);

#[derive(Clone, Default)]
pub struct InFlight {
    active: Arc<DashMap<Key, ()>>,
}

/// Held for the duration of a submission; releases the slot on drop.
pub struct InFlightGuard {
    active: Arc<DashMap<Key, ()>>,
    key: Key,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `(kind, email)`; `None` while another holds it.
    pub fn try_begin(&self, kind: FormKind, email: &str) -> Option<InFlightGuard> {
        let key = (kind, email.trim().to_lowercase());

        match self.active.entry(key.clone()) {
            Entry::Occupied(_) => {
                tracing::debug!(?kind, "Duplicate submission rejected");
                None
            }
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(InFlightGuard {
                    active: Arc::clone(&self.active),
                    key,
                })
            }
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_rejected_until_release() {
        let in_flight = InFlight::new();

        let first = in_flight.try_begin(FormKind::Login, "Jane@Example.com");
        assert!(first.is_some());
        assert!(in_flight.try_begin(FormKind::Login, "jane@example.com ").is_none());

        drop(first);
        assert!(in_flight.is_empty());
        assert!(in_flight.try_begin(FormKind::Login, "jane@example.com").is_some());
    }

    #[test]
    fn test_forms_do_not_share_slots() {
        let in_flight = InFlight::new();

        let _login = in_flight.try_begin(FormKind::Login, "jane@example.com").unwrap();
        let _reset = in_flight
            .try_begin(FormKind::ResetPassword, "jane@example.com")
            .unwrap();

        assert_eq!(in_flight.len(), 2);
    }
}
