//! In-process profile store for local runs and tests.

use crate::db::{ProfileStore, WriteMode};
use crate::error::AppError;
use crate::models::UserProfile;
use async_trait::async_trait;
use dashmap::DashMap;

/// Profile store backed by a concurrent map. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryProfileStore {
    docs: DashMap<String, UserProfile>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the stored document, if any.
    pub fn snapshot(&self, uid: &str) -> Option<UserProfile> {
        self.docs.get(uid).map(|doc| doc.clone())
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self.snapshot(uid))
    }

    async fn write_profile(
        &self,
        uid: &str,
        profile: &UserProfile,
        mode: WriteMode,
    ) -> Result<(), AppError> {
        match mode {
            WriteMode::Replace => {
                self.docs.insert(uid.to_string(), profile.clone());
            }
            WriteMode::Merge => {
                self.docs
                    .entry(uid.to_string())
                    .or_default()
                    .merge(profile);
            }
        }
        Ok(())
    }
}
