//! Database layer (Firestore).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryProfileStore;

use crate::error::AppError;
use crate::models::UserProfile;
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
}

/// How a profile write treats fields it does not carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite the whole document.
    Replace,
    /// Update only the fields present on the payload; create if missing.
    Merge,
}

/// Persistence for `users/{uid}` profile documents.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Read a profile; `Ok(None)` when the document does not exist.
    async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError>;

    /// Write a profile document.
    async fn write_profile(
        &self,
        uid: &str,
        profile: &UserProfile,
        mode: WriteMode,
    ) -> Result<(), AppError>;
}
