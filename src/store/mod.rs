mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Profile, ProfileFields};

pub use postgres::PostgresProfileStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("That handle already exists")]
    HandleTaken,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

/// Persistence for profile documents. Uniqueness of `owner_id` and `handle`
/// is enforced here, atomically, not by callers.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Profile owned by `owner_id`, with the owner's identity joined in.
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Profile with the given handle, with the owner's identity joined in.
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Profile>, StoreError>;

    /// Every profile, oldest first, with owners joined in.
    async fn list(&self) -> Result<Vec<Profile>, StoreError>;

    /// Insert a new profile for `owner_id`.
    /// Returns `Ok(None)` when the owner already has a profile.
    async fn create(
        &self,
        owner_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<Option<Profile>, StoreError>;

    /// Overwrite the supplied fields of the profile owned by `owner_id`,
    /// merging supplied social links into the stored ones.
    /// Returns `Ok(None)` when the owner has no profile.
    async fn update(
        &self,
        owner_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<Option<Profile>, StoreError>;
}
