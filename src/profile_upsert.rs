use std::fmt;

use uuid::Uuid;

use crate::domain::{Profile, ProfileFields, ProfileInput, ProfileInputErrors, ProfileValidator};
use crate::routes::error_chain_fmt;
use crate::store::{ProfileStore, StoreError};

#[derive(thiserror::Error)]
pub enum UpsertError {
    #[error("{0}")]
    ValidationError(ProfileInputErrors),
    #[error("That handle already exists")]
    HandleConflict,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl fmt::Debug for UpsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<StoreError> for UpsertError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::HandleTaken => UpsertError::HandleConflict,
            StoreError::UnexpectedError(e) => UpsertError::UnexpectedError(e),
        }
    }
}

/// Create the caller's profile, or overwrite the supplied fields of the one
/// they already have. Handle uniqueness is decided by the store.
#[tracing::instrument(
    name = "Upsert profile",
    skip(store, validator, input),
    fields(handle = tracing::field::Empty)
)]
pub async fn upsert_profile(
    store: &dyn ProfileStore,
    validator: &dyn ProfileValidator,
    owner_id: Uuid,
    input: ProfileInput,
) -> Result<Profile, UpsertError> {
    let input = validator
        .validate(input)
        .map_err(UpsertError::ValidationError)?;
    let fields = ProfileFields::from(input);
    if let Some(handle) = &fields.handle {
        tracing::Span::current().record("handle", tracing::field::display(handle));
    }

    if store.find_by_owner(owner_id).await?.is_none() {
        if let Some(profile) = store.create(owner_id, &fields).await? {
            return Ok(profile);
        }
        // A concurrent request created this owner's profile first.
        tracing::info!("Profile appeared while creating it, updating instead");
    }

    store
        .update(owner_id, &fields)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Profile for owner {} vanished during update.", owner_id))
        .map_err(UpsertError::UnexpectedError)
}
