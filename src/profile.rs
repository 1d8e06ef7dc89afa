//! User profile document: creation, reads, and guarded partial updates.
//!
//! Email is set once at account creation and never changes afterwards;
//! every update path funnels through the patch guard that enforces it.

use serde_json::Value;
use thiserror::Error;

use crate::models::{ProfileUpdate, UserProfile};
use crate::session::UserContext;
use crate::store::{paths, DocumentStore, StoreError};

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Email cannot be changed after account creation")]
    EmailImmutable,

    #[error("No profile exists for this user")]
    NotCreated,
}

/// The stored profile, `None` before account creation completes.
pub fn get_profile(
    store: &dyn DocumentStore,
    user: &UserContext,
) -> Result<Option<UserProfile>, StoreError> {
    let (collection, key) = paths::user_profile(&user.uid);
    match store.get_document(&collection, &key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Write the full profile at account creation. Replaces any prior document.
pub fn create_profile(
    store: &dyn DocumentStore,
    user: &UserContext,
    profile: &UserProfile,
) -> Result<(), StoreError> {
    let (collection, key) = paths::user_profile(&user.uid);
    store.set_document(&collection, &key, &serde_json::to_value(profile)?, false)?;
    tracing::info!(uid = %user.uid, "Profile created");
    Ok(())
}

/// Apply a raw field patch to the profile. Rejects any attempt to touch
/// the email field; fails if the profile was never created.
pub fn apply_profile_patch(
    store: &dyn DocumentStore,
    user: &UserContext,
    patch: &Value,
) -> Result<(), ProfileError> {
    if patch.get("email").is_some() {
        return Err(ProfileError::EmailImmutable);
    }
    if patch.as_object().is_some_and(|o| o.is_empty()) {
        return Ok(());
    }

    let (collection, key) = paths::user_profile(&user.uid);
    store
        .update_document(&collection, &key, patch)
        .map_err(|e| match e {
            StoreError::NotFound { .. } => ProfileError::NotCreated,
            other => ProfileError::Store(other),
        })?;
    tracing::debug!(uid = %user.uid, "Profile updated");
    Ok(())
}

/// Apply a typed partial update; unset fields are left untouched.
pub fn update_profile(
    store: &dyn DocumentStore,
    user: &UserContext,
    update: &ProfileUpdate,
) -> Result<(), ProfileError> {
    let patch = serde_json::to_value(update).map_err(StoreError::from)?;
    apply_profile_patch(store, user, &patch)
}
