//! Storage backend trait
//!
//! Defines the narrow contract the lock coordinator depends on. The core
//! never touches a concrete backend type.

use async_trait::async_trait;

use tfbridge_common::BridgeError;

use crate::model::StateObject;

/// Durable storage of one logical state object per path.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetch the current object for `path`.
    ///
    /// An absent object is `Err(BridgeError::NotFound)`; every other failure
    /// is `Err(BridgeError::Storage)`. Callers rely on that distinction to
    /// tell "never written" apart from "backend unavailable".
    async fn retrieve(&self, path: &str) -> Result<StateObject, BridgeError>;

    /// Replace the object at `path` in a single backend write.
    async fn store(&self, path: &str, object: &StateObject) -> Result<(), BridgeError>;

    /// Best-effort native exclusion primitive (e.g. a legal-hold flag).
    ///
    /// Returns `Ok(true)` when the hold was applied, `Ok(false)` when the
    /// backend has no such primitive. The coordination protocol stays
    /// correct either way; this only hardens it where the backend allows.
    async fn native_lock(&self, _path: &str) -> Result<bool, BridgeError> {
        Ok(false)
    }

    /// Clears the native exclusion flag set by `native_lock`.
    async fn native_unlock(&self, _path: &str) -> Result<bool, BridgeError> {
        Ok(false)
    }
}
