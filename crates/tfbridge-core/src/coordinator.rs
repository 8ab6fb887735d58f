//! State coordination and lock arbitration
//!
//! The coordinator enforces "at most one lock holder per path, identified by
//! token" with a read-check-write sequence over the single state object,
//! since object stores offer no multi-object transaction. Within one server
//! process the sequence is serialized through a per-path advisory mutex,
//! created on first access and kept for the life of the process. Across
//! processes the retrieve/store pair is only as atomic as the backend makes
//! it; backends with a native exclusion primitive harden this via
//! `native_lock`/`native_unlock`.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use tfbridge_common::BridgeError;
use tfbridge_storage::{StateObject, StateStore};

/// Arbitrates lock ownership and state writes for all paths.
pub struct StateCoordinator {
    store: Arc<dyn StateStore>,
    path_guards: DashMap<String, Arc<Mutex<()>>>,
}

impl StateCoordinator {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self {
            store,
            path_guards: DashMap::new(),
        }
    }

    /// Returns the advisory mutex for `path`, creating it on first access.
    fn guard(&self, path: &str) -> Arc<Mutex<()>> {
        self.path_guards.entry(path.to_string()).or_default().clone()
    }

    /// Fetches the current payload for `path`.
    ///
    /// A never-written path is `Ok(None)` so first-time callers can
    /// initialize state; only real backend failures are errors.
    pub async fn fetch(&self, path: &str) -> Result<Option<Vec<u8>>, BridgeError> {
        match self.store.retrieve(path).await {
            Ok(object) => Ok(Some(object.state)),
            Err(BridgeError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Acquires the lock on `path` for holder `id`.
    ///
    /// Re-acquisition by the current holder succeeds (re-entrant). A
    /// conflict names the current holder. Backend failures during the
    /// sequence surface as storage errors, never as conflicts.
    pub async fn acquire(&self, path: &str, id: &str) -> Result<(), BridgeError> {
        let guard = self.guard(path);
        let _held = guard.lock().await;

        match self.store.retrieve(path).await {
            Err(BridgeError::NotFound) => {
                // First lock on this path creates the object
                self.store
                    .store(path, &StateObject::locked_empty(id))
                    .await?;
            }
            Err(err) => return Err(err),
            Ok(current) if current.is_unlocked() => {
                let locked = StateObject {
                    lock_id: id.to_string(),
                    state: current.state,
                };
                self.store.store(path, &locked).await?;
            }
            Ok(current) if current.lock_id == id => {
                debug!(path, id, "lock already held by caller");
                return Ok(());
            }
            Ok(current) => {
                return Err(BridgeError::LockConflict {
                    requested: id.to_string(),
                    holder: current.lock_id,
                });
            }
        }

        if self.store.native_lock(path).await? {
            debug!(path, "native exclusion hold applied");
        }
        info!(path, id, "state locked");
        Ok(())
    }

    /// Releases the lock on `path`, which must currently be held by `id`.
    pub async fn release(&self, path: &str, id: &str) -> Result<(), BridgeError> {
        let guard = self.guard(path);
        let _held = guard.lock().await;

        let current = self.store.retrieve(path).await?;
        if current.lock_id != id {
            return Err(BridgeError::LockConflict {
                requested: id.to_string(),
                holder: current.lock_id,
            });
        }

        // Clear the native hold before the unlocking write, otherwise a
        // lingering hold could block the write on backends that enforce it
        if self.store.native_unlock(path).await? {
            debug!(path, "native exclusion hold cleared");
        }

        let unlocked = StateObject {
            lock_id: String::new(),
            state: current.state,
        };
        self.store.store(path, &unlocked).await?;
        info!(path, id, "state unlocked");
        Ok(())
    }

    /// Writes a new payload for `path`.
    ///
    /// An empty `id` writes unconditionally (non-locking clients). A
    /// non-empty `id` requires that it matches the current lock holder; an
    /// absent object counts as a conflict since nobody holds its lock.
    pub async fn write(&self, path: &str, id: &str, payload: Vec<u8>) -> Result<(), BridgeError> {
        let guard = self.guard(path);
        let _held = guard.lock().await;

        if !id.is_empty() {
            let current = match self.store.retrieve(path).await {
                Ok(current) => current,
                Err(BridgeError::NotFound) => {
                    warn!(path, id, "conditional write against a path with no lock");
                    return Err(BridgeError::LockConflict {
                        requested: id.to_string(),
                        holder: String::new(),
                    });
                }
                Err(err) => return Err(err),
            };
            if current.lock_id != id {
                return Err(BridgeError::LockConflict {
                    requested: id.to_string(),
                    holder: current.lock_id,
                });
            }
        }

        let object = StateObject {
            lock_id: id.to_string(),
            state: payload,
        };
        self.store.store(path, &object).await?;
        info!(path, bytes = object.state.len(), "state written");
        Ok(())
    }
}
