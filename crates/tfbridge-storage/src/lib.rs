//! Tfbridge Storage - State object model and storage backends
//!
//! This crate provides:
//! - `StateObject`: the single durable unit holding payload and lock owner
//! - `StateStore`: the narrow trait every storage backend implements
//! - `MemoryStateStore`: DashMap-backed backend for tests and local use
//! - `B2StateStore`: Backblaze B2 backend over the B2 native HTTP API

pub mod b2;
pub mod memory;
pub mod model;
pub mod traits;

// Re-exports for convenience
pub use b2::{B2Config, B2StateStore};
pub use memory::MemoryStateStore;
pub use model::StateObject;
pub use traits::StateStore;
