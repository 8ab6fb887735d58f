//! Tfbridge Common - Shared types and utilities
//!
//! This crate provides the foundational pieces used across all tfbridge
//! components:
//! - Error taxonomy for the state protocol
//! - Payload integrity validation (length + base64 MD5)
//! - Protocol constants

pub mod checksum;
pub mod error;

// Re-exports for convenience
pub use checksum::{encode_md5, verify_length, verify_md5};
pub use error::BridgeError;

/// Query parameter carrying the lock token on state writes
pub const LOCK_ID_PARAM: &str = "ID";

/// Header carrying the base64-encoded MD5 digest of the uploaded state
pub const CONTENT_MD5_HEADER: &str = "content-md5";

/// Header carrying the declared byte length of the uploaded state
pub const CONTENT_LENGTH_HEADER: &str = "content-length";
