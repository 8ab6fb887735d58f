//! Error types for tfbridge
//!
//! This module defines `BridgeError`, the error taxonomy shared by the
//! protocol handlers, the lock coordinator, and the storage backends:
//! - client errors (malformed request, failed integrity check)
//! - lock conflicts (wrong or missing holder)
//! - not-found (absent state object, an expected condition on first use)
//! - storage errors (backend I/O or decode failure)

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum BridgeError {
    #[error("missing required header '{0}'")]
    MissingHeader(&'static str),

    #[error("invalid value for header '{0}'")]
    InvalidHeader(&'static str),

    #[error("content length mismatch: {declared} bytes declared, {received} received")]
    LengthMismatch { declared: u64, received: u64 },

    #[error("checksum mismatch: declared {declared}, computed {computed}")]
    ChecksumMismatch { declared: String, computed: String },

    #[error("state is locked by '{holder}', conflicting lock id '{requested}'")]
    LockConflict { requested: String, holder: String },

    #[error("state object does not exist (yet)")]
    NotFound,

    #[error("storage backend error: {0}")]
    Storage(String),
}

impl BridgeError {
    /// Wraps any displayable backend failure as a storage error.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        BridgeError::Storage(err.to_string())
    }

    /// True for malformed-request errors that must be rejected before any
    /// storage call is made.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BridgeError::MissingHeader(_)
                | BridgeError::InvalidHeader(_)
                | BridgeError::LengthMismatch { .. }
                | BridgeError::ChecksumMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = BridgeError::MissingHeader("content-md5");
        assert_eq!(format!("{}", err), "missing required header 'content-md5'");

        let err = BridgeError::LockConflict {
            requested: "b".to_string(),
            holder: "a".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "state is locked by 'a', conflicting lock id 'b'"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(BridgeError::MissingHeader("content-md5").is_client_error());
        assert!(
            BridgeError::LengthMismatch {
                declared: 10,
                received: 7
            }
            .is_client_error()
        );
        assert!(!BridgeError::NotFound.is_client_error());
        assert!(!BridgeError::storage("boom").is_client_error());
        assert!(
            !BridgeError::LockConflict {
                requested: "b".to_string(),
                holder: "a".to_string()
            }
            .is_client_error()
        );
    }
}
