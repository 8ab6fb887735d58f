//! Payload integrity validation
//!
//! Terraform sends a `content-md5` header (base64-encoded MD5 digest) and a
//! `content-length` header with every state upload. Both are checked here,
//! as pure functions with no shared state, before the payload is allowed
//! anywhere near the storage backend. A short or over-long read is reported
//! distinctly from a digest mismatch.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use md5::{Digest, Md5};

use crate::error::BridgeError;

/// Computes the base64-encoded MD5 digest of `body`.
pub fn encode_md5(body: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(body);
    BASE64.encode(hasher.finalize())
}

/// Checks that the number of bytes actually received matches the declared
/// `content-length`.
pub fn verify_length(declared: u64, received: usize) -> Result<(), BridgeError> {
    if declared != received as u64 {
        return Err(BridgeError::LengthMismatch {
            declared,
            received: received as u64,
        });
    }
    Ok(())
}

/// Checks the received bytes against the caller-supplied base64 MD5 digest.
pub fn verify_md5(body: &[u8], declared_b64: &str) -> Result<(), BridgeError> {
    let computed = encode_md5(body);
    if computed != declared_b64 {
        return Err(BridgeError::ChecksumMismatch {
            declared: declared_b64.to_string(),
            computed,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_md5_known_vector() {
        // MD5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(encode_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
        // MD5("abc") = 900150983cd24fb0d6963f7d28e17f72
        assert_eq!(encode_md5(b"abc"), "kAFQmDzST7DWlj99KOF/cg==");
    }

    #[test]
    fn test_verify_md5_match() {
        let body = b"{\"version\": 4}";
        let sum = encode_md5(body);
        assert!(verify_md5(body, &sum).is_ok());
    }

    #[test]
    fn test_verify_md5_mismatch() {
        let body = b"{\"version\": 4}";
        let err = verify_md5(body, "kAFQmDzST7DWlj99KOF/cg==").unwrap_err();
        match err {
            BridgeError::ChecksumMismatch { declared, computed } => {
                assert_eq!(declared, "kAFQmDzST7DWlj99KOF/cg==");
                assert_eq!(computed, encode_md5(body));
            }
            other => panic!("expected checksum mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_length() {
        assert!(verify_length(3, 3).is_ok());

        let err = verify_length(10, 7).unwrap_err();
        match err {
            BridgeError::LengthMismatch { declared, received } => {
                assert_eq!(declared, 10);
                assert_eq!(received, 7);
            }
            other => panic!("expected length mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_short_read_is_not_a_checksum_error() {
        // A truncated body must be reported as a length problem even though
        // its digest would also differ.
        let body = &b"full body"[..4];
        let err = verify_length(9, body.len()).unwrap_err();
        assert!(matches!(err, BridgeError::LengthMismatch { .. }));
    }
}
