//! Durable state object model

use serde::{Deserialize, Serialize};

/// The unit of durable storage for one state path.
///
/// `lock_id` and `state` are always read and written together as a single
/// JSON object; atomicity of that write is delegated to the backend's
/// single-object semantics. An empty `lock_id` means unlocked. The payload
/// travels base64-encoded inside the JSON envelope so arbitrary state bytes
/// survive the trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateObject {
    #[serde(rename = "lock_id")]
    pub lock_id: String,

    #[serde(rename = "state", with = "base64_bytes")]
    pub state: Vec<u8>,
}

impl StateObject {
    /// Creates an object holding `lock_id` with no payload yet, used when a
    /// LOCK arrives for a path that was never written.
    pub fn locked_empty(lock_id: impl Into<String>) -> Self {
        Self {
            lock_id: lock_id.into(),
            state: Vec::new(),
        }
    }

    /// True when no client currently holds the lock.
    pub fn is_unlocked(&self) -> bool {
        self.lock_id.is_empty()
    }
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        // Accept null for objects created by writers that omitted the payload
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        match encoded {
            Some(s) => BASE64.decode(s).map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let obj = StateObject {
            lock_id: "9f8e".to_string(),
            state: b"{\"version\":4}".to_vec(),
        };
        let json = serde_json::to_string(&obj).unwrap();
        let back: StateObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, obj);
    }

    #[test]
    fn test_payload_is_base64_in_json() {
        let obj = StateObject {
            lock_id: String::new(),
            state: b"abc".to_vec(),
        };
        let json = serde_json::to_string(&obj).unwrap();
        assert_eq!(json, r#"{"lock_id":"","state":"YWJj"}"#);
    }

    #[test]
    fn test_null_payload_reads_as_empty() {
        let obj: StateObject = serde_json::from_str(r#"{"lock_id":"x","state":null}"#).unwrap();
        assert_eq!(obj.lock_id, "x");
        assert!(obj.state.is_empty());
    }

    #[test]
    fn test_locked_empty() {
        let obj = StateObject::locked_empty("tok");
        assert_eq!(obj.lock_id, "tok");
        assert!(obj.state.is_empty());
        assert!(!obj.is_unlocked());
        assert!(StateObject::default().is_unlocked());
    }
}
