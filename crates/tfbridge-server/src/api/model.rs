//! Wire models for the Terraform HTTP backend protocol

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lock metadata sent by Terraform with LOCK/UNLOCK requests.
///
/// Field names are fixed by the protocol. Only `ID` participates in
/// coordination; the rest is diagnostic. Everything defaults so partial
/// bodies from older clients still parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockRequest {
    #[serde(rename = "ID", default)]
    pub id: String,

    #[serde(rename = "Operation", default)]
    pub operation: String,

    #[serde(rename = "Info", default)]
    pub info: String,

    #[serde(rename = "Who", default)]
    pub who: String,

    #[serde(rename = "Version", default)]
    pub version: String,

    #[serde(rename = "Created", default)]
    pub created: Option<DateTime<Utc>>,

    #[serde(rename = "Path", default)]
    pub path: String,
}

impl LockRequest {
    /// Builds the conflict response body naming the current lock holder,
    /// in the shape Terraform parses back into its LockInfo.
    pub fn holder(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            created: Some(Utc::now()),
            ..Self::default()
        }
    }
}

/// JSON error body for non-conflict failures.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(err: impl std::fmt::Display) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_request_parses_terraform_body() {
        let body = r#"{
            "ID": "8d09f2e8-5f9a-7c21-9b6e-2f87a1c3d401",
            "Operation": "OperationTypeApply",
            "Info": "",
            "Who": "dev@workstation",
            "Version": "1.9.5",
            "Created": "2026-03-01T12:30:45.123456789Z",
            "Path": ""
        }"#;
        let lock: LockRequest = serde_json::from_str(body).unwrap();
        assert_eq!(lock.id, "8d09f2e8-5f9a-7c21-9b6e-2f87a1c3d401");
        assert_eq!(lock.operation, "OperationTypeApply");
        assert!(lock.created.is_some());
    }

    #[test]
    fn test_lock_request_tolerates_partial_body() {
        let lock: LockRequest = serde_json::from_str(r#"{"ID": "x"}"#).unwrap();
        assert_eq!(lock.id, "x");
        assert!(lock.created.is_none());
        assert!(lock.who.is_empty());
    }

    #[test]
    fn test_holder_body_names_current_owner() {
        let body = LockRequest::holder("A", "prod/network");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["ID"], "A");
        assert_eq!(json["Path"], "prod/network");
    }
}
