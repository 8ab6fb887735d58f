//! Backblaze B2 storage backend
//!
//! Implements `StateStore` over the B2 native HTTP API:
//! - `b2_authorize_account` at construction (token is valid for 24h)
//! - `b2_download_file_by_name` for retrieval
//! - `b2_get_upload_url` + upload for storing
//! - `b2_update_file_legal_hold` as the optional native exclusion primitive
//!
//! The state object is stored as one JSON file per path; B2 replaces the
//! whole file on every upload, which is the single-object atomicity the
//! coordinator relies on.

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use tracing::{debug, info};

use tfbridge_common::BridgeError;

use crate::model::StateObject;
use crate::traits::StateStore;

const AUTH_URL: &str = "https://api.backblazeb2.com/b2api/v2/b2_authorize_account";
const API_VERSION: &str = "v2";

/// Connection settings for the B2 backend.
#[derive(Debug, Clone)]
pub struct B2Config {
    /// Application key id
    pub key_id: String,
    /// Application key secret
    pub app_key: String,
    /// Bucket name, needed for download-by-name; when empty the name
    /// reported by the authorization grant is used
    pub bucket_name: String,
    /// Prefix prepended to every state path to form the object name
    pub object_prefix: String,
}

/// `StateStore` backed by a Backblaze B2 bucket.
pub struct B2StateStore {
    client: reqwest::Client,
    auth_token: String,
    api_url: String,
    download_url: String,
    bucket_id: String,
    bucket_name: String,
    object_prefix: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorizeAccountResponse {
    authorization_token: String,
    api_url: String,
    download_url: String,
    allowed: AllowedGrant,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllowedGrant {
    #[serde(default)]
    bucket_id: String,
    #[serde(default)]
    bucket_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetUploadUrlResponse {
    upload_url: String,
    authorization_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListFileNamesRequest<'a> {
    bucket_id: &'a str,
    start_file_name: &'a str,
    prefix: &'a str,
    max_file_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFileNamesResponse {
    files: Vec<FileVersion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileVersion {
    file_id: String,
    file_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateLegalHoldRequest<'a> {
    file_name: &'a str,
    file_id: &'a str,
    legal_hold: &'a str,
}

impl B2StateStore {
    /// Authorizes against B2 and resolves the API/download URLs and bucket
    /// identity for all subsequent calls.
    pub async fn connect(config: B2Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::new();
        let basic = BASE64.encode(format!("{}:{}", config.key_id, config.app_key));

        let response = client
            .get(AUTH_URL)
            .header("Authorization", format!("Basic {basic}"))
            .send()
            .await
            .context("b2_authorize_account request failed")?;
        let auth: AuthorizeAccountResponse = Self::read_json(response, "b2_authorize_account")
            .await
            .with_context(|| format!("authorization failed for key id {}", config.key_id))?;

        let bucket_name = if config.bucket_name.is_empty() {
            auth.allowed.bucket_name.clone()
        } else {
            config.bucket_name
        };
        if bucket_name.is_empty() {
            return Err(anyhow!(
                "bucket name is not configured and the application key is not bucket-scoped"
            ));
        }

        info!(bucket = %bucket_name, "B2 store connection established");

        Ok(Self {
            client,
            auth_token: auth.authorization_token,
            api_url: auth.api_url,
            download_url: auth.download_url,
            bucket_id: auth.allowed.bucket_id,
            bucket_name,
            object_prefix: config.object_prefix,
        })
    }

    fn object_name(&self, path: &str) -> String {
        format!("{}{}", self.object_prefix, path)
    }

    fn api_endpoint(&self, endpoint: &str) -> String {
        format!("{}/b2api/{}/b2_{}", self.api_url, API_VERSION, endpoint)
    }

    /// Decodes a JSON API response, turning non-200 statuses into an error
    /// carrying the B2 status code and message body.
    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        endpoint: &str,
    ) -> anyhow::Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("B2 {endpoint} failed with status {status}: {body}"));
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode B2 {endpoint} response"))
    }

    async fn get_upload_url(&self) -> anyhow::Result<GetUploadUrlResponse> {
        let response = self
            .client
            .post(self.api_endpoint("get_upload_url"))
            .header("Authorization", &self.auth_token)
            .json(&serde_json::json!({ "bucketId": self.bucket_id }))
            .send()
            .await
            .context("b2_get_upload_url request failed")?;
        Self::read_json(response, "b2_get_upload_url").await
    }

    /// Resolves the current file id for `path`, or `None` when the file does
    /// not exist.
    async fn find_file_id(&self, path: &str) -> anyhow::Result<Option<String>> {
        let name = self.object_name(path);
        let request = ListFileNamesRequest {
            bucket_id: &self.bucket_id,
            start_file_name: &name,
            prefix: &name,
            max_file_count: 1,
        };
        let response = self
            .client
            .post(self.api_endpoint("list_file_names"))
            .header("Authorization", &self.auth_token)
            .json(&request)
            .send()
            .await
            .context("b2_list_file_names request failed")?;
        let listing: ListFileNamesResponse = Self::read_json(response, "b2_list_file_names").await?;
        Ok(listing
            .files
            .into_iter()
            .find(|f| f.file_name == name)
            .map(|f| f.file_id))
    }

    /// Toggles the legal hold flag on the state file.
    ///
    /// Returns `Ok(false)` when the file does not exist or the bucket has no
    /// file lock enabled; the coordinator then runs on the documented weaker
    /// guarantee.
    async fn set_legal_hold(&self, path: &str, hold: bool) -> anyhow::Result<bool> {
        let Some(file_id) = self.find_file_id(path).await? else {
            return Ok(false);
        };
        let name = self.object_name(path);
        let request = UpdateLegalHoldRequest {
            file_name: &name,
            file_id: &file_id,
            legal_hold: if hold { "on" } else { "off" },
        };
        let response = self
            .client
            .post(self.api_endpoint("update_file_legal_hold"))
            .header("Authorization", &self.auth_token)
            .json(&request)
            .send()
            .await
            .context("b2_update_file_legal_hold request failed")?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::FORBIDDEN {
            // Bucket without file lock, or key without writeFileLegalHolds
            let body = response.text().await.unwrap_or_default();
            debug!(path, status = %status, body, "legal hold unsupported, continuing without it");
            return Ok(false);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "B2 b2_update_file_legal_hold failed with status {status}: {body}"
            ));
        }
        Ok(true)
    }
}

#[async_trait]
impl StateStore for B2StateStore {
    async fn retrieve(&self, path: &str) -> Result<StateObject, BridgeError> {
        let url = format!(
            "{}/file/{}/{}",
            self.download_url,
            self.bucket_name,
            self.object_name(path)
        );
        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_token)
            .send()
            .await
            .map_err(BridgeError::storage)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BridgeError::NotFound);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::Storage(format!(
                "B2 download failed with status {status}: {body}"
            )));
        }

        let bytes = response.bytes().await.map_err(BridgeError::storage)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| BridgeError::Storage(format!("state object decode failed: {e}")))
    }

    async fn store(&self, path: &str, object: &StateObject) -> Result<(), BridgeError> {
        let body = serde_json::to_vec(object).map_err(BridgeError::storage)?;
        let upload = self.get_upload_url().await.map_err(BridgeError::storage)?;

        let mut hasher = Sha1::new();
        hasher.update(&body);
        let sha1_hex = const_hex::encode(hasher.finalize());

        let response = self
            .client
            .post(&upload.upload_url)
            .header("Authorization", &upload.authorization_token)
            .header("X-Bz-File-Name", self.object_name(path))
            .header("X-Bz-Content-Sha1", sha1_hex)
            .header("Content-Type", "application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(BridgeError::storage)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(BridgeError::Storage(format!(
                "B2 upload failed with status {status}: {text}"
            )));
        }

        debug!(path, "state object uploaded");
        Ok(())
    }

    async fn native_lock(&self, path: &str) -> Result<bool, BridgeError> {
        self.set_legal_hold(path, true)
            .await
            .map_err(BridgeError::storage)
    }

    async fn native_unlock(&self, path: &str) -> Result<bool, BridgeError> {
        self.set_legal_hold(path, false)
            .await
            .map_err(BridgeError::storage)
    }
}
