//! Media hosting client for uploading and deleting images
//!
//! The host is an opaque HTTP service: uploads return a public URL plus a
//! storage handle, and deletion is by handle. Everything else about the
//! hosted asset is the host's business.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Media host API client
#[derive(Clone)]
pub struct MediaHostClient {
    client: Client,
    api_key: String,
    base_url: String,
    folder: String,
}

/// A successfully uploaded asset.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    /// Publicly reachable URL of the asset
    pub url: String,
    /// Opaque handle used for later deletion
    pub handle: String,
    /// Content type the asset was uploaded with
    pub file_type: String,
    /// Size of the uploaded payload in bytes
    pub file_size: i64,
}

/// Host response for an upload
#[derive(Debug, Deserialize)]
struct HostUploadResponse {
    secure_url: String,
    public_id: String,
}

impl MediaHostClient {
    /// Create a new MediaHostClient
    pub fn new(base_url: String, api_key: String, folder: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            folder,
        }
    }

    /// Upload an image, returning its URL and storage handle.
    ///
    /// The payload must already have passed content-type and size
    /// validation; the host is not trusted to enforce either.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<UploadedAsset> {
        let file_size = bytes.len() as i64;
        let file_type = content_type.to_string();

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| AppError::MediaHostError(format!("invalid content type: {}", e)))?;
        let form = Form::new()
            .text("folder", self.folder.clone())
            .part("file", part);

        let url = format!("{}/upload", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::MediaHostError(format!("upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::MediaHostError(format!(
                "upload rejected: {} - {}",
                status, body
            )));
        }

        let data: HostUploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::MediaHostError(format!("unreadable upload response: {}", e)))?;

        Ok(UploadedAsset {
            url: data.secure_url,
            handle: data.public_id,
            file_type,
            file_size,
        })
    }

    /// Delete an asset by its storage handle.
    pub async fn delete(&self, handle: &str) -> AppResult<()> {
        let url = format!("{}/assets/{}", self.base_url, handle);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::MediaHostError(format!("delete request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::MediaHostError(format!(
                "delete rejected: {} - {}",
                status, body
            )));
        }

        Ok(())
    }
}
