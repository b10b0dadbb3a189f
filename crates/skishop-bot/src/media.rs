//! Image-host upload client.
//!
//! Uploads photo bytes as a multipart form to the configured host and
//! returns the durable public URL for the stored image.

use anyhow::{Result, anyhow, bail};
use skishop_core::config::MediaHostSettings;

#[derive(Clone)]
pub struct MediaHost {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    folder: String,
}

impl MediaHost {
    pub fn new(settings: MediaHostSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.base_url,
            api_key: settings.api_key,
            folder: settings.folder,
        }
    }

    /// Uploads one image, yielding its durable URL.
    pub async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("folder", self.folder.clone())
            .part("file", part);

        let url = format!("{}/upload", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|_| anyhow!("Media host upload request failed"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Media host upload failed: {} {}", status, body);
        }

        #[derive(serde::Deserialize)]
        struct UploadResponse {
            url: String,
        }

        let payload: UploadResponse = response
            .json()
            .await
            .map_err(|_| anyhow!("Failed to decode media host response"))?;
        Ok(payload.url)
    }
}
