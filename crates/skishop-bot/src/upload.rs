//! Commit-time media upload orchestration.
//!
//! Every staged photo is resolved and uploaded concurrently, one task per
//! photo, single attempt each. A failed item is logged and dropped without
//! affecting its siblings; surviving URLs keep the staged order.

use anyhow::{Result, anyhow};
use futures_util::future::join_all;
use tracing::warn;

use crate::media::MediaHost;
use crate::telegram::TelegramClient;

/// Result of one commit's upload fan-out.
pub struct UploadOutcome {
    /// Durable URLs for the photos that made it, in staged order.
    pub urls: Vec<String>,
    /// How many photos were staged.
    pub attempted: usize,
}

impl UploadOutcome {
    pub fn is_full(&self) -> bool {
        self.urls.len() == self.attempted
    }
}

/// Uploads all staged photos concurrently. `join_all` yields results in
/// input order, so the surviving URLs match the staged order.
pub async fn upload_staged(
    client: &TelegramClient,
    media_host: &MediaHost,
    staged: &[String],
) -> UploadOutcome {
    let tasks = staged
        .iter()
        .map(|file_id| upload_one(client, media_host, file_id));
    let urls = join_all(tasks).await.into_iter().flatten().collect();

    UploadOutcome {
        urls,
        attempted: staged.len(),
    }
}

async fn upload_one(
    client: &TelegramClient,
    media_host: &MediaHost,
    file_id: &str,
) -> Option<String> {
    match resolve_and_upload(client, media_host, file_id).await {
        Ok(url) => Some(url),
        Err(err) => {
            warn!("Photo upload failed for {file_id}: {err}");
            None
        }
    }
}

async fn resolve_and_upload(
    client: &TelegramClient,
    media_host: &MediaHost,
    file_id: &str,
) -> Result<String> {
    let file = client.get_file(file_id).await?;
    let file_path = file
        .file_path
        .ok_or_else(|| anyhow!("Telegram file missing file_path"))?;
    let bytes = client.download_file(&file_path).await?;

    let filename = file_path.rsplit('/').next().unwrap_or("photo.jpg");
    media_host.upload(bytes, filename).await
}
