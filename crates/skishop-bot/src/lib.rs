//! Telegram adapter for the skishop catalog admin bot.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};

use skishop_core::catalog::CatalogStore;
use skishop_core::config::{BotSettings, Config, MediaHostSettings};

use crate::bot::{BotContext, dispatch_message, new_chat_queues};
use crate::media::MediaHost;
use crate::telegram::TelegramClient;

pub mod bot;
pub mod handlers;
pub mod media;
pub mod telegram;
pub mod upload;

pub async fn run() -> Result<()> {
    let config = Config::load().context("Failed to load skishop config")?;
    let settings = BotSettings::from_config(&config)?;
    let media_settings = MediaHostSettings::from_config(&config)?;
    run_bot(settings, media_settings).await
}

async fn run_bot(settings: BotSettings, media_settings: MediaHostSettings) -> Result<()> {
    let operator_id = settings.operator_id;
    let client = TelegramClient::new(settings.bot_token);
    let catalog = CatalogStore::open_default();
    let media_host = MediaHost::new(media_settings);
    let context = Arc::new(BotContext::new(
        client.clone(),
        operator_id,
        catalog,
        media_host,
    ));
    let chat_queues = new_chat_queues();

    let mut offset: Option<i64> = None;
    let poll_timeout = Duration::from_secs(30);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("skishop-bot started. Operator: {operator_id}. Polling for updates...");

    loop {
        let current_offset = offset;
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down Telegram bot.");
                break;
            }
            updates = client.get_updates(current_offset, poll_timeout) => {
                let updates = match updates {
                    Ok(updates) => updates,
                    Err(err) => {
                        error!("Telegram polling error: {err}");
                        let _ = client
                            .send_message(operator_id, &format!("⛔️ Polling error: {err}"), None)
                            .await;
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                };

                for update in updates {
                    offset = Some(update.update_id + 1);
                    if let Some(message) = update.message {
                        dispatch_message(&chat_queues, &context, message).await;
                    }
                }
            }
        }
    }

    Ok(())
}
