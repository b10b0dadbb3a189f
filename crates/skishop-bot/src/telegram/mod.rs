//! Hand-rolled Telegram Bot API client: long-poll updates, outbound
//! messages/media, and file downloads.

use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

mod types;

pub use types::{Chat, Message, PhotoSize, TelegramFile, Update, User};

const TELEGRAM_PARSE_MODE: &str = "Markdown";

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url("https://api.telegram.org".to_string(), token)
    }

    /// Client against a custom API base URL (used by tests).
    pub fn with_base_url(base_url: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    pub async fn get_updates(&self, offset: Option<i64>, timeout: Duration) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: Some(vec!["message"]),
        };
        self.post("getUpdates", &request).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&ReplyMarkup>,
    ) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: Some(TELEGRAM_PARSE_MODE),
            reply_markup,
        };
        let _: Message = self.post("sendMessage", &request).await?;
        Ok(())
    }

    /// Sends a single photo; `media` is a Telegram file id or a public URL.
    pub async fn send_photo(&self, chat_id: i64, media: &str, caption: Option<&str>) -> Result<()> {
        let request = SendPhotoRequest {
            chat_id,
            photo: media,
            caption,
            parse_mode: Some(TELEGRAM_PARSE_MODE),
        };
        let _: Message = self.post("sendPhoto", &request).await?;
        Ok(())
    }

    /// Sends an album of photos as one grouped message.
    pub async fn send_media_group(&self, chat_id: i64, media: &[InputMediaPhoto]) -> Result<()> {
        let request = SendMediaGroupRequest { chat_id, media };
        let _: Vec<Message> = self.post("sendMediaGroup", &request).await?;
        Ok(())
    }

    pub async fn get_file(&self, file_id: &str) -> Result<TelegramFile> {
        let request = GetFileRequest { file_id };
        self.post("getFile", &request).await
    }

    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/file/bot{}/{}", self.base_url, self.token, file_path);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|_| anyhow!("Telegram file download failed"))?;

        if !response.status().is_success() {
            bail!(
                "Telegram file download failed with status {}",
                response.status()
            );
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|_| anyhow!("Failed to read Telegram file bytes"))?;
        Ok(bytes.to_vec())
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, method: &str, body: &B) -> Result<T> {
        let url = format!("{}/bot{}/{}", self.base_url, self.token, method);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|_| anyhow!("Telegram request failed"))?;

        let payload: TelegramResponse<T> = response
            .json()
            .await
            .map_err(|_| anyhow!("Failed to decode Telegram response"))?;

        if !payload.ok {
            let description = payload
                .description
                .unwrap_or_else(|| "Telegram API error".to_string());
            bail!("{}", description);
        }

        Ok(payload.result)
    }
}

/// Reply-keyboard markup: either a one-row button keyboard or its removal.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Keyboard(ReplyKeyboardMarkup),
    Remove(ReplyKeyboardRemove),
}

impl ReplyMarkup {
    /// One row of buttons that stays up until replaced.
    pub fn row(labels: &[&str]) -> Self {
        Self::Keyboard(ReplyKeyboardMarkup::new(labels, false))
    }

    /// One row of buttons hidden after the first use.
    pub fn one_time_row(labels: &[&str]) -> Self {
        Self::Keyboard(ReplyKeyboardMarkup::new(labels, true))
    }

    /// Removes whatever reply keyboard is currently shown.
    pub fn remove() -> Self {
        Self::Remove(ReplyKeyboardRemove {
            remove_keyboard: true,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ReplyKeyboardMarkup {
    keyboard: Vec<Vec<KeyboardButton>>,
    resize_keyboard: bool,
    one_time_keyboard: bool,
}

impl ReplyKeyboardMarkup {
    fn new(labels: &[&str], one_time: bool) -> Self {
        let row = labels
            .iter()
            .map(|label| KeyboardButton {
                text: (*label).to_string(),
            })
            .collect();
        Self {
            keyboard: vec![row],
            resize_keyboard: true,
            one_time_keyboard: one_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct KeyboardButton {
    text: String,
}

#[derive(Debug, Serialize)]
pub struct ReplyKeyboardRemove {
    remove_keyboard: bool,
}

/// One item of a sendMediaGroup album.
#[derive(Debug, Serialize)]
pub struct InputMediaPhoto {
    #[serde(rename = "type")]
    kind: &'static str,
    media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

impl InputMediaPhoto {
    pub fn new(media: impl Into<String>) -> Self {
        Self {
            kind: "photo",
            media: media.into(),
            caption: None,
            parse_mode: None,
        }
    }

    pub fn with_caption(media: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            kind: "photo",
            media: media.into(),
            caption: Some(caption.into()),
            parse_mode: Some(TELEGRAM_PARSE_MODE),
        }
    }

    #[cfg(test)]
    pub(crate) fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: T,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_updates: Option<Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a ReplyMarkup>,
}

#[derive(Debug, Serialize)]
struct SendPhotoRequest<'a> {
    chat_id: i64,
    photo: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct SendMediaGroupRequest<'a> {
    chat_id: i64,
    media: &'a [InputMediaPhoto],
}

#[derive(Debug, Serialize)]
struct GetFileRequest<'a> {
    file_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::ReplyMarkup;

    #[test]
    fn keyboard_markup_serializes_one_row() {
        let markup = ReplyMarkup::one_time_row(&["⛷ Skis", "🥾 Boots"]);
        let json = serde_json::to_value(&markup).unwrap();
        assert_eq!(json["keyboard"][0][0]["text"], "⛷ Skis");
        assert_eq!(json["keyboard"][0][1]["text"], "🥾 Boots");
        assert_eq!(json["resize_keyboard"], true);
        assert_eq!(json["one_time_keyboard"], true);
    }

    #[test]
    fn remove_markup_serializes_flag_only() {
        let json = serde_json::to_value(ReplyMarkup::remove()).unwrap();
        assert_eq!(json["remove_keyboard"], true);
        assert!(json.get("keyboard").is_none());
    }

    #[test]
    fn updates_with_photos_deserialize() {
        let raw = r#"{
            "update_id": 10,
            "message": {
                "message_id": 5,
                "chat": { "id": 42, "type": "private" },
                "from": { "id": 42 },
                "photo": [
                    { "file_id": "small", "width": 90, "height": 60, "file_size": 1200 },
                    { "file_id": "big", "width": 1280, "height": 960, "file_size": 98000 }
                ]
            }
        }"#;
        let update: super::Update = serde_json::from_str(raw).unwrap();
        let message = update.message.unwrap();
        assert!(message.chat.is_private());
        assert_eq!(message.photo.unwrap().len(), 2);
    }
}
