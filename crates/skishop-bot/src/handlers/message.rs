//! Inbound message handling: authorization, event reduction, and execution
//! of the state machine's outbound effects.

use anyhow::Result;
use tracing::{error, info, warn};

use skishop_core::dialog::{Effect, Event, Keyboard, NO_BUTTON, STOP_BUTTON, YES_BUTTON};
use skishop_core::product::{ProductCategory, ProductDraft};

use crate::bot::context::BotContext;
use crate::telegram::{InputMediaPhoto, Message, PhotoSize, ReplyMarkup, TelegramClient};
use crate::upload;

/// A grouped-media message carries at most this many photos.
pub const MEDIA_GROUP_CAP: usize = 10;

/// Handles one inbound message end to end.
///
/// The operator check runs before anything else: other chats get a fixed
/// rejection and their (nonexistent) session is never touched.
pub async fn handle_message(context: &BotContext, message: Message) -> Result<()> {
    let chat_id = message.chat.id;

    if chat_id != context.operator_id() {
        warn!("Rejected message from unauthorized chat {chat_id}");
        let _ = context
            .client()
            .send_message(chat_id, "Sorry, this bot only serves its operator.", None)
            .await;
        return Ok(());
    }

    let Some(event) = reduce_event(&message) else {
        return Ok(());
    };

    info!("Accepted message from chat {chat_id}");
    let effects = context.sessions().dispatch(chat_id, event).await;
    for effect in effects {
        execute_effect(context, chat_id, effect).await?;
    }

    Ok(())
}

/// Reduces a Telegram message to a state-machine event. Photos win over
/// text; a message with neither is dropped.
fn reduce_event(message: &Message) -> Option<Event> {
    if let Some(photos) = message.photo.as_deref()
        && let Some(photo) = select_best_photo(photos)
    {
        return Some(Event::Photo {
            file_id: photo.file_id.clone(),
        });
    }

    message
        .text
        .as_deref()
        .map(|text| Event::Text(text.to_string()))
}

/// Picks the highest-resolution photo variant.
fn select_best_photo(photos: &[PhotoSize]) -> Option<&PhotoSize> {
    photos.iter().max_by_key(|photo| {
        let size = photo.file_size.unwrap_or(0);
        let area = (photo.width.max(0) as u64) * (photo.height.max(0) as u64);
        (size, area)
    })
}

async fn execute_effect(context: &BotContext, chat_id: i64, effect: Effect) -> Result<()> {
    match effect {
        Effect::Send { text, keyboard } => {
            context
                .client()
                .send_message(chat_id, &text, markup_for(keyboard).as_ref())
                .await
        }
        Effect::Preview { summary, media } => {
            send_preview(context.client(), chat_id, &summary, &media).await
        }
        Effect::ListCatalog => list_catalog(context, chat_id).await,
        Effect::Commit { draft, staged } => execute_commit(context, chat_id, draft, staged).await,
    }
}

fn markup_for(keyboard: Keyboard) -> Option<ReplyMarkup> {
    match keyboard {
        Keyboard::Keep => None,
        Keyboard::Clear => Some(ReplyMarkup::remove()),
        Keyboard::Category => Some(ReplyMarkup::one_time_row(&[
            ProductCategory::Skis.label(),
            ProductCategory::Boots.label(),
        ])),
        Keyboard::Stop => Some(ReplyMarkup::row(&[STOP_BUTTON])),
        Keyboard::Confirm => Some(ReplyMarkup::one_time_row(&[YES_BUTTON, NO_BUTTON])),
    }
}

/// Renders a product preview. The rule is the same for staged file ids and
/// durable URLs: no photos → text only, one photo → captioned photo,
/// several → one grouped message (capped) with the caption on the first
/// item.
pub async fn send_preview(
    client: &TelegramClient,
    chat_id: i64,
    summary: &str,
    media: &[String],
) -> Result<()> {
    match media {
        [] => client.send_message(chat_id, summary, None).await,
        [only] => client.send_photo(chat_id, only, Some(summary)).await,
        _ => {
            client
                .send_media_group(chat_id, &media_group_items(summary, media))
                .await
        }
    }
}

fn media_group_items(summary: &str, media: &[String]) -> Vec<InputMediaPhoto> {
    media
        .iter()
        .take(MEDIA_GROUP_CAP)
        .enumerate()
        .map(|(index, item)| {
            if index == 0 {
                InputMediaPhoto::with_caption(item, summary)
            } else {
                InputMediaPhoto::new(item)
            }
        })
        .collect()
}

/// `/all`: renders every committed product as a preview.
async fn list_catalog(context: &BotContext, chat_id: i64) -> Result<()> {
    let products = context.catalog().list_all()?;
    if products.is_empty() {
        return context
            .client()
            .send_message(chat_id, "The catalog is empty.", None)
            .await;
    }

    for product in products {
        send_preview(
            context.client(),
            chat_id,
            &product.summary(),
            &product.photo_urls,
        )
        .await?;
    }
    Ok(())
}

/// Confirmed commit: upload the staged photos, persist the finished draft,
/// and report the outcome. The catalog is only touched when at least one
/// photo survived upload.
pub async fn execute_commit(
    context: &BotContext,
    chat_id: i64,
    draft: ProductDraft,
    staged: Vec<String>,
) -> Result<()> {
    let outcome = upload::upload_staged(context.client(), context.media_host(), &staged).await;

    if outcome.urls.is_empty() {
        return context
            .client()
            .send_message(
                chat_id,
                "❌ Could not upload any photo. Please try again.",
                Some(&ReplyMarkup::remove()),
            )
            .await;
    }

    let status = commit_status_message(outcome.urls.len(), outcome.attempted);
    let product = match draft.finish(outcome.urls) {
        Ok(product) => product,
        Err(err) => {
            error!("Confirmed draft was incomplete: {err}");
            return send_persist_failure(context, chat_id).await;
        }
    };

    match context.catalog().insert(&product) {
        Ok(()) => {
            info!("Committed product {} ({})", product.name, product.id);
            context
                .client()
                .send_message(chat_id, &status, Some(&ReplyMarkup::remove()))
                .await
        }
        Err(err) => {
            error!("Catalog insert failed: {err}");
            send_persist_failure(context, chat_id).await
        }
    }
}

async fn send_persist_failure(context: &BotContext, chat_id: i64) -> Result<()> {
    context
        .client()
        .send_message(
            chat_id,
            "❌ Failed to save the product. Please try again.",
            Some(&ReplyMarkup::remove()),
        )
        .await
}

/// Full success when every staged photo made it, partial count otherwise.
pub fn commit_status_message(uploaded: usize, attempted: usize) -> String {
    if uploaded == attempted {
        "🎉 Product added to the catalog!".to_string()
    } else {
        format!("⚠️ Product added, but only {uploaded} of {attempted} photos uploaded.")
    }
}

#[cfg(test)]
mod tests {
    use super::{MEDIA_GROUP_CAP, commit_status_message, media_group_items, select_best_photo};
    use crate::telegram::PhotoSize;

    fn photo(file_id: &str, width: i64, height: i64, file_size: Option<u64>) -> PhotoSize {
        PhotoSize {
            file_id: file_id.to_string(),
            width,
            height,
            file_size,
        }
    }

    #[test]
    fn best_photo_is_the_largest_variant() {
        let photos = vec![
            photo("thumb", 90, 60, Some(1_200)),
            photo("big", 1280, 960, Some(98_000)),
            photo("mid", 320, 240, Some(21_000)),
        ];
        assert_eq!(select_best_photo(&photos).unwrap().file_id, "big");
        assert!(select_best_photo(&[]).is_none());
    }

    #[test]
    fn media_groups_cap_at_ten_with_caption_first() {
        let media: Vec<String> = (0..11).map(|i| format!("file-{i}")).collect();
        let items = media_group_items("summary", &media);
        assert_eq!(items.len(), MEDIA_GROUP_CAP);
        assert_eq!(items[0].caption(), Some("summary"));
        assert!(items[1..].iter().all(|item| item.caption().is_none()));
    }

    #[test]
    fn status_message_reports_full_success_iff_all_uploaded() {
        assert_eq!(
            commit_status_message(3, 3),
            "🎉 Product added to the catalog!"
        );
        let partial = commit_status_message(1, 3);
        assert!(partial.contains("1 of 3"));
    }
}
