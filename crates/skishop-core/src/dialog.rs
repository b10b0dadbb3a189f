//! Conversation state machine for the product-entry flow.
//!
//! Each chat owns one [`Session`]; the session's [`Step`] decides how the
//! next inbound event is interpreted. Handlers are synchronous and pure with
//! respect to (session, event): they mutate the session in place and return
//! the outbound [`Effect`]s for the adapter to execute. No IO happens here.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::product::{ProductCategory, ProductDraft};
use crate::validate::validate_entry;

/// Conversation state. Exactly one is active per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Step {
    #[default]
    Idle,
    WaitingForCategory,
    WaitingForPhoto,
    WaitingForName,
    WaitingForSize,
    WaitingForDescription,
    WaitingForPrice,
    Confirm,
}

/// Per-chat conversation state: current step, the product draft being
/// accumulated, and the staged (not yet durable) photo file ids in upload
/// order.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub step: Step,
    pub draft: ProductDraft,
    pub staged: Vec<String>,
}

/// An inbound event, already reduced to what the state machine cares about.
#[derive(Debug, Clone)]
pub enum Event {
    Text(String),
    Photo { file_id: String },
}

/// Reply-keyboard request attached to an outbound message. The transport
/// layer maps these to actual markup; `Keep` leaves the current keyboard as
/// is, `Clear` removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    Keep,
    Clear,
    Category,
    Stop,
    Confirm,
}

/// An outbound effect produced by the state machine.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Send a text message, with a reply-keyboard request.
    Send { text: String, keyboard: Keyboard },
    /// Render the pre-commit preview over the staged photo file ids.
    Preview { summary: String, media: Vec<String> },
    /// Upload the staged photos and persist the finished draft.
    Commit {
        draft: ProductDraft,
        staged: Vec<String>,
    },
    /// Fetch all committed products and render each as a preview.
    ListCatalog,
}

/// Result of dispatching one event: effects to execute, plus whether the
/// session is to be removed from the store.
#[derive(Debug)]
pub struct Outcome {
    pub effects: Vec<Effect>,
    pub remove_session: bool,
}

impl Outcome {
    fn effects(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            remove_session: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Add,
    All,
    Cancel,
}

struct CommandDef {
    command: Command,
    pattern: &'static str,
    description: &'static str,
}

const COMMAND_DEFS: &[CommandDef] = &[
    CommandDef {
        command: Command::Start,
        pattern: "/start",
        description: "Show the welcome message",
    },
    CommandDef {
        command: Command::Help,
        pattern: "/help",
        description: "Show the welcome message",
    },
    CommandDef {
        command: Command::Add,
        pattern: "/add",
        description: "Add a new product",
    },
    CommandDef {
        command: Command::All,
        pattern: "/all",
        description: "List every product",
    },
    CommandDef {
        command: Command::Cancel,
        pattern: "/cancel",
        description: "Cancel the current action",
    },
];

pub const STOP_BUTTON: &str = "🛑 STOP (photos done)";
pub const YES_BUTTON: &str = "✅ Yes";
pub const NO_BUTTON: &str = "❌ No, start over";

pub fn parse_command(text: &str) -> Option<Command> {
    let trimmed = text.trim();

    COMMAND_DEFS
        .iter()
        .find(|def| command_matches(trimmed, def.pattern))
        .map(|def| def.command)
}

fn command_matches(trimmed_text: &str, command: &str) -> bool {
    if trimmed_text == command {
        return true;
    }

    trimmed_text
        .strip_prefix(command)
        .is_some_and(|stripped| stripped.starts_with('@'))
}

/// The fixed help/welcome message, built from the command table.
pub fn help_text() -> String {
    let mut text = String::from("⛷ Welcome to SkiShop admin!\n\nCommands:\n");
    for def in COMMAND_DEFS {
        if def.command == Command::Start || def.command == Command::Help {
            continue;
        }
        text.push_str(&format!("{} - {}\n", def.pattern, def.description));
    }
    text
}

fn is_stop_signal(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.eq_ignore_ascii_case("stop") || trimmed == STOP_BUTTON
}

fn is_affirmative(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.eq_ignore_ascii_case("yes") || trimmed == YES_BUTTON
}

/// Dispatches one inbound event against the session.
///
/// Global commands are intercepted before step dispatch; everything else is
/// interpreted by the current step.
pub fn handle_event(session: &mut Session, event: Event) -> Outcome {
    if let Event::Text(text) = &event
        && let Some(command) = parse_command(text)
    {
        match command {
            Command::Start | Command::Help => {
                session.step = Step::Idle;
                return Outcome::effects(vec![Effect::Send {
                    text: help_text(),
                    keyboard: Keyboard::Clear,
                }]);
            }
            Command::Cancel => {
                return Outcome {
                    effects: vec![Effect::Send {
                        text: "❌ Action cancelled.".to_string(),
                        keyboard: Keyboard::Clear,
                    }],
                    remove_session: true,
                };
            }
            Command::All => {
                return Outcome::effects(vec![Effect::ListCatalog]);
            }
            Command::Add if session.step == Step::Idle => {
                return Outcome::effects(begin_entry(session));
            }
            // /add mid-flow is plain text for the current step.
            Command::Add => {}
        }
    }

    let effects = match session.step {
        Step::Idle => Vec::new(),
        Step::WaitingForCategory => category_step(session, &event),
        Step::WaitingForPhoto => photo_step(session, &event),
        Step::WaitingForName => name_step(session, &event),
        Step::WaitingForSize => size_step(session, &event),
        Step::WaitingForDescription => description_step(session, &event),
        Step::WaitingForPrice => price_step(session, &event),
        Step::Confirm => confirm_step(session, &event),
    };
    Outcome::effects(effects)
}

/// `/add`: replace the draft and staged photos wholesale, ask for a category.
fn begin_entry(session: &mut Session) -> Vec<Effect> {
    session.draft = ProductDraft::default();
    session.staged.clear();
    session.step = Step::WaitingForCategory;

    vec![Effect::Send {
        text: "Pick a product category:".to_string(),
        keyboard: Keyboard::Category,
    }]
}

fn category_step(session: &mut Session, event: &Event) -> Vec<Effect> {
    let Event::Text(text) = event else {
        return Vec::new();
    };

    let Some(category) = ProductCategory::from_label(text) else {
        return vec![Effect::Send {
            text: "Please choose one of the keyboard options.".to_string(),
            keyboard: Keyboard::Keep,
        }];
    };

    session.draft.category = Some(category);
    session.step = Step::WaitingForPhoto;

    vec![Effect::Send {
        text: format!(
            "Selected: {}. Now send the photos.\nWhen you are done, press the button below 👇",
            category.label()
        ),
        keyboard: Keyboard::Stop,
    }]
}

fn photo_step(session: &mut Session, event: &Event) -> Vec<Effect> {
    match event {
        Event::Photo { file_id } => {
            session.staged.push(file_id.clone());
            vec![Effect::Send {
                text: format!(
                    "📸 Photo #{} staged! Send more or write 'stop'.",
                    session.staged.len()
                ),
                keyboard: Keyboard::Keep,
            }]
        }
        Event::Text(text) if is_stop_signal(text) => {
            if session.staged.is_empty() {
                vec![Effect::Send {
                    text: "At least one photo is required!".to_string(),
                    keyboard: Keyboard::Keep,
                }]
            } else {
                session.step = Step::WaitingForName;
                vec![Effect::Send {
                    text: "✅ Photos accepted. Now write the name (brand and model):".to_string(),
                    keyboard: Keyboard::Clear,
                }]
            }
        }
        Event::Text(_) => Vec::new(),
    }
}

fn name_step(session: &mut Session, event: &Event) -> Vec<Effect> {
    let Event::Text(text) = event else {
        return Vec::new();
    };

    match validate_entry(text) {
        Err(error) => vec![Effect::Send {
            text: error,
            keyboard: Keyboard::Keep,
        }],
        Ok(name) => {
            session.draft.name = Some(name.to_string());
            session.step = Step::WaitingForSize;

            let prompt = match session.draft.category {
                Some(ProductCategory::Boots) => "📏 Boot size (EU)?",
                _ => "📏 Ski length in cm?",
            };
            vec![Effect::Send {
                text: prompt.to_string(),
                keyboard: Keyboard::Keep,
            }]
        }
    }
}

fn size_step(session: &mut Session, event: &Event) -> Vec<Effect> {
    let Event::Text(text) = event else {
        return Vec::new();
    };

    let Ok(size) = text.trim().parse::<Decimal>() else {
        return vec![numeric_entry_error()];
    };

    session.draft.size = Some(size);
    session.step = Step::WaitingForDescription;

    vec![Effect::Send {
        text: "📝 Add a short description (condition, defects, bindings):".to_string(),
        keyboard: Keyboard::Keep,
    }]
}

fn description_step(session: &mut Session, event: &Event) -> Vec<Effect> {
    let Event::Text(text) = event else {
        return Vec::new();
    };

    match validate_entry(text) {
        Err(error) => vec![Effect::Send {
            text: error,
            keyboard: Keyboard::Keep,
        }],
        Ok(description) => {
            session.draft.description = Some(description.to_string());
            session.step = Step::WaitingForPrice;

            vec![Effect::Send {
                text: "💰 Set the price (digits only):".to_string(),
                keyboard: Keyboard::Keep,
            }]
        }
    }
}

fn price_step(session: &mut Session, event: &Event) -> Vec<Effect> {
    let Event::Text(text) = event else {
        return Vec::new();
    };

    let price = match text.trim().parse::<Decimal>() {
        Ok(price) if price.is_sign_positive() || price.is_zero() => price,
        _ => return vec![numeric_entry_error()],
    };

    session.draft.price = Some(price);
    session.step = Step::Confirm;

    vec![
        Effect::Preview {
            summary: session.draft.summary(),
            media: session.staged.clone(),
        },
        Effect::Send {
            text: "Everything correct?".to_string(),
            keyboard: Keyboard::Confirm,
        },
    ]
}

/// Terminal step: an affirmative hands the draft and staged photos off to
/// the commit executor; anything else cancels. Either way the session is
/// back to Idle with nothing staged.
fn confirm_step(session: &mut Session, event: &Event) -> Vec<Effect> {
    session.step = Step::Idle;

    if let Event::Text(text) = event
        && is_affirmative(text)
    {
        let draft = std::mem::take(&mut session.draft);
        let staged = std::mem::take(&mut session.staged);
        return vec![Effect::Commit { draft, staged }];
    }

    session.staged.clear();
    vec![Effect::Send {
        text: "Cancelled. Start again with /add.".to_string(),
        keyboard: Keyboard::Clear,
    }]
}

fn numeric_entry_error() -> Effect {
    Effect::Send {
        text: "Please enter a numeric value.".to_string(),
        keyboard: Keyboard::Keep,
    }
}

/// Process-wide mapping from chat id to its session.
///
/// The lock is held only for the synchronous state-machine step, never
/// across outbound IO.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<i64, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the state machine for one event against the chat's session
    /// (created on first contact), applying the session disposition under
    /// the lock, and returns the effects to execute.
    pub async fn dispatch(&self, chat_id: i64, event: Event) -> Vec<Effect> {
        let mut sessions = self.inner.lock().await;
        let session = sessions.entry(chat_id).or_default();
        let outcome = handle_event(session, event);
        if outcome.remove_session {
            sessions.remove(&chat_id);
        }
        outcome.effects
    }

    /// Replaces the chat's session with a fresh Idle one.
    pub async fn reset(&self, chat_id: i64) {
        self.inner.lock().await.insert(chat_id, Session::default());
    }

    /// Removes the chat's session entirely.
    pub async fn remove(&self, chat_id: i64) {
        self.inner.lock().await.remove(&chat_id);
    }

    /// Current step for the chat, if a session exists.
    pub async fn current_step(&self, chat_id: i64) -> Option<Step> {
        self.inner
            .lock()
            .await
            .get(&chat_id)
            .map(|session| session.step)
    }
}
