//! Messaging gateway abstraction.
//!
//! The bot never talks to a chat service directly. Everything inbound and
//! outbound goes through `MessagingGateway`, which has a Telegram
//! implementation for production and an in-memory one for tests.

mod memory;
mod telegram;

pub use memory::{InMemoryGateway, SentMessage};
pub use telegram::{TelegramClient, DEFAULT_API_URL};

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::report::SubmitterId;

/// Newtype for the chat a message arrives in or is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SubmitterId> for ChatId {
    /// Private chats share their ID with the user, so a submitter can be
    /// messaged directly.
    fn from(id: SubmitterId) -> Self {
        Self(id.0)
    }
}

/// The person who sent a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: SubmitterId,
    pub username: Option<String>,
}

impl Sender {
    /// `@username` when the sender has one, otherwise the numeric ID.
    pub fn display(&self) -> String {
        match &self.username {
            Some(username) => format!("@{}", username),
            None => self.id.to_string(),
        }
    }
}

/// Payload of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    Photo {
        file_ref: String,
        caption: Option<String>,
    },
    /// Stickers, documents, voice notes and anything else the bot does not read.
    Unsupported,
}

/// A message received from the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub sender: Sender,
    pub content: MessageContent,
}

/// One unit of work from `poll_updates`.
///
/// Updates without a message (edits, channel posts) still carry an ID so the
/// poll offset can move past them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    pub update_id: i64,
    pub message: Option<InboundMessage>,
}

/// Errors from the messaging gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP request to {method} failed: {source}")]
    Http {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} rejected by API: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
    #[error("could not decode {method} response: {message}")]
    Decode {
        method: &'static str,
        message: String,
    },
    #[error("delivery to chat {chat_id} failed: {reason}")]
    Delivery { chat_id: ChatId, reason: String },
}

/// Chat transport used by the bot.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a text message.
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), GatewayError>;

    /// Send an image previously received by the gateway, with an optional caption.
    async fn send_photo(
        &self,
        chat_id: ChatId,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<(), GatewayError>;

    /// Fetch updates with an ID of at least `offset`, waiting up to `timeout`
    /// for one to arrive.
    async fn poll_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<InboundUpdate>, GatewayError>;
}
