//! In-memory implementation of `MessagingGateway`.
//!
//! Records every outbound message and serves queued inbound updates. Used
//! to drive the bot in tests without a chat service.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{ChatId, GatewayError, InboundMessage, InboundUpdate, MessagingGateway};

/// An outbound message captured by `InMemoryGateway`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text {
        chat_id: ChatId,
        text: String,
    },
    Photo {
        chat_id: ChatId,
        file_ref: String,
        caption: Option<String>,
    },
}

impl SentMessage {
    pub fn chat_id(&self) -> ChatId {
        match self {
            Self::Text { chat_id, .. } | Self::Photo { chat_id, .. } => *chat_id,
        }
    }

    /// Message text, or the caption for a photo.
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text, .. } => text,
            Self::Photo { caption, .. } => caption.as_deref().unwrap_or(""),
        }
    }
}

/// In-memory messaging gateway.
pub struct InMemoryGateway {
    sent: RwLock<Vec<SentMessage>>,
    inbound: RwLock<VecDeque<InboundUpdate>>,
    next_update_id: RwLock<i64>,
    unreachable: RwLock<HashSet<ChatId>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            inbound: RwLock::new(VecDeque::new()),
            next_update_id: RwLock::new(1),
            unreachable: RwLock::new(HashSet::new()),
        }
    }

    /// Queue an inbound message for the next `poll_updates`.
    pub async fn push_inbound(&self, message: InboundMessage) {
        let mut next = self.next_update_id.write().await;
        self.inbound.write().await.push_back(InboundUpdate {
            update_id: *next,
            message: Some(message),
        });
        *next += 1;
    }

    /// Make every delivery to `chat_id` fail.
    pub async fn make_unreachable(&self, chat_id: ChatId) {
        self.unreachable.write().await.insert(chat_id);
    }

    /// Everything sent so far, in order.
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }

    /// Everything sent to one chat, in order.
    pub async fn sent_to(&self, chat_id: ChatId) -> Vec<SentMessage> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|m| m.chat_id() == chat_id)
            .cloned()
            .collect()
    }

    pub async fn clear_sent(&self) {
        self.sent.write().await.clear();
    }

    async fn check_reachable(&self, chat_id: ChatId) -> Result<(), GatewayError> {
        if self.unreachable.read().await.contains(&chat_id) {
            return Err(GatewayError::Delivery {
                chat_id,
                reason: "chat unreachable".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagingGateway for InMemoryGateway {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), GatewayError> {
        self.check_reachable(chat_id).await?;
        self.sent.write().await.push(SentMessage::Text {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<(), GatewayError> {
        self.check_reachable(chat_id).await?;
        self.sent.write().await.push(SentMessage::Photo {
            chat_id,
            file_ref: file_ref.to_string(),
            caption: caption.map(str::to_string),
        });
        Ok(())
    }

    async fn poll_updates(
        &self,
        offset: i64,
        _timeout: Duration,
    ) -> Result<Vec<InboundUpdate>, GatewayError> {
        let mut inbound = self.inbound.write().await;
        inbound.retain(|u| u.update_id >= offset);
        Ok(inbound.iter().cloned().collect())
    }
}
