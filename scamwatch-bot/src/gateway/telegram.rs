use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::{
    ChatId, GatewayError, InboundMessage, InboundUpdate, MessageContent, MessagingGateway, Sender,
};
use crate::report::SubmitterId;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Bot API length limits, in UTF-16 code units.
const MAX_MESSAGE_LEN: usize = 4096;
const MAX_CAPTION_LEN: usize = 1024;

/// Extra time allowed on top of the long-poll timeout before the HTTP request gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_url: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SendPhotoRequest<'a> {
    chat_id: i64,
    photo: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
    allowed_updates: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    from: Option<User>,
    text: Option<String>,
    photo: Option<Vec<PhotoSize>>,
    caption: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoSize {
    file_id: String,
}

impl TelegramClient {
    pub fn with_api_url(token: String, api_url: String) -> Self {
        let client = Client::builder()
            .user_agent(concat!("scamwatch-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build configured HTTP client, using defaults: {}", e);
                Client::new()
            });

        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    /// Call a Bot API method and unwrap the `{ok, result}` envelope.
    async fn call<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &'static str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, GatewayError> {
        let mut request = self.client.post(self.method_url(method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // The URL embeds the token, so strip it from transport errors.
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Http {
                method,
                source: e.without_url(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| GatewayError::Http {
            method,
            source: e.without_url(),
        })?;

        let envelope: ApiResponse<T> =
            serde_json::from_str(&text).map_err(|e| GatewayError::Decode {
                method,
                message: format!("HTTP {}: {}", status, e),
            })?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(GatewayError::Api {
                method,
                description,
            });
        }

        envelope.result.ok_or_else(|| GatewayError::Decode {
            method,
            message: "missing result".to_string(),
        })
    }
}

/// Cut `text` to at most `limit` UTF-16 code units, marking the cut with an ellipsis.
fn fit_to_limit(text: &str, limit: usize) -> Cow<'_, str> {
    if text.encode_utf16().count() <= limit {
        return Cow::Borrowed(text);
    }

    let budget = limit.saturating_sub(1);
    let mut used = 0;
    let mut end = 0;
    for (idx, ch) in text.char_indices() {
        if used + ch.len_utf16() > budget {
            break;
        }
        used += ch.len_utf16();
        end = idx + ch.len_utf8();
    }
    Cow::Owned(format!("{}\u{2026}", &text[..end]))
}

/// Turn a Bot API update into the gateway's message type.
fn into_inbound(update: Update) -> InboundUpdate {
    let message = update.message.and_then(|message| {
        // Messages without a sender are channel posts; the bot has no use for them.
        let from = message.from?;
        let content = match (message.text, message.photo) {
            (Some(text), _) => MessageContent::Text(text),
            (None, Some(sizes)) => match sizes.into_iter().last() {
                // Sizes come smallest first; keep the full-resolution one.
                Some(largest) => MessageContent::Photo {
                    file_ref: largest.file_id,
                    caption: message.caption,
                },
                None => MessageContent::Unsupported,
            },
            (None, None) => MessageContent::Unsupported,
        };

        Some(InboundMessage {
            chat_id: ChatId(message.chat.id),
            sender: Sender {
                id: SubmitterId(from.id),
                username: from.username,
            },
            content,
        })
    });

    InboundUpdate {
        update_id: update.update_id,
        message,
    }
}

#[async_trait]
impl MessagingGateway for TelegramClient {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), GatewayError> {
        debug!("Sending message to chat {}", chat_id);
        let text = fit_to_limit(text, MAX_MESSAGE_LEN);
        if let Cow::Owned(_) = text {
            warn!("Message to chat {} truncated to the API limit", chat_id);
        }
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                &SendMessageRequest {
                    chat_id: chat_id.0,
                    text: &text,
                },
                None,
            )
            .await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        file_ref: &str,
        caption: Option<&str>,
    ) -> Result<(), GatewayError> {
        debug!("Sending photo to chat {}", chat_id);
        let caption = caption.map(|c| fit_to_limit(c, MAX_CAPTION_LEN));
        if let Some(Cow::Owned(_)) = caption {
            warn!("Photo caption for chat {} truncated to the API limit", chat_id);
        }
        let _: serde_json::Value = self
            .call(
                "sendPhoto",
                &SendPhotoRequest {
                    chat_id: chat_id.0,
                    photo: file_ref,
                    caption: caption.as_deref(),
                },
                None,
            )
            .await?;
        Ok(())
    }

    async fn poll_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<InboundUpdate>, GatewayError> {
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                &GetUpdatesRequest {
                    offset,
                    timeout: timeout.as_secs(),
                    allowed_updates: &["message"],
                },
                Some(timeout + POLL_GRACE),
            )
            .await?;

        if !updates.is_empty() {
            info!("Received {} updates", updates.len());
        }

        Ok(updates.into_iter().map(into_inbound).collect())
    }
}
