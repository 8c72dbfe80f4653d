//! Best-effort outbound notifications.
//!
//! Notifications go out after the state change they describe has already
//! been committed. A failed delivery is logged and dropped: it is never
//! retried and never reported to the caller.

use std::sync::Arc;

use tracing::{debug, error};

use crate::gateway::{ChatId, MessagingGateway};

pub struct NotificationRelay {
    gateway: Arc<dyn MessagingGateway>,
    admin_chat: ChatId,
}

impl NotificationRelay {
    pub fn new(gateway: Arc<dyn MessagingGateway>, admin_chat: ChatId) -> Self {
        Self {
            gateway,
            admin_chat,
        }
    }

    /// Send `text` to `recipient`. With an image, the text becomes its caption.
    pub async fn notify(&self, recipient: ChatId, text: &str, image: Option<&str>) {
        let result = match image {
            Some(file_ref) => self.gateway.send_photo(recipient, file_ref, Some(text)).await,
            None => self.gateway.send_message(recipient, text).await,
        };

        match result {
            Ok(()) => debug!("Notification delivered to chat {}", recipient),
            Err(e) => error!("Failed to notify chat {}: {}", recipient, e),
        }
    }

    pub async fn notify_admin(&self, text: &str, image: Option<&str>) {
        self.notify(self.admin_chat, text, image).await;
    }
}
