//! Message dispatch and the update polling loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::command::{parse_message, Authorizer, BotCommand, ParseResult};
use crate::conversation::interpreter::InterpreterContext;
use crate::conversation::{Event, SessionStore};
use crate::gateway::{
    ChatId, InboundMessage, InboundUpdate, MessageContent, MessagingGateway, Sender,
};
use crate::messages;
use crate::relay::NotificationRelay;
use crate::repository::ReportRepository;
use crate::review::ReviewWorkflow;

/// Delay before polling again after a failed poll; doubles up to `MAX_POLL_BACKOFF`.
const INITIAL_POLL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_POLL_BACKOFF: Duration = Duration::from_secs(60);

/// Routes inbound messages to the submission flow, the review workflow or
/// a static reply.
pub struct Bot {
    gateway: Arc<dyn MessagingGateway>,
    repository: Arc<dyn ReportRepository>,
    relay: Arc<NotificationRelay>,
    sessions: SessionStore,
    review: ReviewWorkflow,
}

impl Bot {
    pub fn new(
        gateway: Arc<dyn MessagingGateway>,
        repository: Arc<dyn ReportRepository>,
        authorizer: Arc<dyn Authorizer>,
        admin_chat: ChatId,
    ) -> Self {
        let relay = Arc::new(NotificationRelay::new(gateway.clone(), admin_chat));
        let review = ReviewWorkflow::new(repository.clone(), authorizer, relay.clone());
        Self {
            gateway,
            repository,
            relay,
            sessions: SessionStore::new(),
            review,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn gateway(&self) -> &Arc<dyn MessagingGateway> {
        &self.gateway
    }

    /// Handle one inbound message to completion.
    pub async fn handle_message(&self, message: InboundMessage) {
        let InboundMessage {
            chat_id,
            sender,
            content,
        } = message;

        let parsed = match &content {
            MessageContent::Text(text) => parse_message(text),
            _ => ParseResult::NotACommand,
        };

        match parsed {
            ParseResult::NotACommand => {
                self.advance_conversation(chat_id, sender, Event::from_content(content))
                    .await;
            }
            ParseResult::UnrecognizedCommand { attempted } => {
                debug!("Unrecognized command /{} from {}", attempted, sender.id);
                self.reply(chat_id, &messages::unknown_command(&attempted))
                    .await;
            }
            ParseResult::Command(command) => {
                info!("Command {} from {}", command, sender.id);
                self.handle_command(chat_id, sender, command).await;
            }
        }
    }

    async fn handle_command(&self, chat_id: ChatId, sender: Sender, command: BotCommand) {
        let caller = sender.id;
        let reply = match command {
            BotCommand::Add => {
                return self
                    .advance_conversation(chat_id, sender, Event::AddRequested)
                    .await
            }
            BotCommand::Cancel => {
                return self
                    .advance_conversation(chat_id, sender, Event::CancelRequested)
                    .await
            }
            BotCommand::Start => messages::HELP.to_string(),
            BotCommand::Status => match self.repository.fetch_latest_by_submitter(caller).await {
                Ok(report) => messages::latest_report(report.as_ref()),
                Err(e) => {
                    error!("Failed to look up latest report for {}: {}", caller, e);
                    messages::error(e)
                }
            },
            BotCommand::Pending => self.review.list_pending(caller).await,
            BotCommand::Approve(arg) => self.review.approve(caller, arg.as_deref()).await,
            BotCommand::Reject(arg) => self.review.reject(caller, arg.as_deref()).await,
            BotCommand::Scammers => self.review.list_approved(caller).await,
        };

        self.reply(chat_id, &reply).await;
    }

    async fn advance_conversation(&self, chat_id: ChatId, sender: Sender, event: Event) {
        let ctx = InterpreterContext {
            repository: self.repository.clone(),
            gateway: self.gateway.clone(),
            relay: self.relay.clone(),
            chat_id,
            sender,
        };
        self.sessions.process_event(event, &ctx).await;
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.gateway.send_message(chat_id, text).await {
            error!("Failed to reply in chat {}: {}", chat_id, e);
        }
    }
}

/// Long-poll the gateway and handle each message in turn.
///
/// Runs forever. Poll errors are logged and retried with backoff; a failure
/// while handling one message never stops the loop.
pub async fn update_polling_loop(bot: Arc<Bot>, poll_timeout: Duration) {
    let mut offset = 0;
    let mut backoff = INITIAL_POLL_BACKOFF;

    loop {
        let updates = match bot.gateway().poll_updates(offset, poll_timeout).await {
            Ok(updates) => {
                backoff = INITIAL_POLL_BACKOFF;
                updates
            }
            Err(e) => {
                error!("Error polling updates: {}", e);
                warn!("Retrying in {:?}", backoff);
                sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_POLL_BACKOFF);
                continue;
            }
        };

        offset = process_updates(&bot, updates, offset).await;
    }
}

/// Handle a batch of updates sequentially and return the next poll offset.
pub async fn process_updates(
    bot: &Bot,
    updates: Vec<InboundUpdate>,
    mut offset: i64,
) -> i64 {
    for update in updates {
        // Advance first so a message is never handled twice.
        offset = offset.max(update.update_id + 1);
        match update.message {
            Some(message) => bot.handle_message(message).await,
            None => debug!("Skipping update {} with no message", update.update_id),
        }
    }
    offset
}
