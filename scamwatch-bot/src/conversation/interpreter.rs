//! Effect interpreter that executes effects against the store and the gateway.
//!
//! The interpreter is the boundary between the pure conversation logic and
//! the outside world. It takes effects (descriptions of what to do) and
//! executes them, returning result events.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::effect::{Effect, LogLevel, ReplyContent};
use super::event::Event;
use super::state::ReportDraft;
use crate::gateway::{ChatId, MessagingGateway, Sender};
use crate::messages;
use crate::relay::NotificationRelay;
use crate::report::{Evidence, ReportId};
use crate::repository::ReportRepository;

/// Context needed by the interpreter to execute effects.
pub struct InterpreterContext {
    pub repository: Arc<dyn ReportRepository>,
    pub gateway: Arc<dyn MessagingGateway>,
    pub relay: Arc<NotificationRelay>,
    /// Chat the triggering message came from; replies go here.
    pub chat_id: ChatId,
    pub sender: Sender,
}

/// Result of executing an effect.
#[derive(Debug)]
pub enum EffectResult {
    /// Effect completed, produced result events.
    Ok(Vec<Event>),
    /// Effect failed with an error.
    Err(String),
}

impl EffectResult {
    pub fn single(event: Event) -> Self {
        Self::Ok(vec![event])
    }

    pub fn none() -> Self {
        Self::Ok(vec![])
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self::Err(msg.into())
    }
}

/// Execute a list of effects and collect result events.
///
/// Effects are executed sequentially. If an effect fails, execution continues
/// with remaining effects, and the error is logged.
pub async fn execute_effects(ctx: &InterpreterContext, effects: Vec<Effect>) -> Vec<Event> {
    let mut result_events = Vec::new();

    for effect in effects {
        match execute_effect(ctx, effect).await {
            EffectResult::Ok(events) => result_events.extend(events),
            EffectResult::Err(err) => {
                error!("Effect execution failed: {}", err);
            }
        }
    }

    result_events
}

/// Execute a single effect.
async fn execute_effect(ctx: &InterpreterContext, effect: Effect) -> EffectResult {
    match effect {
        Effect::Reply { content } => execute_reply(ctx, &content).await,

        Effect::PersistReport { draft } => execute_persist_report(ctx, draft).await,

        Effect::NotifyAdmin { report_id, draft } => {
            execute_notify_admin(ctx, report_id, &draft).await
        }

        Effect::Log { level, message } => {
            match level {
                LogLevel::Debug => debug!("{}", message),
                LogLevel::Info => info!("{}", message),
                LogLevel::Warn => warn!("{}", message),
                LogLevel::Error => error!("{}", message),
            }
            EffectResult::none()
        }
    }
}

async fn execute_reply(ctx: &InterpreterContext, content: &ReplyContent) -> EffectResult {
    let text = messages::reply_text(content);
    match ctx.gateway.send_message(ctx.chat_id, &text).await {
        Ok(()) => EffectResult::none(),
        Err(e) => EffectResult::err(format!("Failed to reply in chat {}: {}", ctx.chat_id, e)),
    }
}

async fn execute_persist_report(ctx: &InterpreterContext, draft: ReportDraft) -> EffectResult {
    let submitter_id = ctx.sender.id;
    match ctx
        .repository
        .insert(draft.into_new_report(submitter_id))
        .await
    {
        Ok(report_id) => {
            info!("Stored report #{} from submitter {}", report_id, submitter_id);
            EffectResult::single(Event::ReportSaved { report_id })
        }
        Err(e) => EffectResult::single(Event::ReportSaveFailed {
            error: e.to_string(),
        }),
    }
}

async fn execute_notify_admin(
    ctx: &InterpreterContext,
    report_id: ReportId,
    draft: &ReportDraft,
) -> EffectResult {
    let alert = messages::admin_alert(report_id, &ctx.sender, draft);
    ctx.relay.notify_admin(&alert, None).await;

    // The photo gets a short caption of its own; the alert text can exceed
    // the gateway's caption limit.
    if let Evidence::Image { file_ref, .. } = &draft.evidence {
        let caption = messages::evidence_photo_caption(report_id);
        ctx.relay.notify_admin(&caption, Some(file_ref)).await;
    }
    EffectResult::none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{InMemoryGateway, SentMessage};
    use crate::report::{ReportStatus, SubmitterId};
    use crate::repository::InMemoryRepository;

    struct Harness {
        repository: Arc<InMemoryRepository>,
        gateway: Arc<InMemoryGateway>,
        ctx: InterpreterContext,
    }

    fn harness() -> Harness {
        let repository = Arc::new(InMemoryRepository::new());
        let gateway = Arc::new(InMemoryGateway::new());
        let relay = Arc::new(NotificationRelay::new(gateway.clone(), ChatId(1)));
        let ctx = InterpreterContext {
            repository: repository.clone(),
            gateway: gateway.clone(),
            relay,
            chat_id: ChatId(42),
            sender: Sender {
                id: SubmitterId(42),
                username: Some("alice".to_string()),
            },
        };
        Harness {
            repository,
            gateway,
            ctx,
        }
    }

    fn draft(evidence: Evidence) -> ReportDraft {
        ReportDraft {
            target: "scammerX".to_string(),
            description: "sold fake item".to_string(),
            evidence,
        }
    }

    #[tokio::test]
    async fn test_persist_report_stores_with_sender_id() {
        let h = harness();
        let events = execute_effects(
            &h.ctx,
            vec![Effect::PersistReport {
                draft: draft(Evidence::Text {
                    body: "receipt".to_string(),
                }),
            }],
        )
        .await;

        let [Event::ReportSaved { report_id }] = events.as_slice() else {
            panic!("unexpected events: {:?}", events);
        };
        let stored = h.repository.fetch_by_id(*report_id).await.unwrap().unwrap();
        assert_eq!(stored.submitter_id, SubmitterId(42));
        assert_eq!(stored.status, ReportStatus::Pending);
    }

    #[tokio::test]
    async fn test_notify_admin_sends_alert_then_image() {
        let h = harness();
        execute_effects(
            &h.ctx,
            vec![Effect::NotifyAdmin {
                report_id: ReportId(3),
                draft: draft(Evidence::Image {
                    file_ref: "file-7".to_string(),
                    caption: None,
                }),
            }],
        )
        .await;

        let sent = h.gateway.sent_to(ChatId(1)).await;
        assert!(matches!(
            sent.as_slice(),
            [SentMessage::Text { text, .. }, SentMessage::Photo { file_ref, caption: Some(caption), .. }]
                if text.starts_with("New report #3")
                    && file_ref == "file-7"
                    && caption == "Evidence for report #3"
        ));
    }

    #[tokio::test]
    async fn test_long_description_keeps_photo_caption_short() {
        let h = harness();
        let description = "x".repeat(1500);
        execute_effects(
            &h.ctx,
            vec![Effect::NotifyAdmin {
                report_id: ReportId(4),
                draft: ReportDraft {
                    target: "scammerX".to_string(),
                    description: description.clone(),
                    evidence: Evidence::Image {
                        file_ref: "file-8".to_string(),
                        caption: Some("screenshot".to_string()),
                    },
                },
            }],
        )
        .await;

        let sent = h.gateway.sent_to(ChatId(1)).await;
        assert_eq!(sent.len(), 2);
        assert!(sent[0].text().contains(&description));
        let SentMessage::Photo { caption, .. } = &sent[1] else {
            panic!("expected a photo, got {:?}", sent[1]);
        };
        assert!(caption.as_deref().unwrap_or("").chars().count() <= 1024);
    }

    #[tokio::test]
    async fn test_failed_reply_does_not_stop_later_effects() {
        let h = harness();
        h.gateway.make_unreachable(ChatId(42)).await;

        let events = execute_effects(
            &h.ctx,
            vec![
                Effect::reply(ReplyContent::Cancelled),
                Effect::PersistReport {
                    draft: draft(Evidence::Text {
                        body: "receipt".to_string(),
                    }),
                },
            ],
        )
        .await;

        assert!(matches!(events.as_slice(), [Event::ReportSaved { .. }]));
    }
}
