//! End-to-end scenarios: the whole bot driven through the in-memory gateway
//! against an in-memory SQLite database.

use std::sync::Arc;
use std::time::Duration;

use scamwatch_bot::bot::process_updates;
use scamwatch_bot::gateway::{
    ChatId, InMemoryGateway, InboundMessage, MessageContent, MessagingGateway, Sender,
    SentMessage,
};
use scamwatch_bot::messages;
use scamwatch_bot::report::{Evidence, ReportId, ReportStatus, SubmitterId};
use scamwatch_bot::review::Decision;
use scamwatch_bot::{Bot, ReportRepository, SingleAdmin, SqliteRepository};

const ADMIN: SubmitterId = SubmitterId(1);
const ALICE: SubmitterId = SubmitterId(100);
const BOB: SubmitterId = SubmitterId(200);

struct World {
    bot: Bot,
    gateway: Arc<InMemoryGateway>,
    repository: Arc<SqliteRepository>,
}

fn world() -> World {
    let gateway = Arc::new(InMemoryGateway::new());
    let repository = Arc::new(SqliteRepository::new_in_memory().unwrap());
    let bot = Bot::new(
        gateway.clone(),
        repository.clone(),
        Arc::new(SingleAdmin::new(ADMIN)),
        ChatId::from(ADMIN),
    );
    World {
        bot,
        gateway,
        repository,
    }
}

fn sender(id: SubmitterId) -> Sender {
    Sender {
        id,
        username: match id {
            ALICE => Some("alice".to_string()),
            _ => None,
        },
    }
}

fn text(from: SubmitterId, text: &str) -> InboundMessage {
    InboundMessage {
        chat_id: ChatId::from(from),
        sender: sender(from),
        content: MessageContent::Text(text.to_string()),
    }
}

fn photo(from: SubmitterId, file_ref: &str, caption: Option<&str>) -> InboundMessage {
    InboundMessage {
        chat_id: ChatId::from(from),
        sender: sender(from),
        content: MessageContent::Photo {
            file_ref: file_ref.to_string(),
            caption: caption.map(str::to_string),
        },
    }
}

impl World {
    async fn send(&self, message: InboundMessage) {
        self.bot.handle_message(message).await;
    }

    async fn file_text_report(&self, from: SubmitterId, target: &str) {
        self.send(text(from, "/add")).await;
        self.send(text(from, target)).await;
        self.send(text(from, "sold fake item")).await;
        self.send(text(from, "paid 200, got nothing")).await;
    }

    async fn last_reply_to(&self, id: SubmitterId) -> String {
        self.gateway
            .sent_to(ChatId::from(id))
            .await
            .last()
            .map(|m| m.text().to_string())
            .unwrap_or_default()
    }

    async fn report_count(&self) -> usize {
        let mut total = 0;
        for status in [
            ReportStatus::Pending,
            ReportStatus::Approved,
            ReportStatus::Rejected,
        ] {
            total += self.repository.list_by_status(status).await.unwrap().len();
        }
        total
    }
}

#[tokio::test]
async fn image_submission_is_stored_and_announced() {
    let w = world();

    w.send(text(ALICE, "/add")).await;
    w.send(text(ALICE, "scammerX")).await;
    w.send(text(ALICE, "sold fake item")).await;
    w.send(photo(ALICE, "photo-123", Some("screenshot attached")))
        .await;

    let pending = w
        .repository
        .list_by_status(ReportStatus::Pending)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    let report = &pending[0];
    assert_eq!(report.submitter_id, ALICE);
    assert_eq!(report.target_identifier, "scammerX");
    assert_eq!(report.description, "sold fake item");
    assert_eq!(
        report.evidence,
        Evidence::Image {
            file_ref: "photo-123".to_string(),
            caption: Some("screenshot attached".to_string()),
        }
    );

    let admin_messages = w.gateway.sent_to(ChatId::from(ADMIN)).await;
    assert!(matches!(
        admin_messages.as_slice(),
        [SentMessage::Text { text: alert, .. }, SentMessage::Photo { file_ref, caption: Some(caption), .. }]
            if alert.contains(&format!("#{}", report.id))
                && alert.contains("@alice")
                && alert.contains("scammerX")
                && alert.contains("screenshot attached")
                && file_ref == "photo-123"
                && caption.contains(&format!("#{}", report.id))
    ));

    assert_eq!(
        w.last_reply_to(ALICE).await,
        messages::reply_text(&scamwatch_bot::conversation::ReplyContent::ReportFiled {
            report_id: report.id
        })
    );
    assert_eq!(w.bot.sessions().active_count().await, 0);
}

#[tokio::test]
async fn long_image_report_still_reaches_administrator() {
    let w = world();
    let description = "They asked for a deposit. ".repeat(60);

    w.send(text(ALICE, "/add")).await;
    w.send(text(ALICE, "scammerX")).await;
    w.send(text(ALICE, &description)).await;
    w.send(photo(ALICE, "photo-9", None)).await;

    let admin_messages = w.gateway.sent_to(ChatId::from(ADMIN)).await;
    assert_eq!(admin_messages.len(), 2);
    assert!(admin_messages[0].text().contains(description.trim_end()));
    assert!(matches!(&admin_messages[1], SentMessage::Photo { file_ref, .. } if file_ref == "photo-9"));
    assert!(admin_messages[1].text().chars().count() <= 1024);
}

#[tokio::test]
async fn approving_report_seven_notifies_its_submitter() {
    let w = world();
    for i in 0..6 {
        w.file_text_report(ALICE, &format!("other{}", i)).await;
    }
    w.file_text_report(BOB, "scammerB").await;
    w.gateway.clear_sent().await;

    w.send(text(ADMIN, "/approve 7")).await;

    let report = w.repository.fetch_by_id(ReportId(7)).await.unwrap().unwrap();
    assert_eq!(report.submitter_id, BOB);
    assert_eq!(report.status, ReportStatus::Approved);

    let to_bob = w.gateway.sent_to(ChatId::from(BOB)).await;
    assert_eq!(to_bob.len(), 1);
    assert!(to_bob[0].text().contains("#7"));
    assert!(to_bob[0].text().contains("scammerB"));

    assert_eq!(
        w.last_reply_to(ADMIN).await,
        messages::decision_confirmed(Decision::Approve, ReportId(7))
    );
    assert!(w.gateway.sent_to(ChatId::from(ALICE)).await.is_empty());
}

#[tokio::test]
async fn approve_with_non_numeric_id_changes_nothing() {
    let w = world();
    w.file_text_report(BOB, "scammerB").await;
    w.gateway.clear_sent().await;

    w.send(text(ADMIN, "/approve abc")).await;

    let reply = w.last_reply_to(ADMIN).await;
    assert!(reply.starts_with("Error: "), "unexpected reply: {}", reply);
    let report = w.repository.fetch_by_id(ReportId(1)).await.unwrap().unwrap();
    assert_eq!(report.status, ReportStatus::Pending);
    assert!(w.gateway.sent_to(ChatId::from(BOB)).await.is_empty());
}

#[tokio::test]
async fn non_administrator_cannot_see_pending_reports() {
    let w = world();
    w.file_text_report(BOB, "scammerB").await;
    w.gateway.clear_sent().await;

    w.send(text(ALICE, "/pending")).await;

    let to_alice = w.gateway.sent_to(ChatId::from(ALICE)).await;
    assert_eq!(to_alice.len(), 1);
    assert_eq!(to_alice[0].text(), messages::ADMIN_ONLY);
    assert!(!to_alice[0].text().contains("scammerB"));
    assert_eq!(w.gateway.sent().await.len(), 1);
}

#[tokio::test]
async fn failed_submitter_notification_keeps_approval() {
    let w = world();
    w.file_text_report(BOB, "scammerB").await;
    w.gateway.make_unreachable(ChatId::from(BOB)).await;

    w.send(text(ADMIN, "/approve 1")).await;

    let report = w.repository.fetch_by_id(ReportId(1)).await.unwrap().unwrap();
    assert_eq!(report.status, ReportStatus::Approved);
    assert_eq!(
        w.last_reply_to(ADMIN).await,
        messages::decision_confirmed(Decision::Approve, ReportId(1))
    );
    assert_eq!(
        w.repository.distinct_approved_targets().await.unwrap(),
        vec!["scammerB".to_string()]
    );
}

#[tokio::test]
async fn unsupported_evidence_is_not_persisted() {
    let w = world();
    w.send(text(ALICE, "/add")).await;
    w.send(text(ALICE, "scammerX")).await;
    w.send(text(ALICE, "sold fake item")).await;
    w.send(InboundMessage {
        chat_id: ChatId::from(ALICE),
        sender: sender(ALICE),
        content: MessageContent::Unsupported,
    })
    .await;

    assert_eq!(w.report_count().await, 0);
    assert!(w.bot.sessions().get(ALICE).await.is_active());
    assert!(w
        .last_reply_to(ALICE)
        .await
        .ends_with(messages::prompt(scamwatch_bot::conversation::Prompt::Evidence)));
}

#[tokio::test]
async fn cancel_before_evidence_creates_nothing() {
    let w = world();
    w.send(text(ALICE, "/add")).await;
    w.send(text(ALICE, "scammerX")).await;
    w.send(text(ALICE, "sold fake item")).await;
    w.send(text(ALICE, "/cancel")).await;
    w.send(text(ALICE, "paid 200, got nothing")).await;

    assert_eq!(w.report_count().await, 0);
    assert!(w.gateway.sent_to(ChatId::from(ADMIN)).await.is_empty());
    assert_eq!(w.last_reply_to(ALICE).await, "Use /add to file a report.");
}

#[tokio::test]
async fn status_shows_latest_report_and_decision_is_final() {
    let w = world();
    w.file_text_report(ALICE, "first").await;
    w.file_text_report(ALICE, "second").await;

    w.send(text(ALICE, "/status")).await;
    let reply = w.last_reply_to(ALICE).await;
    assert!(reply.contains("#2"));
    assert!(reply.contains("second"));

    w.send(text(ADMIN, "/reject 2")).await;
    w.send(text(ADMIN, "/approve 2")).await;
    assert_eq!(
        w.last_reply_to(ADMIN).await,
        messages::already_decided(ReportId(2), ReportStatus::Rejected)
    );

    w.send(text(ALICE, "/status")).await;
    assert!(w.last_reply_to(ALICE).await.contains("Rejected"));
}

#[tokio::test]
async fn polled_updates_are_handled_in_order() {
    let w = world();
    for message in [
        text(ALICE, "/add"),
        text(ALICE, "scammerX"),
        text(ALICE, "sold fake item"),
        text(ALICE, "paid 200, got nothing"),
    ] {
        w.gateway.push_inbound(message).await;
    }

    let updates = w
        .gateway
        .poll_updates(0, Duration::from_secs(0))
        .await
        .unwrap();
    let offset = process_updates(&w.bot, updates, 0).await;

    assert!(w
        .gateway
        .poll_updates(offset, Duration::from_secs(0))
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        w.repository
            .fetch_latest_by_submitter(ALICE)
            .await
            .unwrap()
            .map(|r| r.target_identifier),
        Some("scammerX".to_string())
    );
}
