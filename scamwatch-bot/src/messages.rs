//! User-facing message texts.
//!
//! Every string the bot sends lives here so the wording can be reviewed (and
//! snapshot-tested) in one place.

use crate::conversation::{Prompt, ReplyContent, ReportDraft};
use crate::gateway::Sender;
use crate::report::{Evidence, Report, ReportId, ReportStatus};
use crate::review::Decision;

/// Maximum number of pending reports shown by `/pending`.
pub const PENDING_DISPLAY_LIMIT: usize = 10;

pub const HELP: &str = "Scamwatch bot\n\
\n\
Report scammers and help keep the blocklist up to date.\n\
\n\
Commands:\n\
/start - show this message\n\
/add - file a report\n\
/cancel - abandon the report you are filing\n\
/status - check the status of your latest report";

pub const ADMIN_ONLY: &str = "This command is only available to the administrator.";

pub const NO_REPORTS_YET: &str = "You have not filed any reports yet.";

pub const NOTHING_PENDING: &str = "There are no reports waiting for review.";

pub const NO_APPROVED_TARGETS: &str = "There are no confirmed scammers yet.";

pub fn prompt(prompt: Prompt) -> &'static str {
    match prompt {
        Prompt::Target => "Enter the username or ID of the scammer:",
        Prompt::Description => "Describe what happened in as much detail as you can:",
        Prompt::Evidence => "Send your evidence (text or a photo):",
    }
}

/// Render a conversation reply.
pub fn reply_text(content: &ReplyContent) -> String {
    match content {
        ReplyContent::Ask(p) => prompt(*p).to_string(),
        ReplyContent::BlankAnswer(p) => format!("The answer cannot be empty. {}", prompt(*p)),
        ReplyContent::UnsupportedInput(p) => {
            format!("That kind of message is not accepted here. {}", prompt(*p))
        }
        ReplyContent::ReportFiled { report_id } => format!(
            "Report #{} submitted! Use /status to check on it.",
            report_id
        ),
        ReplyContent::ReportNotSaved => {
            "Sorry, your report could not be saved. Please try again later with /add.".to_string()
        }
        ReplyContent::Cancelled => "Cancelled.".to_string(),
        ReplyContent::NothingToCancel => "There is nothing to cancel.".to_string(),
        ReplyContent::NoActiveConversation => "Use /add to file a report.".to_string(),
        ReplyContent::StillSubmitting => {
            "Your report is still being saved, please wait.".to_string()
        }
    }
}

fn status_label(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Pending => "Awaiting review",
        ReportStatus::Approved => "Confirmed",
        ReportStatus::Rejected => "Rejected",
    }
}

/// Reply to `/status`.
pub fn latest_report(report: Option<&Report>) -> String {
    match report {
        Some(report) => format!(
            "Your latest report:\nID: #{}\nScammer: {}\nStatus: {}",
            report.id,
            report.target_identifier,
            status_label(report.status)
        ),
        None => NO_REPORTS_YET.to_string(),
    }
}

/// Reply to `/pending`. Shows at most `PENDING_DISPLAY_LIMIT` reports.
pub fn pending_list(reports: &[Report]) -> String {
    if reports.is_empty() {
        return NOTHING_PENDING.to_string();
    }

    let mut text = String::from("Reports awaiting review:\n\n");
    for report in reports.iter().take(PENDING_DISPLAY_LIMIT) {
        text.push_str(&format!(
            "ID: #{} | Scammer: {}\n",
            report.id, report.target_identifier
        ));
    }
    text.push_str("\nUse /approve <ID> or /reject <ID>");
    text
}

/// Reply to `/scammers`.
pub fn approved_list(targets: &[String]) -> String {
    if targets.is_empty() {
        return NO_APPROVED_TARGETS.to_string();
    }
    format!("Confirmed scammers:\n\n{}", targets.join("\n"))
}

/// Alert sent to the administrator when a report is filed.
///
/// Always sent as a text message. The free-text fields come last so that a
/// gateway cutting an oversized message only loses the end of them.
pub fn admin_alert(report_id: ReportId, sender: &Sender, draft: &ReportDraft) -> String {
    let mut text = format!(
        "New report #{}\nFrom: {}\nScammer: {}\nStatus: {}\nDescription: {}",
        report_id,
        sender.display(),
        draft.target,
        ReportStatus::Pending,
        draft.description
    );
    match &draft.evidence {
        Evidence::Text { body } => text.push_str(&format!("\nEvidence: {}", body)),
        Evidence::Image {
            caption: Some(caption),
            ..
        } => text.push_str(&format!("\nEvidence: photo (caption: {})", caption)),
        Evidence::Image { caption: None, .. } => text.push_str("\nEvidence: photo"),
    }
    text
}

/// Caption for the evidence photo that follows an `admin_alert`.
pub fn evidence_photo_caption(report_id: ReportId) -> String {
    format!("Evidence for report #{}", report_id)
}

/// Message sent to the submitter once their report is decided.
pub fn decision_for_submitter(decision: Decision, report_id: ReportId, target: &str) -> String {
    match decision {
        Decision::Approve => format!(
            "Your report #{} (scammer {}) has been confirmed!",
            report_id, target
        ),
        Decision::Reject => format!(
            "Your report #{} (scammer {}) has been rejected.",
            report_id, target
        ),
    }
}

/// Confirmation sent to the administrator after a decision.
pub fn decision_confirmed(decision: Decision, report_id: ReportId) -> String {
    match decision {
        Decision::Approve => format!("Report #{} confirmed.", report_id),
        Decision::Reject => format!("Report #{} rejected.", report_id),
    }
}

pub fn already_decided(report_id: ReportId, status: ReportStatus) -> String {
    format!(
        "Report #{} was already decided (status: {}). Nothing changed.",
        report_id, status
    )
}

pub fn report_not_found(report_id: ReportId) -> String {
    format!("Report #{} not found.", report_id)
}

pub fn usage(command: &str) -> String {
    format!("Usage: /{} <ID>", command)
}

pub fn error(detail: impl std::fmt::Display) -> String {
    format!("Error: {}", detail)
}

pub fn unknown_command(attempted: &str) -> String {
    if attempted.is_empty() {
        "Unknown command. Send /start to see what I can do.".to_string()
    } else {
        format!(
            "Unknown command /{}. Send /start to see what I can do.",
            attempted
        )
    }
}
