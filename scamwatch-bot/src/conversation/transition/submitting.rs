//! Submitting state transitions.

use super::TransitionResult;
use crate::conversation::effect::{Effect, LogLevel, ReplyContent};
use crate::conversation::event::Event;
use crate::conversation::state::ConversationState;

/// Handle transitions from the Submitting state.
///
/// On a successful insert the administrator is notified before the
/// submitter is told the report ID. Either way the conversation ends.
pub fn handle(state: ConversationState, event: Event) -> TransitionResult {
    let ConversationState::Submitting { draft } = state else {
        return TransitionResult::no_change(state);
    };

    match event {
        Event::ReportSaved { report_id } => TransitionResult::new(
            ConversationState::Idle,
            vec![
                Effect::log(LogLevel::Info, format!("Report #{} filed", report_id)),
                Effect::NotifyAdmin { report_id, draft },
                Effect::reply(ReplyContent::ReportFiled { report_id }),
            ],
        ),
        Event::ReportSaveFailed { error } => TransitionResult::new(
            ConversationState::Idle,
            vec![
                Effect::log(LogLevel::Error, format!("Failed to save report: {}", error)),
                Effect::reply(ReplyContent::ReportNotSaved),
            ],
        ),
        _ => TransitionResult::new(
            ConversationState::Submitting { draft },
            vec![Effect::reply(ReplyContent::StillSubmitting)],
        ),
    }
}
