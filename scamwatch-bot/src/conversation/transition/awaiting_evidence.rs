//! AwaitingEvidence state transitions.

use super::TransitionResult;
use crate::conversation::effect::{Effect, Prompt, ReplyContent};
use crate::conversation::event::Event;
use crate::conversation::state::{ConversationState, ReportDraft};
use crate::report::Evidence;

/// Handle transitions from the AwaitingEvidence state.
///
/// Text or an image completes the report: the state moves to `Submitting`
/// and the interpreter is asked to persist the draft.
pub fn handle(state: ConversationState, event: Event) -> TransitionResult {
    let ConversationState::AwaitingEvidence {
        target,
        description,
    } = state
    else {
        return TransitionResult::no_change(state);
    };

    let evidence = match event {
        Event::TextReceived { text } if !text.trim().is_empty() => Evidence::Text { body: text },
        Event::ImageReceived { file_ref, caption } => Evidence::image(file_ref, caption),
        Event::TextReceived { .. } => {
            return TransitionResult::new(
                ConversationState::AwaitingEvidence {
                    target,
                    description,
                },
                vec![Effect::reply(ReplyContent::BlankAnswer(Prompt::Evidence))],
            )
        }
        Event::UnsupportedInput => {
            return TransitionResult::new(
                ConversationState::AwaitingEvidence {
                    target,
                    description,
                },
                vec![Effect::reply(ReplyContent::UnsupportedInput(
                    Prompt::Evidence,
                ))],
            )
        }
        _ => {
            return TransitionResult::no_change(ConversationState::AwaitingEvidence {
                target,
                description,
            })
        }
    };

    let draft = ReportDraft {
        target,
        description,
        evidence,
    };
    TransitionResult::new(
        ConversationState::Submitting {
            draft: draft.clone(),
        },
        vec![Effect::PersistReport { draft }],
    )
}
