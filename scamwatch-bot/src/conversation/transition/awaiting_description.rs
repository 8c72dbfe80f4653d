//! AwaitingDescription state transitions.

use super::TransitionResult;
use crate::conversation::effect::{Effect, Prompt, ReplyContent};
use crate::conversation::event::Event;
use crate::conversation::state::ConversationState;

/// Handle transitions from the AwaitingDescription state.
///
/// The description is kept exactly as sent, line breaks included.
pub fn handle(state: ConversationState, event: Event) -> TransitionResult {
    let ConversationState::AwaitingDescription { target } = state else {
        return TransitionResult::no_change(state);
    };

    match event {
        Event::TextReceived { text } if text.trim().is_empty() => TransitionResult::new(
            ConversationState::AwaitingDescription { target },
            vec![Effect::reply(ReplyContent::BlankAnswer(Prompt::Description))],
        ),
        Event::TextReceived { text } => TransitionResult::new(
            ConversationState::AwaitingEvidence {
                target,
                description: text,
            },
            vec![Effect::reply(ReplyContent::Ask(Prompt::Evidence))],
        ),
        Event::ImageReceived { .. } | Event::UnsupportedInput => TransitionResult::new(
            ConversationState::AwaitingDescription { target },
            vec![Effect::reply(ReplyContent::UnsupportedInput(
                Prompt::Description,
            ))],
        ),
        _ => TransitionResult::no_change(ConversationState::AwaitingDescription { target }),
    }
}
