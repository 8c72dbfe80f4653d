//! AwaitingTarget state transitions.

use super::TransitionResult;
use crate::conversation::effect::{Effect, Prompt, ReplyContent};
use crate::conversation::event::Event;
use crate::conversation::state::ConversationState;

/// Handle transitions from the AwaitingTarget state.
///
/// The identifier is taken verbatim apart from surrounding whitespace. It is
/// not validated or normalized: handles, phone numbers and card numbers are
/// all fair game.
pub fn handle(state: ConversationState, event: Event) -> TransitionResult {
    match event {
        Event::TextReceived { text } => {
            let target = text.trim();
            if target.is_empty() {
                return TransitionResult::new(
                    state,
                    vec![Effect::reply(ReplyContent::BlankAnswer(Prompt::Target))],
                );
            }
            TransitionResult::new(
                ConversationState::AwaitingDescription {
                    target: target.to_string(),
                },
                vec![Effect::reply(ReplyContent::Ask(Prompt::Description))],
            )
        }
        Event::ImageReceived { .. } | Event::UnsupportedInput => TransitionResult::new(
            state,
            vec![Effect::reply(ReplyContent::UnsupportedInput(Prompt::Target))],
        ),
        _ => TransitionResult::no_change(state),
    }
}
