//! Idle state transitions.

use super::TransitionResult;
use crate::conversation::effect::{Effect, ReplyContent};
use crate::conversation::event::Event;
use crate::conversation::state::ConversationState;

/// Handle transitions from the Idle state.
///
/// `/add` is handled by the caller. Anything else the submitter sends while
/// idle gets a pointer to `/add` and leaves the state alone.
pub fn handle(state: ConversationState, event: Event) -> TransitionResult {
    match event {
        Event::CancelRequested => {
            TransitionResult::new(state, vec![Effect::reply(ReplyContent::NothingToCancel)])
        }
        Event::TextReceived { .. } | Event::ImageReceived { .. } | Event::UnsupportedInput => {
            TransitionResult::new(
                state,
                vec![Effect::reply(ReplyContent::NoActiveConversation)],
            )
        }
        Event::AddRequested | Event::ReportSaved { .. } | Event::ReportSaveFailed { .. } => {
            TransitionResult::no_change(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_while_idle_points_to_add() {
        let result = handle(
            ConversationState::Idle,
            Event::TextReceived {
                text: "scammerX".to_string(),
            },
        );
        assert_eq!(result.state, ConversationState::Idle);
        assert_eq!(
            result.effects,
            vec![Effect::reply(ReplyContent::NoActiveConversation)]
        );
    }

    #[test]
    fn test_image_while_idle_points_to_add() {
        let result = handle(
            ConversationState::Idle,
            Event::ImageReceived {
                file_ref: "file".to_string(),
                caption: None,
            },
        );
        assert_eq!(result.state, ConversationState::Idle);
        assert_eq!(
            result.effects,
            vec![Effect::reply(ReplyContent::NoActiveConversation)]
        );
    }
}
