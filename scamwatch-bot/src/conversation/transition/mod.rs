//! Pure conversation transition function.
//!
//! `transition` takes the current state and an event and returns the new
//! state and a list of effects. It performs no I/O.
//!
//! `/add` and `/cancel` behave the same from every step, so they are handled
//! here. Everything else is delegated to one handler module per state, each
//! with co-located tests:
//! - `idle`: no conversation in progress
//! - `awaiting_target`, `awaiting_description`, `awaiting_evidence`: the three questions
//! - `submitting`: waiting for the store to confirm the insert

mod awaiting_description;
mod awaiting_evidence;
mod awaiting_target;
mod idle;
mod submitting;

use super::effect::{Effect, LogLevel, Prompt, ReplyContent};
use super::event::Event;
use super::state::ConversationState;

/// Result of a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub state: ConversationState,
    /// Effects to execute, in order.
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConversationState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    pub fn no_change(state: ConversationState) -> Self {
        Self {
            state,
            effects: vec![],
        }
    }
}

/// Pure state transition function.
pub fn transition(state: ConversationState, event: Event) -> TransitionResult {
    match (&state, &event) {
        // The report is being written; nothing may restart or cancel it.
        (ConversationState::Submitting { .. }, _) => submitting::handle(state, event),

        // Persistence results only make sense while submitting.
        (_, Event::ReportSaved { .. } | Event::ReportSaveFailed { .. }) => TransitionResult::new(
            state.clone(),
            vec![Effect::log(
                LogLevel::Warn,
                format!(
                    "Ignoring {} in state {}",
                    event.log_summary(),
                    state.name()
                ),
            )],
        ),

        // `/add` always starts over, discarding any answers so far.
        (_, Event::AddRequested) => {
            let mut effects = Vec::new();
            if state.is_active() {
                effects.push(Effect::log(
                    LogLevel::Info,
                    format!("Restarting conversation from {}", state.name()),
                ));
            }
            effects.push(Effect::reply(ReplyContent::Ask(Prompt::Target)));
            TransitionResult::new(ConversationState::AwaitingTarget, effects)
        }

        (ConversationState::Idle, _) => idle::handle(state, event),

        (_, Event::CancelRequested) => TransitionResult::new(
            ConversationState::Idle,
            vec![Effect::reply(ReplyContent::Cancelled)],
        ),

        (ConversationState::AwaitingTarget, _) => awaiting_target::handle(state, event),
        (ConversationState::AwaitingDescription { .. }, _) => {
            awaiting_description::handle(state, event)
        }
        (ConversationState::AwaitingEvidence { .. }, _) => awaiting_evidence::handle(state, event),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::state::ReportDraft;
    use crate::report::{Evidence, ReportId};
    use proptest::prelude::*;

    fn text(s: &str) -> Event {
        Event::TextReceived {
            text: s.to_string(),
        }
    }

    fn image(file_ref: &str, caption: Option<&str>) -> Event {
        Event::ImageReceived {
            file_ref: file_ref.to_string(),
            caption: caption.map(str::to_string),
        }
    }

    fn run(events: Vec<Event>) -> (ConversationState, Vec<Effect>) {
        let mut state = ConversationState::Idle;
        let mut effects = Vec::new();
        for event in events {
            let result = transition(state, event);
            state = result.state;
            effects.extend(result.effects);
        }
        (state, effects)
    }

    fn persisted(effects: &[Effect]) -> Vec<&ReportDraft> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::PersistReport { draft } => Some(draft),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_full_conversation_with_image_evidence() {
        let (state, effects) = run(vec![
            Event::AddRequested,
            text("  scammerX  "),
            text("sold fake item"),
            image("file-123", Some("screenshot attached")),
        ]);

        let expected = ReportDraft {
            target: "scammerX".to_string(),
            description: "sold fake item".to_string(),
            evidence: Evidence::Image {
                file_ref: "file-123".to_string(),
                caption: Some("screenshot attached".to_string()),
            },
        };
        assert_eq!(
            state,
            ConversationState::Submitting {
                draft: expected.clone()
            }
        );
        assert_eq!(persisted(&effects), vec![&expected]);
        assert_eq!(
            effects
                .iter()
                .filter(|e| matches!(e, Effect::Reply { .. }))
                .count(),
            3
        );
    }

    #[test]
    fn test_saved_report_notifies_admin_then_replies() {
        let (state, _) = run(vec![
            Event::AddRequested,
            text("scammerX"),
            text("sold fake item"),
            text("paid 200 and got nothing"),
        ]);

        let result = transition(
            state,
            Event::ReportSaved {
                report_id: ReportId(7),
            },
        );
        assert_eq!(result.state, ConversationState::Idle);

        let notify = result
            .effects
            .iter()
            .position(|e| matches!(e, Effect::NotifyAdmin { .. }))
            .unwrap();
        let reply = result
            .effects
            .iter()
            .position(|e| {
                *e == Effect::reply(ReplyContent::ReportFiled {
                    report_id: ReportId(7),
                })
            })
            .unwrap();
        assert!(notify < reply);
    }

    #[test]
    fn test_add_restarts_conversation_in_progress() {
        let (state, effects) = run(vec![
            Event::AddRequested,
            text("scammerX"),
            Event::AddRequested,
        ]);

        assert_eq!(state, ConversationState::AwaitingTarget);
        assert_eq!(
            effects.last(),
            Some(&Effect::reply(ReplyContent::Ask(Prompt::Target)))
        );
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::Log { level: LogLevel::Info, .. })));
    }

    #[test]
    fn test_cancel_from_each_step_returns_to_idle() {
        let prefixes = vec![
            vec![Event::AddRequested],
            vec![Event::AddRequested, text("scammerX")],
            vec![Event::AddRequested, text("scammerX"), text("sold fake item")],
        ];

        for mut events in prefixes {
            events.push(Event::CancelRequested);
            let (state, effects) = run(events);
            assert_eq!(state, ConversationState::Idle);
            assert_eq!(
                effects.last(),
                Some(&Effect::reply(ReplyContent::Cancelled))
            );
            assert!(persisted(&effects).is_empty());
        }
    }

    #[test]
    fn test_cancel_while_idle() {
        let result = transition(ConversationState::Idle, Event::CancelRequested);
        assert_eq!(result.state, ConversationState::Idle);
        assert_eq!(
            result.effects,
            vec![Effect::reply(ReplyContent::NothingToCancel)]
        );
    }

    #[test]
    fn test_stray_save_result_is_ignored() {
        let result = transition(
            ConversationState::AwaitingTarget,
            Event::ReportSaved {
                report_id: ReportId(1),
            },
        );
        assert_eq!(result.state, ConversationState::AwaitingTarget);
        assert!(matches!(
            result.effects.as_slice(),
            [Effect::Log {
                level: LogLevel::Warn,
                ..
            }]
        ));
    }

    // =========================================================================
    // Property tests
    // =========================================================================

    fn arb_submitter_event() -> impl Strategy<Value = Event> {
        prop_oneof![
            Just(Event::AddRequested),
            Just(Event::CancelRequested),
            Just(Event::UnsupportedInput),
            "[ a-z]{0,8}".prop_map(|text| Event::TextReceived { text }),
            ("[a-z]{1,8}", proptest::option::of("[a-z ]{0,8}"))
                .prop_map(|(file_ref, caption)| Event::ImageReceived { file_ref, caption }),
        ]
    }

    proptest! {
        /// Property: whatever happens before it, a cancel followed by anything
        /// other than `/add` never persists a report.
        #[test]
        fn cancel_before_evidence_never_persists(
            before in proptest::collection::vec(arb_submitter_event(), 0..10),
            after in proptest::collection::vec(
                arb_submitter_event().prop_filter("no restart", |e| *e != Event::AddRequested),
                0..10,
            ),
        ) {
            let mut state = ConversationState::Idle;
            for event in before {
                state = transition(state, event).state;
                // Resolve any pending insert so the cancel is never swallowed.
                if let ConversationState::Submitting { .. } = state {
                    state = transition(state, Event::ReportSaved { report_id: ReportId(1) }).state;
                }
            }

            let result = transition(state, Event::CancelRequested);
            prop_assert_eq!(&result.state, &ConversationState::Idle);
            prop_assert!(persisted(&result.effects).is_empty());

            let mut state = result.state;
            for event in after {
                let result = transition(state, event);
                prop_assert!(persisted(&result.effects).is_empty());
                state = result.state;
            }
        }

        /// Property: a report is persisted only from the evidence step.
        #[test]
        fn persist_only_from_awaiting_evidence(events in proptest::collection::vec(arb_submitter_event(), 0..20)) {
            let mut state = ConversationState::Idle;
            for event in events {
                let was_awaiting_evidence = matches!(state, ConversationState::AwaitingEvidence { .. });
                let result = transition(state, event);
                if !persisted(&result.effects).is_empty() {
                    prop_assert!(was_awaiting_evidence);
                    prop_assert!(matches!(result.state, ConversationState::Submitting { .. }), "persisting must move to Submitting");
                }
                state = match result.state {
                    ConversationState::Submitting { .. } => {
                        transition(result.state, Event::ReportSaved { report_id: ReportId(1) }).state
                    }
                    other => other,
                };
            }
        }
    }
}
