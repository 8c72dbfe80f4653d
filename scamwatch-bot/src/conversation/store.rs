//! Per-submitter session store.
//!
//! Conversations live only in memory; a restart drops any report that was
//! not finished. Submitters with no conversation in progress have no entry.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::event::Event;
use super::interpreter::{execute_effects, InterpreterContext};
use super::state::ConversationState;
use super::transition::{transition, TransitionResult};
use crate::report::SubmitterId;

/// Thread-safe store of conversation states, keyed by submitter.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SubmitterId, ConversationState>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for a submitter; `Idle` when none is stored.
    pub async fn get(&self, submitter: SubmitterId) -> ConversationState {
        let sessions = self.sessions.read().await;
        sessions.get(&submitter).cloned().unwrap_or_default()
    }

    async fn set(&self, submitter: SubmitterId, state: ConversationState) {
        let mut sessions = self.sessions.write().await;
        if state.is_active() {
            sessions.insert(submitter, state);
        } else {
            sessions.remove(&submitter);
        }
    }

    /// Number of conversations in progress.
    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Process an event for the sender in `ctx`: transition the state and
    /// execute effects.
    ///
    /// Result events produced by effects are fed back into the transition
    /// function until none remain. Returns the final state.
    pub async fn process_event(&self, event: Event, ctx: &InterpreterContext) -> ConversationState {
        let submitter = ctx.sender.id;
        let mut current_state = self.get(submitter).await;

        let mut events_to_process = vec![event];

        while let Some(event) = events_to_process.pop() {
            debug!(
                "Processing event {} for submitter {} in state {}",
                event.log_summary(),
                submitter,
                current_state.name()
            );

            let TransitionResult { state, effects } = transition(current_state, event);
            current_state = state;

            if !effects.is_empty() {
                let result_events = execute_effects(ctx, effects).await;

                // Reverse so they are popped in the order they were produced.
                for result_event in result_events.into_iter().rev() {
                    events_to_process.push(result_event);
                }
            }
        }

        self.set(submitter, current_state.clone()).await;

        info!(
            "Submitter {} is now in state {}",
            submitter,
            current_state.name()
        );

        current_state
    }
}
