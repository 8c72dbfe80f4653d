//! Explicit state machine for the report submission conversation.
//!
//! The design separates:
//! - **State**: where a submitter is in the conversation (`ConversationState`)
//! - **Events**: what the submitter sent, or what a side effect reported back (`Event`)
//! - **Effects**: what to do (`Effect`)
//! - **Transition**: pure function `(State, Event) -> (State, Vec<Effect>)`
//!
//! The interpreter executes effects against the repository and the gateway
//! and returns result events. `SessionStore` keeps one state per submitter.

pub mod effect;
pub mod event;
pub mod interpreter;
pub mod state;
pub mod store;
pub mod transition;

pub use effect::*;
pub use event::*;
pub use state::*;
pub use store::SessionStore;
pub use transition::*;
