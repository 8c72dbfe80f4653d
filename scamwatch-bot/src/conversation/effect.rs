//! Effects (side effects as data).
//!
//! Effects describe what should happen as a result of a transition. They are
//! pure data; the interpreter executes them against the repository and the
//! messaging gateway. This keeps the transition logic testable without I/O.

use super::state::ReportDraft;
use crate::report::ReportId;

/// All effects that can be produced by conversation transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Reply to the submitter in the chat the message came from.
    Reply { content: ReplyContent },

    /// Write the finished report to the store.
    ///
    /// The interpreter answers with `ReportSaved` or `ReportSaveFailed`.
    PersistReport { draft: ReportDraft },

    /// Tell the administrator a new report is waiting.
    NotifyAdmin {
        report_id: ReportId,
        draft: ReportDraft,
    },

    /// Log a message.
    Log { level: LogLevel, message: String },
}

/// Which answer the conversation is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Target,
    Description,
    Evidence,
}

/// Content of a reply to the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyContent {
    /// Ask for the next answer.
    Ask(Prompt),

    /// The answer was empty after trimming; ask again.
    BlankAnswer(Prompt),

    /// The message type is not accepted at this step; ask again.
    UnsupportedInput(Prompt),

    /// The report was stored.
    ReportFiled { report_id: ReportId },

    /// The report could not be stored.
    ReportNotSaved,

    /// The conversation was cancelled.
    Cancelled,

    /// `/cancel` with no conversation in progress.
    NothingToCancel,

    /// A plain message with no conversation in progress.
    NoActiveConversation,

    /// A message arrived while the report is still being stored.
    StillSubmitting,
}

/// Log level for logging effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl Effect {
    pub fn reply(content: ReplyContent) -> Self {
        Self::Reply { content }
    }

    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }
}
