//! Events that trigger conversation transitions.
//!
//! Events are either things the submitter did (commands, replies) or results
//! reported back by the interpreter after running an effect.

use crate::gateway::MessageContent;
use crate::report::ReportId;

/// All events that can trigger conversation transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // =========================================================================
    // Submitter Events
    // =========================================================================
    /// Submitter sent `/add`.
    AddRequested,

    /// Submitter sent `/cancel`.
    CancelRequested,

    /// Submitter sent plain (non-command) text.
    TextReceived { text: String },

    /// Submitter sent an image, optionally captioned.
    ImageReceived {
        file_ref: String,
        caption: Option<String>,
    },

    /// Submitter sent something the bot cannot read (sticker, voice note, ...).
    UnsupportedInput,

    // =========================================================================
    // Persistence Results
    // =========================================================================
    /// The report was written and assigned an ID.
    ReportSaved { report_id: ReportId },

    /// Writing the report failed.
    ReportSaveFailed { error: String },
}

impl Event {
    /// Map non-command message content to an event.
    pub fn from_content(content: MessageContent) -> Self {
        match content {
            MessageContent::Text(text) => Self::TextReceived { text },
            MessageContent::Photo { file_ref, caption } => Self::ImageReceived { file_ref, caption },
            MessageContent::Unsupported => Self::UnsupportedInput,
        }
    }

    /// Short description for logs, without message contents.
    pub fn log_summary(&self) -> String {
        match self {
            Self::AddRequested => "AddRequested".to_string(),
            Self::CancelRequested => "CancelRequested".to_string(),
            Self::TextReceived { text } => format!("TextReceived({} chars)", text.chars().count()),
            Self::ImageReceived { caption, .. } => format!(
                "ImageReceived(caption: {})",
                if caption.is_some() { "yes" } else { "no" }
            ),
            Self::UnsupportedInput => "UnsupportedInput".to_string(),
            Self::ReportSaved { report_id } => format!("ReportSaved(#{})", report_id),
            Self::ReportSaveFailed { .. } => "ReportSaveFailed".to_string(),
        }
    }
}
