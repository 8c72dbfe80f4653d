//! State types for the submission conversation.
//!
//! Each step carries exactly the answers collected so far, so a state can
//! never hold a description without a target.

use crate::report::{Evidence, NewReport, SubmitterId};

/// The answers of a finished conversation, before they are tied to a submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub target: String,
    pub description: String,
    pub evidence: Evidence,
}

impl ReportDraft {
    pub fn into_new_report(self, submitter_id: SubmitterId) -> NewReport {
        NewReport {
            submitter_id,
            target_identifier: self.target,
            description: self.description,
            evidence: self.evidence,
        }
    }
}

/// Where a submitter is in the report conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationState {
    /// No conversation in progress.
    #[default]
    Idle,

    /// Waiting for the identifier of the accused party.
    AwaitingTarget,

    /// Waiting for a description of what happened.
    AwaitingDescription { target: String },

    /// Waiting for text or an image as evidence.
    AwaitingEvidence { target: String, description: String },

    /// Evidence received; the report is being written to the store.
    Submitting { draft: ReportDraft },
}

impl ConversationState {
    /// True when the submitter is partway through a report.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Short name for logs. Never includes the submitter's answers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::AwaitingTarget => "AwaitingTarget",
            Self::AwaitingDescription { .. } => "AwaitingDescription",
            Self::AwaitingEvidence { .. } => "AwaitingEvidence",
            Self::Submitting { .. } => "Submitting",
        }
    }
}
