//! Report records and the types that make them up.
//!
//! A report is created once, when a submitter finishes the submission flow,
//! and changes exactly once afterwards, when the administrator decides it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Newtype for the auto-assigned report ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportId(pub i64);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ReportId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Newtype for the chat identity of the person filing a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmitterId(pub i64);

impl fmt::Display for SubmitterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SubmitterId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Review status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReportStatus {
    /// The spelling used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored status string is not one we know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ReportStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Discriminator stored in the `evidence_kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Text,
    Image,
}

impl EvidenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

/// Evidence attached to a report.
///
/// Text evidence is stored literally. Image evidence is an opaque reference
/// to a file held by the messaging gateway, plus the caption the submitter
/// attached to it (if any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Evidence {
    Text {
        body: String,
    },
    Image {
        file_ref: String,
        caption: Option<String>,
    },
}

impl Evidence {
    pub fn kind(&self) -> EvidenceKind {
        match self {
            Self::Text { .. } => EvidenceKind::Text,
            Self::Image { .. } => EvidenceKind::Image,
        }
    }

    /// Build an image reference, dropping a caption that is empty or blank.
    pub fn image(file_ref: impl Into<String>, caption: Option<String>) -> Self {
        Self::Image {
            file_ref: file_ref.into(),
            caption: caption.filter(|c| !c.trim().is_empty()),
        }
    }

    /// Flatten into `(kind, payload, caption)` column values.
    pub fn to_columns(&self) -> (EvidenceKind, &str, Option<&str>) {
        match self {
            Self::Text { body } => (EvidenceKind::Text, body.as_str(), None),
            Self::Image { file_ref, caption } => {
                (EvidenceKind::Image, file_ref.as_str(), caption.as_deref())
            }
        }
    }

    /// Rebuild from stored column values. The caption is ignored for text evidence.
    pub fn from_columns(kind: EvidenceKind, payload: String, caption: Option<String>) -> Self {
        match kind {
            EvidenceKind::Text => Self::Text { body: payload },
            EvidenceKind::Image => Self::image(payload, caption),
        }
    }
}

/// Everything needed to insert a report. The store assigns the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReport {
    pub submitter_id: SubmitterId,
    pub target_identifier: String,
    pub description: String,
    pub evidence: Evidence,
}

/// A persisted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub id: ReportId,
    pub submitter_id: SubmitterId,
    pub target_identifier: String,
    pub description: String,
    pub evidence: Evidence,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Materialize a freshly inserted report.
    pub fn from_new(id: ReportId, new: NewReport, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            submitter_id: new.submitter_id,
            target_identifier: new.target_identifier,
            description: new.description,
            evidence: new.evidence,
            status: ReportStatus::Pending,
            created_at,
        }
    }
}
