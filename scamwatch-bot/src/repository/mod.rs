//! Repository abstraction for report persistence.
//!
//! This module defines the `ReportRepository` trait that abstracts storage
//! operations for reports. Implementations provide different backends
//! (in-memory for tests, SQLite for the running bot).

mod memory;
mod sqlite;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

use async_trait::async_trait;

use crate::report::{NewReport, Report, ReportId, ReportStatus, SubmitterId};

/// Errors surfaced by a repository backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The backend failed to perform an operation.
    #[error("storage error during {operation}: {message}")]
    Storage {
        operation: &'static str,
        message: String,
    },
    /// Stored data could not be decoded.
    #[error("corrupt {what} in database")]
    Corruption { what: String },
}

impl RepositoryError {
    pub fn storage(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Storage {
            operation,
            message: message.into(),
        }
    }

    pub fn corruption(what: impl Into<String>) -> Self {
        Self::Corruption { what: what.into() }
    }
}

/// Outcome of a status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The report was pending and now carries the new status.
    Updated,
    /// No report has this ID.
    NotFound,
    /// The report was already decided; its status was left untouched.
    AlreadyDecided(ReportStatus),
}

/// Repository trait for persisting reports.
///
/// Every method is a single read or write. Callers get errors back
/// unchanged; there is no retry at this layer.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Insert a new pending report and return its assigned ID.
    ///
    /// IDs are strictly increasing across inserts.
    async fn insert(&self, report: NewReport) -> Result<ReportId, RepositoryError>;

    /// Get a report by ID.
    async fn fetch_by_id(&self, id: ReportId) -> Result<Option<Report>, RepositoryError>;

    /// Get the most recently created report filed by a submitter.
    async fn fetch_latest_by_submitter(
        &self,
        submitter_id: SubmitterId,
    ) -> Result<Option<Report>, RepositoryError>;

    /// All reports with the given status, in insertion order.
    async fn list_by_status(&self, status: ReportStatus) -> Result<Vec<Report>, RepositoryError>;

    /// Move a pending report to a decided status.
    ///
    /// A report that is already approved or rejected keeps its status.
    async fn update_status(
        &self,
        id: ReportId,
        new_status: ReportStatus,
    ) -> Result<StatusUpdate, RepositoryError>;

    /// Distinct target identifiers across approved reports, in order of first insertion.
    async fn distinct_approved_targets(&self) -> Result<Vec<String>, RepositoryError>;
}
