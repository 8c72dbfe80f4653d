//! In-memory implementation of `ReportRepository`.
//!
//! All reports are held in a `Vec` and lost on restart. The bot itself runs
//! on SQLite; this backend keeps the higher layers testable without a
//! database file.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ReportRepository, RepositoryError, StatusUpdate};
use crate::report::{NewReport, Report, ReportId, ReportStatus, SubmitterId};

/// In-memory report repository.
///
/// Reports are stored in insertion order, so the vector index and the ID
/// order agree.
pub struct InMemoryRepository {
    reports: RwLock<Vec<Report>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            reports: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportRepository for InMemoryRepository {
    async fn insert(&self, report: NewReport) -> Result<ReportId, RepositoryError> {
        let mut reports = self.reports.write().await;
        let id = ReportId(reports.last().map_or(1, |last| last.id.0 + 1));
        reports.push(Report::from_new(id, report, Utc::now()));
        Ok(id)
    }

    async fn fetch_by_id(&self, id: ReportId) -> Result<Option<Report>, RepositoryError> {
        let reports = self.reports.read().await;
        Ok(reports.iter().find(|r| r.id == id).cloned())
    }

    async fn fetch_latest_by_submitter(
        &self,
        submitter_id: SubmitterId,
    ) -> Result<Option<Report>, RepositoryError> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .filter(|r| r.submitter_id == submitter_id)
            .max_by_key(|r| (r.created_at, r.id))
            .cloned())
    }

    async fn list_by_status(&self, status: ReportStatus) -> Result<Vec<Report>, RepositoryError> {
        let reports = self.reports.read().await;
        Ok(reports
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: ReportId,
        new_status: ReportStatus,
    ) -> Result<StatusUpdate, RepositoryError> {
        let mut reports = self.reports.write().await;
        let Some(report) = reports.iter_mut().find(|r| r.id == id) else {
            return Ok(StatusUpdate::NotFound);
        };
        if report.status.is_decided() {
            return Ok(StatusUpdate::AlreadyDecided(report.status));
        }
        report.status = new_status;
        Ok(StatusUpdate::Updated)
    }

    async fn distinct_approved_targets(&self) -> Result<Vec<String>, RepositoryError> {
        let reports = self.reports.read().await;
        let mut targets: Vec<String> = Vec::new();
        for report in reports.iter().filter(|r| r.status == ReportStatus::Approved) {
            if !targets.contains(&report.target_identifier) {
                targets.push(report.target_identifier.clone());
            }
        }
        Ok(targets)
    }
}
