//! Administrator review of filed reports.
//!
//! Every operation checks the caller through the `Authorizer` first and
//! answers a non-administrator with the same denial, whatever the command.
//! Operations return the reply text for the caller; notifications to
//! submitters go through the relay and never affect that reply.

use std::num::ParseIntError;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::command::Authorizer;
use crate::gateway::ChatId;
use crate::messages;
use crate::relay::NotificationRelay;
use crate::report::{ReportId, ReportStatus, SubmitterId};
use crate::repository::{ReportRepository, RepositoryError, StatusUpdate};

/// Errors from parsing and executing a review command.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("missing report ID for /{command}")]
    MissingArgument { command: &'static str },
    #[error("invalid report ID '{raw}': {source}")]
    InvalidId {
        raw: String,
        #[source]
        source: ParseIntError,
    },
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// The two decisions an administrator can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn command(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    pub fn status(&self) -> ReportStatus {
        match self {
            Self::Approve => ReportStatus::Approved,
            Self::Reject => ReportStatus::Rejected,
        }
    }
}

/// Parse the raw argument of `/approve` or `/reject`.
pub fn parse_report_id(decision: Decision, arg: Option<&str>) -> Result<ReportId, ReviewError> {
    let raw = arg.ok_or(ReviewError::MissingArgument {
        command: decision.command(),
    })?;
    raw.parse::<i64>()
        .map(ReportId)
        .map_err(|source| ReviewError::InvalidId {
            raw: raw.to_string(),
            source,
        })
}

pub struct ReviewWorkflow {
    repository: Arc<dyn ReportRepository>,
    authorizer: Arc<dyn Authorizer>,
    relay: Arc<NotificationRelay>,
}

impl ReviewWorkflow {
    pub fn new(
        repository: Arc<dyn ReportRepository>,
        authorizer: Arc<dyn Authorizer>,
        relay: Arc<NotificationRelay>,
    ) -> Self {
        Self {
            repository,
            authorizer,
            relay,
        }
    }

    fn deny(&self, caller: SubmitterId, operation: &str) -> Option<String> {
        if self.authorizer.is_authorized(caller) {
            return None;
        }
        warn!("Denied {} for non-administrator {}", operation, caller);
        Some(messages::ADMIN_ONLY.to_string())
    }

    /// Up to `PENDING_DISPLAY_LIMIT` pending reports, oldest first.
    pub async fn list_pending(&self, caller: SubmitterId) -> String {
        if let Some(denial) = self.deny(caller, "/pending") {
            return denial;
        }

        match self.repository.list_by_status(ReportStatus::Pending).await {
            Ok(reports) => messages::pending_list(&reports),
            Err(e) => {
                error!("Failed to list pending reports: {}", e);
                messages::error(e)
            }
        }
    }

    pub async fn approve(&self, caller: SubmitterId, arg: Option<&str>) -> String {
        self.decide(caller, Decision::Approve, arg).await
    }

    pub async fn reject(&self, caller: SubmitterId, arg: Option<&str>) -> String {
        self.decide(caller, Decision::Reject, arg).await
    }

    /// The public blocklist, for the administrator.
    pub async fn list_approved(&self, caller: SubmitterId) -> String {
        if let Some(denial) = self.deny(caller, "/scammers") {
            return denial;
        }

        match self.repository.distinct_approved_targets().await {
            Ok(targets) => messages::approved_list(&targets),
            Err(e) => {
                error!("Failed to list approved targets: {}", e);
                messages::error(e)
            }
        }
    }

    async fn decide(&self, caller: SubmitterId, decision: Decision, arg: Option<&str>) -> String {
        if let Some(denial) = self.deny(caller, decision.command()) {
            return denial;
        }

        match self.try_decide(decision, arg).await {
            Ok(reply) => reply,
            Err(ReviewError::MissingArgument { command }) => messages::usage(command),
            Err(e) => {
                warn!("/{} failed: {}", decision.command(), e);
                messages::error(e)
            }
        }
    }

    async fn try_decide(&self, decision: Decision, arg: Option<&str>) -> Result<String, ReviewError> {
        let report_id = parse_report_id(decision, arg)?;
        let new_status = decision.status();

        match self.repository.update_status(report_id, new_status).await? {
            StatusUpdate::Updated => {}
            StatusUpdate::NotFound => return Ok(messages::report_not_found(report_id)),
            StatusUpdate::AlreadyDecided(current) => {
                info!(
                    "Report #{} already {}, ignoring /{}",
                    report_id,
                    current,
                    decision.command()
                );
                return Ok(messages::already_decided(report_id, current));
            }
        }

        info!("Report #{} marked {}", report_id, new_status);

        // The decision is committed; from here on nothing may turn it into an error.
        match self.repository.fetch_by_id(report_id).await {
            Ok(Some(report)) => {
                self.relay
                    .notify(
                        ChatId::from(report.submitter_id),
                        &messages::decision_for_submitter(
                            decision,
                            report.id,
                            &report.target_identifier,
                        ),
                        None,
                    )
                    .await;
            }
            Ok(None) => warn!("Report #{} vanished after update", report_id),
            Err(e) => error!(
                "Could not load report #{} to notify its submitter: {}",
                report_id, e
            ),
        }

        Ok(messages::decision_confirmed(decision, report_id))
    }
}
