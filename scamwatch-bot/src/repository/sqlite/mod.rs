//! SQLite implementation of `ReportRepository`.
//!
//! This provides persistent storage that survives bot restarts.
//!
//! # Schema Versioning
//!
//! The database has a `schema_version` table that tracks the schema version.
//! When the schema needs to change, increment `CURRENT_SCHEMA_VERSION` and add
//! a migration in `run_migrations()`. Migrations run sequentially from the
//! current version to the target version.


use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

use super::{ReportRepository, RepositoryError, StatusUpdate};
use crate::report::{
    Evidence, EvidenceKind, NewReport, Report, ReportId, ReportStatus, SubmitterId,
};

/// Current schema version. Increment this when making schema changes and add
/// corresponding migration logic in `run_migrations()`.
const CURRENT_SCHEMA_VERSION: i64 = 1;

const REPORT_COLUMNS: &str = "id, submitter_id, target_identifier, description, \
     evidence_kind, evidence_payload, evidence_caption, status, created_at";

/// SQLite-backed report repository.
///
/// Uses `tokio::task::spawn_blocking` to run synchronous rusqlite operations
/// without blocking the async runtime. A single connection behind a mutex
/// serializes all access.
pub struct SqliteRepository {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl SqliteRepository {
    /// Open (or create) the database at the given path.
    ///
    /// Creates the schema if it doesn't exist and runs pending migrations.
    ///
    /// # Durability
    ///
    /// The database is configured with:
    /// - `journal_mode = WAL`
    /// - `synchronous = FULL`, so an acknowledged report survives power loss
    /// - `busy_timeout = 5000ms`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy();
        let is_in_memory = path_str == ":memory:";

        if !is_in_memory && !path_str.is_empty() {
            if let Some(parent) = path_ref.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        RepositoryError::storage(
                            "create database directory",
                            format!("{}: {}", parent.display(), e),
                        )
                    })?;
                }
            }
        }

        let conn = Connection::open(path_ref)
            .map_err(|e| RepositoryError::storage("open database", e.to_string()))?;

        // Reports carry submitter identities; keep the file private (Unix only).
        #[cfg(unix)]
        if !is_in_memory && !path_str.is_empty() {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = std::fs::set_permissions(path_ref, permissions) {
                warn!(
                    "Failed to set restrictive permissions on database file: {}",
                    e
                );
            }
        }

        // In-memory databases report "memory" as their journal mode.
        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(|e| RepositoryError::storage("set journal_mode", e.to_string()))?;
        let journal_mode_ok = journal_mode.eq_ignore_ascii_case("wal")
            || (is_in_memory && journal_mode.eq_ignore_ascii_case("memory"));
        if !journal_mode_ok {
            return Err(RepositoryError::storage(
                "configure journal_mode",
                format!(
                    "SQLite returned '{}' instead of 'wal'; the filesystem may not support shared memory",
                    journal_mode
                ),
            ));
        }

        conn.execute_batch(
            r#"
            PRAGMA synchronous = FULL;
            PRAGMA busy_timeout = 5000;
            "#,
        )
        .map_err(|e| RepositoryError::storage("configure pragmas", e.to_string()))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| RepositoryError::storage("create schema_version table", e.to_string()))?;

        // 0 means a fresh database
        let current_version: i64 = conn
            .query_row(
                "SELECT version FROM schema_version WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| RepositoryError::storage("get schema version", e.to_string()))?
            .unwrap_or(0);

        Self::run_migrations(&conn, current_version)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run migrations from `from_version` to `CURRENT_SCHEMA_VERSION`.
    fn run_migrations(conn: &Connection, from_version: i64) -> Result<(), RepositoryError> {
        if from_version > CURRENT_SCHEMA_VERSION {
            return Err(RepositoryError::storage(
                "schema version",
                format!(
                    "Database schema version {} is newer than supported version {}. \
                     Please upgrade the bot.",
                    from_version, CURRENT_SCHEMA_VERSION
                ),
            ));
        }

        if from_version == CURRENT_SCHEMA_VERSION {
            return Ok(());
        }

        // AUTOINCREMENT keeps IDs strictly increasing even if rows were ever removed by hand.
        if from_version < 1 {
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS reports (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    submitter_id INTEGER NOT NULL,
                    target_identifier TEXT NOT NULL,
                    description TEXT NOT NULL,
                    evidence_kind TEXT NOT NULL,
                    evidence_payload TEXT NOT NULL,
                    evidence_caption TEXT,
                    status TEXT NOT NULL DEFAULT 'pending',
                    created_at INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_reports_submitter
                    ON reports(submitter_id, created_at DESC);
                CREATE INDEX IF NOT EXISTS idx_reports_status
                    ON reports(status, id);
                "#,
            )
            .map_err(|e| RepositoryError::storage("migration v1", e.to_string()))?;
        }

        conn.execute(
            "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)",
            params![CURRENT_SCHEMA_VERSION],
        )
        .map_err(|e| RepositoryError::storage("update schema version", e.to_string()))?;

        Ok(())
    }

    /// Create a new in-memory SQLite repository (for testing).
    pub fn new_in_memory() -> Result<Self, RepositoryError> {
        Self::new(":memory:")
    }
}

fn lock<'a>(
    conn: &'a Mutex<Connection>,
    operation: &'static str,
) -> Result<MutexGuard<'a, Connection>, RepositoryError> {
    conn.lock()
        .map_err(|_| RepositoryError::storage(operation, "connection mutex poisoned"))
}

// =============================================================================
// Row conversion
// =============================================================================

/// A `reports` row as SQLite hands it back, before validation.
struct ReportRow {
    id: i64,
    submitter_id: i64,
    target_identifier: String,
    description: String,
    evidence_kind: String,
    evidence_payload: String,
    evidence_caption: Option<String>,
    status: String,
    created_at: i64,
}

impl ReportRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            submitter_id: row.get(1)?,
            target_identifier: row.get(2)?,
            description: row.get(3)?,
            evidence_kind: row.get(4)?,
            evidence_payload: row.get(5)?,
            evidence_caption: row.get(6)?,
            status: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_report(self) -> Result<Report, RepositoryError> {
        let kind = EvidenceKind::parse(&self.evidence_kind).ok_or_else(|| {
            RepositoryError::corruption(format!(
                "evidence kind '{}' on report {}",
                self.evidence_kind, self.id
            ))
        })?;
        let status: ReportStatus = self.status.parse().map_err(|_| {
            RepositoryError::corruption(format!("status '{}' on report {}", self.status, self.id))
        })?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(self.created_at).ok_or_else(
            || RepositoryError::corruption(format!("created_at on report {}", self.id)),
        )?;

        Ok(Report {
            id: ReportId(self.id),
            submitter_id: SubmitterId(self.submitter_id),
            target_identifier: self.target_identifier,
            description: self.description,
            evidence: Evidence::from_columns(kind, self.evidence_payload, self.evidence_caption),
            status,
            created_at,
        })
    }
}

/// Run a single-row report query.
fn query_one(
    conn: &Connection,
    operation: &'static str,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Option<Report>, RepositoryError> {
    conn.query_row(sql, params, ReportRow::from_row)
        .optional()
        .map_err(|e| RepositoryError::storage(operation, e.to_string()))?
        .map(ReportRow::into_report)
        .transpose()
}

// =============================================================================
// ReportRepository trait implementation
// =============================================================================

#[async_trait]
impl ReportRepository for SqliteRepository {
    async fn insert(&self, report: NewReport) -> Result<ReportId, RepositoryError> {
        let conn = self.conn.clone();
        let created_at = Utc::now().timestamp_millis();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn, "insert")?;
            let (kind, payload, caption) = report.evidence.to_columns();

            conn.execute(
                "INSERT INTO reports (submitter_id, target_identifier, description,
                                      evidence_kind, evidence_payload, evidence_caption,
                                      status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    report.submitter_id.0,
                    report.target_identifier,
                    report.description,
                    kind.as_str(),
                    payload,
                    caption,
                    ReportStatus::Pending.as_str(),
                    created_at
                ],
            )
            .map_err(|e| RepositoryError::storage("insert", e.to_string()))?;

            Ok(ReportId(conn.last_insert_rowid()))
        })
        .await
        .map_err(|e| RepositoryError::storage("insert", e.to_string()))?
    }

    async fn fetch_by_id(&self, id: ReportId) -> Result<Option<Report>, RepositoryError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn, "fetch_by_id")?;
            query_one(
                &conn,
                "fetch_by_id",
                &format!("SELECT {} FROM reports WHERE id = ?1", REPORT_COLUMNS),
                params![id.0],
            )
        })
        .await
        .map_err(|e| RepositoryError::storage("fetch_by_id", e.to_string()))?
    }

    async fn fetch_latest_by_submitter(
        &self,
        submitter_id: SubmitterId,
    ) -> Result<Option<Report>, RepositoryError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn, "fetch_latest_by_submitter")?;
            // Reports filed within the same millisecond fall back to ID order.
            query_one(
                &conn,
                "fetch_latest_by_submitter",
                &format!(
                    "SELECT {} FROM reports WHERE submitter_id = ?1
                     ORDER BY created_at DESC, id DESC LIMIT 1",
                    REPORT_COLUMNS
                ),
                params![submitter_id.0],
            )
        })
        .await
        .map_err(|e| RepositoryError::storage("fetch_latest_by_submitter", e.to_string()))?
    }

    async fn list_by_status(&self, status: ReportStatus) -> Result<Vec<Report>, RepositoryError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn, "list_by_status")?;

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {} FROM reports WHERE status = ?1 ORDER BY id ASC",
                    REPORT_COLUMNS
                ))
                .map_err(|e| RepositoryError::storage("list_by_status", e.to_string()))?;

            let rows = stmt
                .query_map(params![status.as_str()], ReportRow::from_row)
                .map_err(|e| RepositoryError::storage("list_by_status", e.to_string()))?;

            let mut reports = Vec::new();
            for row in rows {
                let row = row.map_err(|e| RepositoryError::storage("list_by_status", e.to_string()))?;
                reports.push(row.into_report()?);
            }
            Ok(reports)
        })
        .await
        .map_err(|e| RepositoryError::storage("list_by_status", e.to_string()))?
    }

    async fn update_status(
        &self,
        id: ReportId,
        new_status: ReportStatus,
    ) -> Result<StatusUpdate, RepositoryError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn, "update_status")?;

            let changed = conn
                .execute(
                    "UPDATE reports SET status = ?1 WHERE id = ?2 AND status = ?3",
                    params![new_status.as_str(), id.0, ReportStatus::Pending.as_str()],
                )
                .map_err(|e| RepositoryError::storage("update_status", e.to_string()))?;

            if changed > 0 {
                return Ok(StatusUpdate::Updated);
            }

            // Nothing changed: either the ID is unknown or the report is already decided.
            let current: Option<String> = conn
                .query_row(
                    "SELECT status FROM reports WHERE id = ?1",
                    params![id.0],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| RepositoryError::storage("update_status", e.to_string()))?;

            match current {
                None => Ok(StatusUpdate::NotFound),
                Some(status) => {
                    let status: ReportStatus = status.parse().map_err(|_| {
                        RepositoryError::corruption(format!("status '{}' on report {}", status, id))
                    })?;
                    Ok(StatusUpdate::AlreadyDecided(status))
                }
            }
        })
        .await
        .map_err(|e| RepositoryError::storage("update_status", e.to_string()))?
    }

    async fn distinct_approved_targets(&self) -> Result<Vec<String>, RepositoryError> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn, "distinct_approved_targets")?;

            let mut stmt = conn
                .prepare(
                    "SELECT target_identifier FROM reports WHERE status = ?1
                     GROUP BY target_identifier ORDER BY MIN(id) ASC",
                )
                .map_err(|e| {
                    RepositoryError::storage("distinct_approved_targets", e.to_string())
                })?;

            let rows = stmt
                .query_map(params![ReportStatus::Approved.as_str()], |row| {
                    row.get::<_, String>(0)
                })
                .map_err(|e| {
                    RepositoryError::storage("distinct_approved_targets", e.to_string())
                })?;

            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| RepositoryError::storage("distinct_approved_targets", e.to_string()))
        })
        .await
        .map_err(|e| RepositoryError::storage("distinct_approved_targets", e.to_string()))?
    }
}
