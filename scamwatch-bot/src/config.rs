use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::gateway::DEFAULT_API_URL;
use crate::report::SubmitterId;

/// File name of the report database inside `state_dir`.
pub const DATABASE_FILE: &str = "scamwatch.db";

#[derive(Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    /// The one identity allowed to run review commands.
    pub admin_user_id: SubmitterId,
    pub port: u16,
    /// Directory for persistent state (SQLite database).
    /// Defaults to current working directory.
    pub state_dir: PathBuf,
    pub poll_timeout: Duration,
    pub telegram_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .context("TELEGRAM_BOT_TOKEN environment variable is required")?;

        let admin_user_id = env::var("ADMIN_USER_ID")
            .context("ADMIN_USER_ID environment variable is required")?
            .trim()
            .parse::<i64>()
            .map(SubmitterId)
            .context("ADMIN_USER_ID must be a valid number")?;

        let port = optional_var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid number")?;

        let state_dir = optional_var("STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let poll_timeout = optional_var("POLL_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .map(Duration::from_secs)
            .context("POLL_TIMEOUT_SECS must be a valid number of seconds")?;

        let telegram_api_url =
            optional_var("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Config {
            telegram_bot_token,
            admin_user_id,
            port,
            state_dir,
            poll_timeout,
            telegram_api_url,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.state_dir.join(DATABASE_FILE)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("telegram_bot_token", &"<redacted>")
            .field("admin_user_id", &self.admin_user_id)
            .field("port", &self.port)
            .field("state_dir", &self.state_dir)
            .field("poll_timeout", &self.poll_timeout)
            .field("telegram_api_url", &self.telegram_api_url)
            .finish()
    }
}

fn optional_var(name: &str) -> Option<String> {
    parse_optional(env::var(name).ok())
}

/// Treat a missing, empty, or whitespace-only value as unset.
pub fn parse_optional(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
