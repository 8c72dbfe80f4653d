//! Command parsing and authorization for chat commands
use std::fmt;

use crate::report::SubmitterId;

/// A parsed bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Show the help text
    Start,
    /// Begin a new report
    Add,
    /// Abandon the report in progress
    Cancel,
    /// Show the caller's latest report
    Status,
    /// List pending reports (administrator)
    Pending,
    /// Approve a report (administrator). Carries the raw argument, if any.
    Approve(Option<String>),
    /// Reject a report (administrator). Carries the raw argument, if any.
    Reject(Option<String>),
    /// List approved targets (administrator)
    Scammers,
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "/start"),
            Self::Add => write!(f, "/add"),
            Self::Cancel => write!(f, "/cancel"),
            Self::Status => write!(f, "/status"),
            Self::Pending => write!(f, "/pending"),
            Self::Approve(arg) => match arg {
                Some(arg) => write!(f, "/approve {}", arg),
                None => write!(f, "/approve"),
            },
            Self::Reject(arg) => match arg {
                Some(arg) => write!(f, "/reject {}", arg),
                None => write!(f, "/reject"),
            },
            Self::Scammers => write!(f, "/scammers"),
        }
    }
}

/// Result of parsing an inbound message for commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    /// Plain text, not a command
    NotACommand,
    /// Looked like a command but is not one we know
    UnrecognizedCommand {
        /// The command word that was attempted, without the leading slash
        attempted: String,
    },
    /// A valid command was found
    Command(BotCommand),
}

/// Parse message text for a bot command.
///
/// # Command Format
///
/// `/<command>[@<botname>] [args...]`
///
/// - The slash must be the first non-whitespace character.
/// - Command words are case-sensitive: `/Add` is not `/add`.
/// - A `@botname` suffix (used by chat clients in group chats) is ignored.
/// - Arguments are the whitespace-separated words after the command; only
///   `approve` and `reject` use one, and extra words are ignored.
pub fn parse_message(text: &str) -> ParseResult {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return ParseResult::NotACommand;
    };

    let mut words = rest.split_whitespace();
    let Some(head) = words.next() else {
        return ParseResult::UnrecognizedCommand {
            attempted: String::new(),
        };
    };

    let command_word = match head.split_once('@') {
        Some((word, _bot)) => word,
        None => head,
    };
    let first_arg = words.next().map(str::to_string);

    let command = match command_word {
        "start" | "help" => BotCommand::Start,
        "add" => BotCommand::Add,
        "cancel" => BotCommand::Cancel,
        "status" => BotCommand::Status,
        "pending" => BotCommand::Pending,
        "approve" => BotCommand::Approve(first_arg),
        "reject" => BotCommand::Reject(first_arg),
        "scammers" => BotCommand::Scammers,
        other => {
            return ParseResult::UnrecognizedCommand {
                attempted: other.to_string(),
            }
        }
    };

    ParseResult::Command(command)
}

/// Capability check for administrator commands.
///
/// Call sites only ask whether a caller is authorized, so more than one
/// administrator can be supported by swapping the implementation.
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, caller: SubmitterId) -> bool;
}

/// The single fixed administrator identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleAdmin {
    pub admin_id: SubmitterId,
}

impl SingleAdmin {
    pub fn new(admin_id: SubmitterId) -> Self {
        Self { admin_id }
    }
}

impl Authorizer for SingleAdmin {
    fn is_authorized(&self, caller: SubmitterId) -> bool {
        caller == self.admin_id
    }
}
