pub mod bot;
pub mod command;
pub mod config;
pub mod conversation;
pub mod gateway;
pub mod http;
pub mod messages;
pub mod relay;
pub mod report;
pub mod repository;
pub mod review;

pub use bot::{update_polling_loop, Bot};
pub use command::{Authorizer, SingleAdmin};
pub use gateway::{InMemoryGateway, MessagingGateway, TelegramClient};
pub use repository::{InMemoryRepository, ReportRepository, SqliteRepository};

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Package version, with the release build's git hash appended when known.
pub fn get_bot_version() -> String {
    match option_env!("SCAMWATCH_GIT_HASH") {
        Some(git_hash) if git_hash.len() >= 8 => {
            format!("{}+{}", built_info::PKG_VERSION, &git_hash[..8])
        }
        Some(git_hash) if !git_hash.is_empty() => {
            format!("{}+{}", built_info::PKG_VERSION, git_hash)
        }
        _ => built_info::PKG_VERSION.to_string(),
    }
}
