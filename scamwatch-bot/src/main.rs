use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};

use scamwatch_bot::config::Config;
use scamwatch_bot::gateway::ChatId;
use scamwatch_bot::{
    get_bot_version, http, update_polling_loop, Bot, MessagingGateway, ReportRepository,
    SingleAdmin, SqliteRepository, TelegramClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting scamwatch bot {}", get_bot_version());

    let config = Config::from_env().context("Failed to load configuration from environment")?;

    let db_path = config.database_path();
    info!("Using report database: {}", db_path.display());
    let repository: Arc<dyn ReportRepository> = Arc::new(
        SqliteRepository::new(&db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?,
    );

    let gateway: Arc<dyn MessagingGateway> = Arc::new(TelegramClient::with_api_url(
        config.telegram_bot_token.clone(),
        config.telegram_api_url.clone(),
    ));

    let bot = Arc::new(Bot::new(
        gateway,
        repository.clone(),
        Arc::new(SingleAdmin::new(config.admin_user_id)),
        ChatId::from(config.admin_user_id),
    ));

    let app = http::router(repository);

    // Start the update polling loop
    let poll_timeout = config.poll_timeout;
    tokio::spawn(async move {
        update_polling_loop(bot, poll_timeout).await;
    });

    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    info!("Server listening on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
