use std::error::Error;
use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing_log::LogTracer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;
use triviabot::commands::Command;
use triviabot::config::Config;
use triviabot::database::{connection::Connection, memory::MemoryStorage};
use triviabot::schema;

fn init_tracing(log_level: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(log_level)?)
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    LogTracer::init()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::from_env()?;
    init_tracing(&config.log_level)?;
    log::info!("Starting bot with {:?}", config);

    let bot = Bot::new(&config.token);
    bot.set_my_commands(Command::bot_commands()).await?;

    match &config.database_url {
        Some(database_url) => {
            let connection = Arc::new(Connection::connect(database_url).await?);
            connection.run_migrations().await?;
            schema::run(bot, config.webhook, Arc::clone(&connection), connection).await?;
        }
        None => {
            log::warn!("DATABASE_URL is not set, serving built-in questions from memory");
            let storage = Arc::new(MemoryStorage::with_fixtures());
            schema::run(bot, config.webhook, Arc::clone(&storage), storage).await?;
        }
    }

    Ok(())
}
