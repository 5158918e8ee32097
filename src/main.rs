mod server;

use tracing_subscriber::EnvFilter;

use crate::server::{
    bot, config::Config, error::AppError, scheduler::expiry::ExpiryScheduler, startup,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let db = startup::connect_to_database(&config).await?;
    let http_client = startup::setup_reqwest_client()?;
    let discord_http = startup::setup_discord_http(&config);
    let state = startup::build_state(&config, db, discord_http, http_client)?;

    tracing::info!("Starting help desk");

    let bot_client = bot::start::init_bot(&config, state.clone()).await?;
    let shard_manager = bot_client.shard_manager.clone();

    // Start Discord bot in a separate task
    tokio::spawn(async move {
        if let Err(e) = bot::start::start_bot(bot_client).await {
            tracing::error!("Discord bot error: {}", e);
        }
    });

    let scheduler = ExpiryScheduler::start(state).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }

    tracing::info!("Shutting down");
    scheduler.shutdown().await?;
    shard_manager.shutdown_all().await;

    Ok(())
}
