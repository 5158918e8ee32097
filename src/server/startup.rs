use std::sync::Arc;

use serenity::http::Http;

use crate::server::{
    config::Config,
    discord::{
        directory::DiscordGuildDirectory,
        notifier::{DiscordNotifier, NotifierChannels},
        profile::HttpProfileLookup,
    },
    error::AppError,
    service::verification::RetryingLookup,
    state::AppState,
};

/// Connects to the database and runs pending migrations.
///
/// Establishes a connection pool using the connection string from configuration, then runs all
/// pending SeaORM migrations so the schema is up to date before any service touches it.
///
/// # Arguments
/// - `config` - Application configuration containing the database URL
///
/// # Returns
/// - `Ok(DatabaseConnection)` - Connected database with migrations applied
/// - `Err(Error)` - Failed to connect to database or run migrations
pub async fn connect_to_database(config: &Config) -> Result<sea_orm::DatabaseConnection, AppError> {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    let mut opt = ConnectOptions::new(&config.database_url);
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;

    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Builds the HTTP client used for the profile service.
pub fn setup_reqwest_client() -> Result<reqwest::Client, AppError> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(15))
        .build()?)
}

/// Discord REST client shared by the notifier and the guild directory.
pub fn setup_discord_http(config: &Config) -> Arc<Http> {
    Arc::new(Http::new(&config.discord_bot_token))
}

/// Wires the Discord and profile adapters into the shared state.
pub fn build_state(
    config: &Config,
    db: sea_orm::DatabaseConnection,
    discord_http: Arc<Http>,
    http_client: reqwest::Client,
) -> Result<AppState, AppError> {
    let notifier = DiscordNotifier::new(
        discord_http.clone(),
        NotifierChannels {
            guild_id: config.guild_id,
            ticket_category_id: config.ticket_category_id,
            log_channel_id: config.ticket_log_channel_id,
            leaderboard_channel_id: config.leaderboard_channel_id,
            helper_role_id: config.roles.helper,
        },
    );
    let directory = DiscordGuildDirectory::new(discord_http, config.guild_id);
    let lookup = RetryingLookup::new(HttpProfileLookup::new(
        http_client,
        config.profile_lookup_url.clone(),
    )?);

    Ok(AppState::new(
        db,
        Arc::new(notifier),
        Arc::new(directory),
        Arc::new(lookup),
        config.roles.clone(),
        config.policy.clone(),
        &config.home_guild_name,
    ))
}
