//! Ready event handler for bot initialization.
//!
//! Fired once per gateway connection. Registers the slash commands on the home guild and
//! re-attaches the interactive panels of tickets that were open when the bot went down.

use serenity::all::{ActivityData, Context, GuildId, Ready};

use crate::server::{bot::command, service::ticket::TicketService, state::AppState};

/// Handles the ready event when the bot connects to Discord.
///
/// Failures are logged; the bot keeps running with whatever succeeded.
///
/// # Arguments
/// - `state` - Shared application state
/// - `guild_id` - Home guild the commands are registered on
/// - `ctx` - Discord context for setting activity status and registering commands
/// - `ready` - Ready event data containing bot user information
pub async fn handle_ready(state: &AppState, guild_id: u64, ctx: Context, ready: Ready) {
    tracing::info!("{} is connected to Discord", ready.user.name);

    ctx.set_activity(Some(ActivityData::watching("help tickets")));

    match GuildId::new(guild_id)
        .set_commands(&ctx.http, command::commands())
        .await
    {
        Ok(registered) => tracing::info!("Registered {} guild commands", registered.len()),
        Err(e) => tracing::error!("Failed to register guild commands: {:?}", e),
    }

    match TicketService::new(state).restore_open_tickets().await {
        Ok(restored) => tracing::info!("Restored {} open tickets", restored),
        Err(e) => tracing::error!("Failed to restore open tickets: {:?}", e),
    }
}
