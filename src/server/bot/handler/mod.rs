use serenity::all::{Context, EventHandler, Interaction, Member, Ready};
use serenity::async_trait;

use crate::server::state::AppState;

pub mod interaction;
pub mod member;
pub mod ready;

/// Discord bot event handler
pub struct Handler {
    pub state: AppState,
    /// Home Discord guild. Events from other guilds are ignored.
    pub guild_id: u64,
}

impl Handler {
    pub fn new(state: AppState, guild_id: u64) -> Self {
        Self { state, guild_id }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: Context, ready: Ready) {
        ready::handle_ready(&self.state, self.guild_id, ctx, ready).await;
    }

    /// Called for slash commands and button clicks
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        interaction::handle_interaction(&self.state, ctx, interaction).await;
    }

    /// Called when a member joins a guild
    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        if new_member.guild_id.get() != self.guild_id {
            return;
        }
        member::handle_guild_member_addition(&self.state, ctx, new_member).await;
    }
}
