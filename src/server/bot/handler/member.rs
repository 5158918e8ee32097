use serenity::all::{Context, Member};

use crate::server::{
    data::user_account::UserAccountRepository,
    model::verification::{RoleTier, VerificationStatus},
    service::verification::{tier_for_guild, VerificationService},
    state::AppState,
};

/// Handles the guild_member_addition event when a member joins the home guild.
///
/// Members without a verified account receive the stranger role. Returning members that
/// verified before get the tier of their stored guild back.
pub async fn handle_guild_member_addition(state: &AppState, _ctx: Context, new_member: Member) {
    let discord_id = new_member.user.id.get();

    let account = match UserAccountRepository::new(&state.db).find(discord_id).await {
        Ok(account) => account,
        Err(e) => {
            tracing::error!("Failed to query account of new member: {:?}", e);
            return;
        }
    };

    let tier = match account {
        Some(account) if account.verification_status == VerificationStatus::Verified => {
            tier_for_guild(account.external_guild.as_deref(), &state.home_guild_name)
        }
        _ => RoleTier::Stranger,
    };

    tracing::info!("{} joined the guild, assigning {:?}", discord_id, tier);

    VerificationService::new(state)
        .sync_roles(discord_id, tier)
        .await;
}
