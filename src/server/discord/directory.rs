use std::sync::Arc;

use serenity::{
    all::{GuildId, RoleId, UserId},
    async_trait,
    http::Http,
};

use crate::server::{error::platform::PlatformError, port::GuildDirectory};

use super::notifier::is_not_found;

/// Discord allows at most this many members per page.
const MEMBER_PAGE_SIZE: u64 = 1000;

/// `GuildDirectory` over the home guild, using the Discord REST API.
pub struct DiscordGuildDirectory {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl DiscordGuildDirectory {
    pub fn new(http: Arc<Http>, guild_id: u64) -> Self {
        Self {
            http,
            guild_id: GuildId::new(guild_id),
        }
    }
}

#[async_trait]
impl GuildDirectory for DiscordGuildDirectory {
    async fn has_role(&self, user_id: u64, role_id: u64) -> Result<bool, PlatformError> {
        match self.http.get_member(self.guild_id, UserId::new(user_id)).await {
            Ok(member) => Ok(member.roles.contains(&RoleId::new(role_id))),
            // Users that left the guild hold no roles.
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn role_members(&self, role_id: u64) -> Result<Vec<u64>, PlatformError> {
        let role_id = RoleId::new(role_id);
        let mut holders = Vec::new();
        let mut after = None;

        loop {
            let page = self
                .http
                .get_guild_members(self.guild_id, Some(MEMBER_PAGE_SIZE), after)
                .await?;
            let Some(last) = page.last() else {
                break;
            };
            after = Some(last.user.id.get());
            let full = page.len() as u64 == MEMBER_PAGE_SIZE;

            holders.extend(
                page.iter()
                    .filter(|member| member.roles.contains(&role_id))
                    .map(|member| member.user.id.get()),
            );

            if !full {
                break;
            }
        }

        Ok(holders)
    }

    async fn add_role(&self, user_id: u64, role_id: u64) -> Result<(), PlatformError> {
        self.http
            .add_member_role(
                self.guild_id,
                UserId::new(user_id),
                RoleId::new(role_id),
                Some("Verification tier"),
            )
            .await?;

        Ok(())
    }

    async fn remove_role(&self, user_id: u64, role_id: u64) -> Result<(), PlatformError> {
        self.http
            .remove_member_role(
                self.guild_id,
                UserId::new(user_id),
                RoleId::new(role_id),
                Some("Verification tier"),
            )
            .await?;

        Ok(())
    }
}
