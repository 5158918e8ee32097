use std::sync::Arc;

use serenity::{
    all::{
        ChannelId, ChannelType, CreateChannel, CreateMessage, EditMessage, GuildId, MessageId,
        PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId,
    },
    async_trait,
    http::{Http, HttpError},
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::server::{
    error::platform::PlatformError,
    model::{
        account::LeaderboardEntry,
        log::LogEvent,
        ticket::{ChannelSpec, MessageHandle, Ticket},
    },
    port::Notifier,
};

use super::panel;

/// Channels and roles the notifier posts to.
#[derive(Debug, Clone)]
pub struct NotifierChannels {
    pub guild_id: u64,
    pub ticket_category_id: u64,
    pub log_channel_id: u64,
    pub leaderboard_channel_id: u64,
    pub helper_role_id: u64,
}

/// `Notifier` backed by the Discord REST API.
pub struct DiscordNotifier {
    http: Arc<Http>,
    channels: NotifierChannels,
    /// Leaderboard message edited in place once posted.
    leaderboard_message: RwLock<Option<MessageId>>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>, channels: NotifierChannels) -> Self {
        Self {
            http,
            channels,
            leaderboard_message: RwLock::new(None),
        }
    }

    fn overwrites(&self, requester_id: u64) -> Vec<PermissionOverwrite> {
        let participant = Permissions::VIEW_CHANNEL
            | Permissions::SEND_MESSAGES
            | Permissions::READ_MESSAGE_HISTORY;

        vec![
            // The @everyone role shares the guild id.
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
                kind: PermissionOverwriteType::Role(RoleId::new(self.channels.guild_id)),
            },
            PermissionOverwrite {
                allow: participant,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Role(RoleId::new(self.channels.helper_role_id)),
            },
            PermissionOverwrite {
                allow: participant,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(UserId::new(requester_id)),
            },
        ]
    }
}

/// Whether a serenity error is a 404 from the API.
pub(crate) fn is_not_found(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 404
    )
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn create_ticket_channel(&self, spec: &ChannelSpec) -> Result<u64, PlatformError> {
        let channel = GuildId::new(self.channels.guild_id)
            .create_channel(
                &self.http,
                CreateChannel::new(&spec.name)
                    .kind(ChannelType::Text)
                    .category(ChannelId::new(self.channels.ticket_category_id))
                    .permissions(self.overwrites(spec.requester_id)),
            )
            .await?;

        Ok(channel.id.get())
    }

    async fn render_ticket_panel(&self, ticket: &Ticket) -> Result<MessageHandle, PlatformError> {
        let channel_id = ticket
            .channel_id
            .ok_or_else(|| PlatformError::Other(format!("{} has no channel", ticket.name)))?;

        let message = ChannelId::new(channel_id)
            .send_message(
                &self.http,
                CreateMessage::new()
                    .content(format!("<@{}>", ticket.requester_id))
                    .embed(panel::ticket_embed(ticket))
                    .components(panel::ticket_buttons(ticket)),
            )
            .await?;

        Ok(MessageHandle {
            channel_id,
            message_id: message.id.get(),
        })
    }

    async fn update_ticket_panel(
        &self,
        handle: MessageHandle,
        ticket: &Ticket,
    ) -> Result<(), PlatformError> {
        ChannelId::new(handle.channel_id)
            .edit_message(
                &self.http,
                MessageId::new(handle.message_id),
                EditMessage::new()
                    .embed(panel::ticket_embed(ticket))
                    .components(panel::ticket_buttons(ticket)),
            )
            .await?;

        Ok(())
    }

    async fn send_channel_message(
        &self,
        channel_id: u64,
        content: &str,
    ) -> Result<(), PlatformError> {
        ChannelId::new(channel_id).say(&self.http, content).await?;

        Ok(())
    }

    async fn delete_channel(&self, channel_id: u64) -> Result<(), PlatformError> {
        match ChannelId::new(channel_id).delete(&self.http).await {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn channel_exists(&self, channel_id: u64) -> Result<bool, PlatformError> {
        match self.http.get_channel(ChannelId::new(channel_id)).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn log_event(&self, event: LogEvent) -> Result<(), PlatformError> {
        ChannelId::new(self.channels.log_channel_id)
            .send_message(&self.http, CreateMessage::new().embed(panel::log_embed(&event)))
            .await?;

        Ok(())
    }

    async fn update_leaderboard(&self, entries: &[LeaderboardEntry]) -> Result<(), PlatformError> {
        let channel = ChannelId::new(self.channels.leaderboard_channel_id);
        let embed = panel::leaderboard_embed(entries);

        let mut message_id = self.leaderboard_message.write().await;
        if let Some(existing) = *message_id {
            match channel
                .edit_message(&self.http, existing, EditMessage::new().embed(embed.clone()))
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) => {
                    tracing::warn!("Leaderboard message could not be edited, reposting: {}", e);
                }
            }
        }

        let message = channel
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await?;
        *message_id = Some(message.id);

        Ok(())
    }

    async fn post_gate_prompt(
        &self,
        channel_id: u64,
        gate_id: Uuid,
        content: &str,
    ) -> Result<MessageHandle, PlatformError> {
        let message = ChannelId::new(channel_id)
            .send_message(
                &self.http,
                CreateMessage::new()
                    .content(content)
                    .components(panel::gate_buttons(gate_id, true)),
            )
            .await?;

        Ok(MessageHandle {
            channel_id,
            message_id: message.id.get(),
        })
    }

    async fn disable_gate_prompt(
        &self,
        handle: MessageHandle,
        gate_id: Uuid,
    ) -> Result<(), PlatformError> {
        match ChannelId::new(handle.channel_id)
            .edit_message(
                &self.http,
                MessageId::new(handle.message_id),
                EditMessage::new().components(panel::gate_buttons(gate_id, false)),
            )
            .await
        {
            Ok(_) => Ok(()),
            // The ticket channel may already be gone.
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
