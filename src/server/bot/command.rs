//! Slash commands of the help desk.
//!
//! `commands` lists the definitions registered on the home guild at startup and
//! `handle_command` dispatches an invocation to the services. Staff commands check the admin
//! role here, before any service runs.

use chrono::{Duration, Utc};
use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
    CreateEmbed, CreateInteractionResponseFollowup, ResolvedOption, ResolvedValue,
};

use crate::server::{
    discord::panel,
    error::{ticket::TicketError, AppError},
    model::{
        account::AdjustTarget,
        boss_rule::AddBossParams,
        ticket::{CreateTicketParams, TicketType},
        verification::{RoleTier, VerificationOutcome},
    },
    service::{
        confirmation::GateAction,
        leaderboard::LeaderboardService,
        points::PointsService,
        rules::BossRuleService,
        ticket::{reward, TicketService},
        verification::VerificationService,
    },
    state::AppState,
};
use uuid::Uuid;

/// Tickets older than this are reported as stuck when no age is given.
const DEFAULT_STUCK_MINUTES: i64 = 10;

enum Reply {
    Text(String),
    Embed(CreateEmbed),
    /// Question with the confirm / decline buttons of a gate.
    Prompt { content: String, gate_id: Uuid },
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Command definitions registered on the home guild.
pub fn commands() -> Vec<CreateCommand> {
    let string = |name: &str, description: &str, required: bool| {
        CreateCommandOption::new(CommandOptionType::String, name, description).required(required)
    };
    let integer = |name: &str, description: &str, required: bool| {
        CreateCommandOption::new(CommandOptionType::Integer, name, description).required(required)
    };
    let user = |name: &str, description: &str, required: bool| {
        CreateCommandOption::new(CommandOptionType::User, name, description).required(required)
    };

    vec![
        CreateCommand::new("ticket")
            .description("Open a help ticket")
            .add_option(string("type", "Ticket type, e.g. spamming or 7-man bosses", true))
            .add_option(string("server", "Game server", true))
            .add_option(string("username", "Your in-game name", true))
            .add_option(string("bosses", "Comma separated boss list", false))
            .add_option(string("room", "Room number, defaults to the boss room", false))
            .add_option(integer("helpers", "Helpers needed (freeform types)", false))
            .add_option(
                integer("kills", "Total kills (spamming)", false)
                    .min_int_value(1)
                    .max_int_value(u64::from(reward::MAX_TOTAL_KILLS)),
            ),
        CreateCommand::new("verify")
            .description("Link your in-game character")
            .add_option(string("username", "Your in-game name", true)),
        CreateCommand::new("points")
            .description("Show points and rank")
            .add_option(user("user", "Defaults to yourself", false)),
        CreateCommand::new("leaderboard").description("Show the top helpers"),
        CreateCommand::new("points-set")
            .description("Set a user's points")
            .add_option(user("user", "User to update", true))
            .add_option(integer("points", "New balance", true)),
        CreateCommand::new("points-add")
            .description("Add or subtract points for users or a role")
            .add_option(integer("amount", "Points to add, negative to subtract", true))
            .add_option(string("users", "User mentions or ids", false))
            .add_option(
                CreateCommandOption::new(CommandOptionType::Role, "role", "Every holder of a role")
                    .required(false),
            ),
        CreateCommand::new("points-reset").description("Archive all points and reset to zero"),
        CreateCommand::new("points-archive")
            .description("Show a points archive, or list them")
            .add_option(string("id", "Archive id", false)),
        CreateCommand::new("remove-claimer")
            .description("Remove a helper from a ticket")
            .add_option(string("ticket", "Ticket name", true))
            .add_option(user("user", "Helper to remove", true)),
        CreateCommand::new("clear-ticket")
            .description("Clear a user's active ticket")
            .add_option(user("user", "User to free", true)),
        CreateCommand::new("cancel-ticket")
            .description("Force cancel a ticket with confirmation")
            .add_option(string("ticket", "Ticket name", true)),
        CreateCommand::new("complete-ticket")
            .description("Force complete a ticket with confirmation")
            .add_option(string("ticket", "Ticket name", true)),
        CreateCommand::new("force-verify")
            .description("Link a user to an in-game character")
            .add_option(user("user", "User to verify", true))
            .add_option(string("username", "Their in-game name", true)),
        CreateCommand::new("stuck-tickets")
            .description("List tickets stuck mid-settlement")
            .add_option(integer("minutes", "Minimum age", false)),
        CreateCommand::new("boss-add")
            .description("Add a boss to a ticket type")
            .add_option(string("type", "Ticket type", true))
            .add_option(string("boss", "Boss name", true))
            .add_option(integer("points", "Points per helper", true))
            .add_option(string("room", "Room number", false)),
        CreateCommand::new("boss-remove")
            .description("Remove a boss from a ticket type")
            .add_option(string("type", "Ticket type", true))
            .add_option(string("boss", "Boss name", true)),
        CreateCommand::new("boss-points")
            .description("Change the points of a boss")
            .add_option(string("boss", "Boss name", true))
            .add_option(integer("points", "Points per helper", true)),
        CreateCommand::new("bosses")
            .description("List the bosses of a ticket type")
            .add_option(string("type", "Ticket type", true)),
        CreateCommand::new("member-joined")
            .description("Mark a verified user as joined to the home guild")
            .add_option(user("user", "User who joined", true)),
        CreateCommand::new("guild-roster")
            .description("Verified users of an in-game guild")
            .add_option(string("guild", "Guild name", true)),
        CreateCommand::new("guild-counts").description("Verified users per in-game guild"),
    ]
}

pub async fn handle_command(state: &AppState, ctx: &Context, command: &CommandInteraction) {
    if let Err(e) = command.defer_ephemeral(&ctx.http).await {
        tracing::error!("Failed to defer command {}: {:?}", command.data.name, e);
        return;
    }

    let user_id = command.user.id.get();
    let options = Options(command.data.options());

    let reply = match run_command(state, &command.data.name, &options, user_id).await {
        Ok(reply) => reply,
        Err(e) => Reply::Text(e.user_message()),
    };

    let followup = match reply {
        Reply::Text(text) => CreateInteractionResponseFollowup::new().content(text),
        Reply::Embed(embed) => CreateInteractionResponseFollowup::new().embed(embed),
        Reply::Prompt { content, gate_id } => CreateInteractionResponseFollowup::new()
            .content(content)
            .components(panel::gate_buttons(gate_id, true)),
    };

    if let Err(e) = command
        .create_followup(&ctx.http, followup.ephemeral(true))
        .await
    {
        tracing::error!("Failed to reply to command {}: {:?}", command.data.name, e);
    }
}

async fn run_command(
    state: &AppState,
    name: &str,
    options: &Options<'_>,
    user_id: u64,
) -> Result<Reply, AppError> {
    match name {
        "ticket" => open_ticket(state, options, user_id).await,
        "verify" => verify(state, options, user_id).await,
        "points" => {
            let target = options.user("user").unwrap_or(user_id);
            let standing = PointsService::new(state).lookup(target).await?;
            Ok(format!(
                "<@{}> has {} points (rank #{})",
                target, standing.points, standing.rank
            )
            .into())
        }
        "leaderboard" => {
            let entries = LeaderboardService::new(state).refresh().await?;
            Ok(Reply::Embed(panel::leaderboard_embed(&entries)))
        }
        "remove-claimer" => {
            let ticket = TicketService::new(state)
                .remove_claimer(
                    options.required_str("ticket")?,
                    options.required_user("user")?,
                    user_id,
                )
                .await?;
            Ok(format!(
                "✅ Removed helper from {} ({}/{})",
                ticket.name,
                ticket.claimers.len(),
                ticket.max_claimers
            )
            .into())
        }
        "bosses" => {
            let ticket_type = options.required_str("type")?;
            let bosses = BossRuleService::new(state)
                .bosses_for_type(ticket_type)
                .await?;
            Ok(if bosses.is_empty() {
                format!("No bosses configured for {}", ticket_type)
            } else {
                format!("**{}**\n{}", ticket_type, bosses.join("\n"))
            }
            .into())
        }
        "guild-roster" => {
            let guild = options.required_str("guild")?;
            let roster = VerificationService::new(state).guild_roster(guild).await?;
            let lines = roster
                .iter()
                .map(|account| {
                    format!(
                        "<@{}>: {}",
                        account.discord_id,
                        account.external_name.as_deref().unwrap_or("?")
                    )
                })
                .collect::<Vec<_>>();
            Ok(Reply::Embed(
                CreateEmbed::new()
                    .title(format!("{} ({})", guild, roster.len()))
                    .description(if lines.is_empty() {
                        "Nobody verified in this guild.".to_string()
                    } else {
                        lines.join("\n")
                    }),
            ))
        }
        "guild-counts" => {
            let counts = VerificationService::new(state).guild_counts().await?;
            let lines = counts
                .iter()
                .map(|count| format!("{}: {}", count.guild, count.members))
                .collect::<Vec<_>>();
            Ok(Reply::Embed(
                CreateEmbed::new()
                    .title("Verified users per guild")
                    .description(if lines.is_empty() {
                        "No verified users.".to_string()
                    } else {
                        lines.join("\n")
                    }),
            ))
        }
        staff => {
            require_admin(state, user_id).await?;
            run_staff_command(state, staff, options, user_id).await
        }
    }
}

async fn run_staff_command(
    state: &AppState,
    name: &str,
    options: &Options<'_>,
    user_id: u64,
) -> Result<Reply, AppError> {
    let points = PointsService::new(state);

    match name {
        "points-set" => {
            let change = points
                .set_absolute(
                    user_id,
                    options.required_user("user")?,
                    options.required_int("points")?,
                )
                .await?;
            Ok(format!(
                "✅ <@{}>: {} → {}",
                change.user_id, change.before, change.after
            )
            .into())
        }
        "points-add" => {
            let target = match (options.str("users"), options.role("role")) {
                (Some(raw), _) => AdjustTarget::Users(parse_user_ids(raw)),
                (None, Some(role_id)) => AdjustTarget::Role(role_id),
                (None, None) => {
                    return Err(TicketError::InvalidInput(
                        "Give users or a role".to_string(),
                    )
                    .into())
                }
            };
            let changes = points
                .adjust_bulk(user_id, target, options.required_int("amount")?)
                .await?;
            Ok(format!("✅ Adjusted {} account(s)", changes.len()).into())
        }
        "points-reset" => {
            let archive = points.archive_and_reset_all(user_id).await?;
            Ok(format!(
                "✅ Archived {} account(s) as {} and reset points",
                archive.entries.len(),
                archive.id
            )
            .into())
        }
        "points-archive" => match options.str("id") {
            Some(id) => Ok(Reply::Embed(panel::archive_embed(
                &points.read_archive(id.trim()).await?,
            ))),
            None => {
                let ids = points.list_archives().await?;
                Ok(if ids.is_empty() {
                    "No archives yet".to_string()
                } else {
                    ids.join("\n")
                }
                .into())
            }
        },
        "clear-ticket" => {
            let target = options.required_user("user")?;
            Ok(if points.clear_active_ticket(target, None).await? {
                format!("✅ <@{}> is free to take tickets again", target)
            } else {
                format!("<@{}> had no active ticket", target)
            }
            .into())
        }
        "cancel-ticket" => force_close(state, options, user_id, GateAction::Cancel).await,
        "complete-ticket" => force_close(state, options, user_id, GateAction::Complete).await,
        "force-verify" => {
            let target = options.required_user("user")?;
            let outcome = VerificationService::new(state)
                .force_verify(user_id, target, options.required_str("username")?)
                .await?;
            Ok(match outcome {
                VerificationOutcome::Verified {
                    external_name,
                    guild,
                    ..
                } => format!(
                    "✅ <@{}> verified as {} ({})",
                    target,
                    external_name,
                    guild.as_deref().unwrap_or("no guild")
                ),
                VerificationOutcome::NotFound { .. } => {
                    "❌ No character with that name was found".to_string()
                }
            }
            .into())
        }
        "stuck-tickets" => {
            let minutes = options.int("minutes").unwrap_or(DEFAULT_STUCK_MINUTES);
            let stuck = TicketService::new(state)
                .list_stuck(Utc::now() - Duration::minutes(minutes))
                .await?;
            Ok(if stuck.is_empty() {
                "No stuck tickets".to_string()
            } else {
                stuck
                    .iter()
                    .map(|ticket| format!("{} (requested by <@{}>)", ticket.name, ticket.requester_id))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            .into())
        }
        "boss-add" => {
            let rule = BossRuleService::new(state)
                .add_boss(AddBossParams {
                    ticket_type: options.required_str("type")?.to_string(),
                    boss: options.required_str("boss")?.to_string(),
                    points: options.required_int("points")?,
                    room: options.str("room").unwrap_or_default().trim().to_string(),
                })
                .await?;
            Ok(format!("✅ {} is worth {} point(s)", rule.name, rule.points).into())
        }
        "boss-remove" => {
            let boss = options.required_str("boss")?;
            let removed = BossRuleService::new(state)
                .remove_boss(options.required_str("type")?, boss)
                .await?;
            Ok(if removed {
                format!("✅ Removed {}", boss)
            } else {
                format!("{} was not offered on that type", boss)
            }
            .into())
        }
        "boss-points" => {
            let boss = options.required_str("boss")?;
            let value = options.required_int("points")?;
            BossRuleService::new(state)
                .set_boss_points(boss, value)
                .await?;
            Ok(format!("✅ {} is now worth {} point(s)", boss, value).into())
        }
        "member-joined" => {
            let target = options.required_user("user")?;
            VerificationService::new(state)
                .member_joined_home_guild(target)
                .await;
            Ok(format!("✅ <@{}> now has the member role", target).into())
        }
        other => {
            tracing::warn!("Unknown command {}", other);
            Ok("Unknown command".to_string().into())
        }
    }
}

async fn force_close(
    state: &AppState,
    options: &Options<'_>,
    user_id: u64,
    action: GateAction,
) -> Result<Reply, AppError> {
    let name = options.required_str("ticket")?;
    let gate_id = TicketService::new(state)
        .request_forced_close(name, user_id, action)
        .await?;

    Ok(Reply::Prompt {
        content: force_question(name.trim(), action),
        gate_id,
    })
}

fn force_question(ticket_name: &str, action: GateAction) -> String {
    let verb = match action {
        GateAction::Complete => "complete",
        GateAction::Cancel => "cancel",
    };
    format!("⚠️ Are you sure you want to {} ticket **{}**?", verb, ticket_name)
}

async fn open_ticket(
    state: &AppState,
    options: &Options<'_>,
    user_id: u64,
) -> Result<Reply, AppError> {
    let bosses = options.str("bosses").map(split_list).unwrap_or_default();

    let room = match options.str("room") {
        Some(room) => room.to_string(),
        None => {
            let first = bosses.first().ok_or_else(|| {
                TicketError::InvalidInput("Select at least one boss".to_string())
            })?;
            BossRuleService::new(state)
                .room_for(first)
                .await?
                .ok_or_else(|| TicketError::InvalidInput("Room is required".to_string()))?
        }
    };

    let ticket = TicketService::new(state)
        .create(CreateTicketParams {
            requester_id: user_id,
            ticket_type: TicketType::parse(options.required_str("type")?),
            server: options.required_str("server")?.to_string(),
            room,
            username: options.required_str("username")?.to_string(),
            bosses,
            max_claimers: options.count("helpers")?,
            total_kills: options.count("kills")?,
        })
        .await?;

    Ok(match ticket.channel_id {
        Some(channel_id) => format!("✅ Opened {} in <#{}>", ticket.name, channel_id),
        None => format!("✅ Opened {}", ticket.name),
    }
    .into())
}

async fn verify(state: &AppState, options: &Options<'_>, user_id: u64) -> Result<Reply, AppError> {
    let outcome = VerificationService::new(state)
        .verify(user_id, options.required_str("username")?)
        .await?;

    Ok(match outcome {
        VerificationOutcome::Verified {
            external_name,
            guild,
            tier,
        } => format!(
            "✅ Verified as {} ({}), {}",
            external_name,
            guild.as_deref().unwrap_or("no guild"),
            tier_label(tier)
        ),
        VerificationOutcome::NotFound { tier } => format!(
            "❌ No character with that name was found, {}",
            tier_label(tier)
        ),
    }
    .into())
}

fn tier_label(tier: RoleTier) -> &'static str {
    match tier {
        RoleTier::Member => "welcome home",
        RoleTier::Outsider => "you have the guest role",
        RoleTier::Stranger => "you have the unverified role",
    }
}

async fn require_admin(state: &AppState, user_id: u64) -> Result<(), AppError> {
    if state.directory.has_role(user_id, state.roles.admin).await? {
        Ok(())
    } else {
        Err(TicketError::Unauthorized.into())
    }
}

/// Splits a comma separated list, dropping blank entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads user ids out of mentions (`<@1>`, `<@!1>`) or bare ids, skipping anything else.
fn parse_user_ids(raw: &str) -> Vec<u64> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter_map(|token| {
            token
                .trim_start_matches("<@")
                .trim_start_matches('!')
                .trim_end_matches('>')
                .parse::<u64>()
                .ok()
        })
        .collect()
}

struct Options<'a>(Vec<ResolvedOption<'a>>);

impl<'a> Options<'a> {
    fn value(&self, name: &str) -> Option<&ResolvedValue<'a>> {
        self.0
            .iter()
            .find(|option| option.name == name)
            .map(|option| &option.value)
    }

    fn str(&self, name: &str) -> Option<&'a str> {
        match self.value(name)? {
            ResolvedValue::String(value) => Some(*value),
            _ => None,
        }
    }

    fn int(&self, name: &str) -> Option<i64> {
        match self.value(name)? {
            ResolvedValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    fn user(&self, name: &str) -> Option<u64> {
        match self.value(name)? {
            ResolvedValue::User(user, _) => Some(user.id.get()),
            _ => None,
        }
    }

    fn role(&self, name: &str) -> Option<u64> {
        match self.value(name)? {
            ResolvedValue::Role(role) => Some(role.id.get()),
            _ => None,
        }
    }

    /// Optional non-negative integer narrowed to `u32`.
    fn count(&self, name: &str) -> Result<Option<u32>, TicketError> {
        self.int(name)
            .map(|value| {
                u32::try_from(value)
                    .map_err(|_| TicketError::InvalidInput(format!("{} must not be negative", name)))
            })
            .transpose()
    }

    fn required_str(&self, name: &str) -> Result<&'a str, TicketError> {
        self.str(name).ok_or_else(|| missing(name))
    }

    fn required_int(&self, name: &str) -> Result<i64, TicketError> {
        self.int(name).ok_or_else(|| missing(name))
    }

    fn required_user(&self, name: &str) -> Result<u64, TicketError> {
        self.user(name).ok_or_else(|| missing(name))
    }
}

fn missing(name: &str) -> TicketError {
    TicketError::InvalidInput(format!("Missing option {}", name))
}
