//! Embeds and buttons rendered for tickets, log events and the leaderboard.

use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, Timestamp};
use uuid::Uuid;

use crate::server::{
    bot::action::{ComponentAction, TicketButton},
    model::{
        account::{LeaderboardEntry, PointsArchive},
        log::LogEvent,
        ticket::{PointChange, Ticket},
    },
};

const OPEN_COLOR: u32 = 0x3498db;
const COMPLETED_COLOR: u32 = 0x2ecc71;
const CANCELLED_COLOR: u32 = 0xe74c3c;
const CLOSED_COLOR: u32 = 0x95a5a6;
const LEDGER_COLOR: u32 = 0xf1c40f;
const VERIFIED_COLOR: u32 = 0x9b59b6;

fn mention_list(ids: &[u64]) -> String {
    if ids.is_empty() {
        return "None".to_string();
    }

    ids.iter()
        .map(|id| format!("<@{}>", id))
        .collect::<Vec<_>>()
        .join("\n")
}

fn delta_line(change: &PointChange) -> String {
    format!(
        "<@{}>: {} → {} ({:+})",
        change.user_id,
        change.before,
        change.after,
        change.after - change.before
    )
}

pub fn ticket_embed(ticket: &Ticket) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(format!("🎫 {}", ticket.name))
        .color(OPEN_COLOR)
        .field("Requester", format!("<@{}>", ticket.requester_id), true)
        .field("Type", ticket.ticket_type.label(), true)
        .field("In-game name", &ticket.username, true)
        .field("Server", &ticket.server, true)
        .field("Room", &ticket.room, true)
        .field("Points", ticket.points.to_string(), true)
        .field("Bosses", ticket.bosses.join("\n"), false)
        .field(
            format!("Helpers ({}/{})", ticket.claimers.len(), ticket.max_claimers),
            mention_list(&ticket.claimers),
            false,
        );

    if let Some(kills) = ticket.total_kills {
        embed = embed.field("Total kills", kills.to_string(), true);
    }

    if let Ok(created_at) = Timestamp::from_unix_timestamp(ticket.created_at.timestamp()) {
        embed = embed.timestamp(created_at);
    }

    embed
}

pub fn ticket_buttons(ticket: &Ticket) -> Vec<CreateActionRow> {
    let button = |kind: TicketButton, label: &str, style: ButtonStyle| {
        CreateButton::new(ComponentAction::ticket(kind, &ticket.name).custom_id())
            .label(label)
            .style(style)
    };

    vec![CreateActionRow::Buttons(vec![
        button(TicketButton::Claim, "Claim / Unclaim", ButtonStyle::Success),
        button(TicketButton::Complete, "Complete", ButtonStyle::Primary),
        button(TicketButton::PingHelpers, "Ping helpers", ButtonStyle::Secondary),
        button(TicketButton::Cancel, "Cancel", ButtonStyle::Danger),
    ])]
}

/// Confirm and decline buttons of a confirmation prompt. Retired prompts keep their buttons
/// greyed out.
pub fn gate_buttons(gate_id: Uuid, enabled: bool) -> Vec<CreateActionRow> {
    let button = |confirm: bool, label: &str, style: ButtonStyle| {
        CreateButton::new(ComponentAction::Gate { gate_id, confirm }.custom_id())
            .label(label)
            .style(style)
            .disabled(!enabled)
    };

    vec![CreateActionRow::Buttons(vec![
        button(true, "Confirm", ButtonStyle::Success),
        button(false, "Decline", ButtonStyle::Secondary),
    ])]
}

pub fn log_embed(event: &LogEvent) -> CreateEmbed {
    match event {
        LogEvent::TicketCompleted {
            ticket_name,
            settled_by,
            bosses,
            helpers,
            requester,
        } => {
            let helper_lines = if helpers.is_empty() {
                "None".to_string()
            } else {
                helpers.iter().map(delta_line).collect::<Vec<_>>().join("\n")
            };
            let mut requester_line = delta_line(&requester.change);
            if requester.credited < requester.attempted {
                requester_line.push_str(&format!(
                    " (weekly cap, {} of {})",
                    requester.credited, requester.attempted
                ));
            }

            CreateEmbed::new()
                .title(format!("✅ {} completed", ticket_name))
                .color(COMPLETED_COLOR)
                .field("Closed by", format!("<@{}>", settled_by), true)
                .field("Bosses", bosses.join(", "), false)
                .field("Helpers", helper_lines, false)
                .field("Requester", requester_line, false)
        }
        LogEvent::TicketCancelled {
            ticket_name,
            cancelled_by,
            claimers,
        } => CreateEmbed::new()
            .title(format!("🛑 {} cancelled", ticket_name))
            .color(CANCELLED_COLOR)
            .field("Cancelled by", format!("<@{}>", cancelled_by), true)
            .field("Claimers", mention_list(claimers), false),
        LogEvent::TicketAutoClosed {
            ticket_name,
            requester_id,
            orphaned,
        } => CreateEmbed::new()
            .title(format!("⌛ {} auto-closed", ticket_name))
            .color(CLOSED_COLOR)
            .field("Requester", format!("<@{}>", requester_id), true)
            .field(
                "Reason",
                if *orphaned {
                    "Channel was deleted"
                } else {
                    "Ticket expired"
                },
                true,
            ),
        LogEvent::PointsAdjusted {
            actor,
            delta,
            changes,
        } => CreateEmbed::new()
            .title(format!("📊 Points adjusted by {:+}", delta))
            .color(LEDGER_COLOR)
            .field("By", format!("<@{}>", actor), true)
            .field("Users", changes.len().to_string(), true)
            .description(truncate(
                &changes.iter().map(delta_line).collect::<Vec<_>>().join("\n"),
            )),
        LogEvent::PointsSet { actor, change } => CreateEmbed::new()
            .title("📊 Points set")
            .color(LEDGER_COLOR)
            .field("By", format!("<@{}>", actor), true)
            .description(delta_line(change)),
        LogEvent::PointsReset {
            actor,
            archive_id,
            users,
        } => CreateEmbed::new()
            .title("♻️ Points reset")
            .color(LEDGER_COLOR)
            .field("By", format!("<@{}>", actor), true)
            .field("Archive", archive_id, true)
            .field("Users", users.to_string(), true),
        LogEvent::Verified {
            discord_id,
            external_name,
            previous_names,
            guild,
        } => CreateEmbed::new()
            .title("🪪 Verified")
            .color(VERIFIED_COLOR)
            .field("User", format!("<@{}>", discord_id), true)
            .field("Character", external_name, true)
            .field("Guild", guild.as_deref().unwrap_or("None"), true)
            .field(
                "Previous names",
                if previous_names.is_empty() {
                    "None".to_string()
                } else {
                    previous_names.join(", ")
                },
                false,
            ),
    }
}

pub fn leaderboard_embed(entries: &[LeaderboardEntry]) -> CreateEmbed {
    let lines = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "**{}.** <@{}>: {} points ({} tickets)",
                i + 1,
                entry.discord_id,
                entry.points,
                entry.tickets_claimed
            )
        })
        .collect::<Vec<_>>();

    CreateEmbed::new()
        .title("🏆 Leaderboard")
        .color(LEDGER_COLOR)
        .description(if lines.is_empty() {
            "No points yet.".to_string()
        } else {
            lines.join("\n")
        })
        .timestamp(Timestamp::now())
}

pub fn archive_embed(archive: &PointsArchive) -> CreateEmbed {
    let lines = archive
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("**{}.** <@{}>: {}", i + 1, entry.discord_id, entry.points))
        .collect::<Vec<_>>();

    CreateEmbed::new()
        .title(format!("🗄️ Archive {}", archive.id))
        .color(LEDGER_COLOR)
        .description(if lines.is_empty() {
            "Nobody had points.".to_string()
        } else {
            truncate(&lines.join("\n"))
        })
        .field("Reset by", format!("<@{}>", archive.reset_by), true)
}

/// Embed descriptions are limited to 4096 characters.
fn truncate(text: &str) -> String {
    const LIMIT: usize = 4000;
    if text.chars().count() <= LIMIT {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(LIMIT).collect();
    cut.push_str("\n…");
    cut
}
