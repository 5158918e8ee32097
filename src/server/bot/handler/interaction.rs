//! Interaction handler for slash commands and buttons.
//!
//! Every interaction is deferred ephemerally first so slow service calls do not hit Discord's
//! three second response window. The outcome, or the user-facing text of the error, is sent
//! back as an ephemeral followup.

use serenity::all::{ComponentInteraction, Context, CreateInteractionResponseFollowup, Interaction};

use crate::server::{
    bot::{
        action::{ComponentAction, TicketButton},
        command,
    },
    error::{gate::GateError, AppError},
    model::ticket::{ClaimResult, CompletionOutcome, SettlementReceipt},
    service::{
        confirmation::{ConfirmationService, GateResolution},
        ticket::TicketService,
    },
    state::AppState,
};

pub async fn handle_interaction(state: &AppState, ctx: Context, interaction: Interaction) {
    match interaction {
        Interaction::Command(command) => command::handle_command(state, &ctx, &command).await,
        Interaction::Component(component) => handle_component(state, &ctx, &component).await,
        _ => {}
    }
}

async fn handle_component(state: &AppState, ctx: &Context, component: &ComponentInteraction) {
    let Some(action) = ComponentAction::parse(&component.data.custom_id) else {
        tracing::warn!("Unknown component id {}", component.data.custom_id);
        return;
    };

    if let Err(e) = component.defer_ephemeral(&ctx.http).await {
        tracing::error!("Failed to defer component interaction: {:?}", e);
        return;
    }

    let user_id = component.user.id.get();
    let reply = match run_component(state, component, action, user_id).await {
        Ok(reply) => reply,
        Err(e) => {
            if e.is_idempotency_guard() {
                tracing::debug!("{} hit a resolved action: {}", user_id, e);
            }
            e.user_message()
        }
    };

    if let Err(e) = component
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new()
                .content(reply)
                .ephemeral(true),
        )
        .await
    {
        tracing::error!("Failed to reply to component interaction: {:?}", e);
    }
}

async fn run_component(
    state: &AppState,
    component: &ComponentInteraction,
    action: ComponentAction,
    user_id: u64,
) -> Result<String, AppError> {
    let tickets = TicketService::new(state);

    match action {
        ComponentAction::Ticket {
            button: TicketButton::Claim,
            ticket_name,
        } => Ok(match tickets.claim(&ticket_name, user_id).await? {
            ClaimResult::Claimed {
                claimers,
                max_claimers,
            } => format!(
                "✅ You claimed {} ({}/{})",
                ticket_name, claimers, max_claimers
            ),
            ClaimResult::Unclaimed {
                claimers,
                max_claimers,
            } => format!(
                "↩️ You left {} ({}/{})",
                ticket_name, claimers, max_claimers
            ),
        }),
        ComponentAction::Ticket {
            button: TicketButton::Complete,
            ticket_name,
        } => match tickets.request_completion(&ticket_name, user_id).await? {
            CompletionOutcome::Settled(receipt) => Ok(settled_reply(&receipt)),
            CompletionOutcome::ConfirmationRequired { gate_id } => {
                ConfirmationService::new(state)
                    .post_prompt(gate_id, component.channel_id.get())
                    .await?;
                Ok("⏳ Not every slot is filled, waiting for confirmation".to_string())
            }
        },
        ComponentAction::Ticket {
            button: TicketButton::PingHelpers,
            ticket_name,
        } => {
            tickets.ping_helpers(&ticket_name, user_id).await?;
            Ok("🔔 Helpers were pinged".to_string())
        }
        ComponentAction::Ticket {
            button: TicketButton::Cancel,
            ticket_name,
        } => {
            let gate_id = tickets.request_cancellation(&ticket_name, user_id).await?;
            ConfirmationService::new(state)
                .post_prompt(gate_id, component.channel_id.get())
                .await?;
            Ok("⏳ Waiting for confirmation".to_string())
        }
        ComponentAction::Gate { gate_id, confirm } => {
            let confirmations = ConfirmationService::new(state);
            let resolution = confirmations.respond(gate_id, user_id, confirm).await;

            // Any answer that reached the gate retires the prompt buttons.
            if !matches!(
                resolution,
                Err(AppError::GateErr(GateError::NotPermitted))
            ) {
                confirmations.retire_prompt(gate_id).await;
            }

            Ok(match resolution? {
                GateResolution::Settled(receipt) => settled_reply(&receipt),
                GateResolution::Cancelled => "🗑️ Ticket cancelled".to_string(),
                GateResolution::Declined => "👍 Nothing was changed".to_string(),
            })
        }
    }
}

fn settled_reply(receipt: &SettlementReceipt) -> String {
    format!(
        "✅ {} completed, {} helper(s) credited",
        receipt.ticket_name,
        receipt.helpers.len()
    )
}
