//! Component actions and their custom ids.
//!
//! Every button the bot renders carries a custom id of the form `ticket:<button>:<name>` or
//! `gate:<confirm|decline>:<uuid>`. Incoming component interactions are parsed back into a
//! `ComponentAction` and dispatched by `handler::interaction`.

use uuid::Uuid;

const TICKET_PREFIX: &str = "ticket";
const GATE_PREFIX: &str = "gate";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketButton {
    /// Claims a slot, or releases it for a current claimer.
    Claim,
    Complete,
    PingHelpers,
    Cancel,
}

impl TicketButton {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Claim => "claim",
            Self::Complete => "complete",
            Self::PingHelpers => "ping",
            Self::Cancel => "cancel",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "claim" => Some(Self::Claim),
            "complete" => Some(Self::Complete),
            "ping" => Some(Self::PingHelpers),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentAction {
    Ticket {
        button: TicketButton,
        ticket_name: String,
    },
    Gate {
        gate_id: Uuid,
        confirm: bool,
    },
}

impl ComponentAction {
    pub fn ticket(button: TicketButton, ticket_name: &str) -> Self {
        Self::Ticket {
            button,
            ticket_name: ticket_name.to_string(),
        }
    }

    pub fn custom_id(&self) -> String {
        match self {
            Self::Ticket {
                button,
                ticket_name,
            } => format!("{}:{}:{}", TICKET_PREFIX, button.as_str(), ticket_name),
            Self::Gate { gate_id, confirm } => format!(
                "{}:{}:{}",
                GATE_PREFIX,
                if *confirm { "confirm" } else { "decline" },
                gate_id
            ),
        }
    }

    pub fn parse(custom_id: &str) -> Option<Self> {
        let mut parts = custom_id.splitn(3, ':');
        let kind = parts.next()?;
        let verb = parts.next()?;
        let subject = parts.next()?;

        match kind {
            TICKET_PREFIX => Some(Self::Ticket {
                button: TicketButton::parse(verb)?,
                ticket_name: subject.to_string(),
            }),
            GATE_PREFIX => {
                let confirm = match verb {
                    "confirm" => true,
                    "decline" => false,
                    _ => return None,
                };
                Some(Self::Gate {
                    gate_id: Uuid::parse_str(subject).ok()?,
                    confirm,
                })
            }
            _ => None,
        }
    }
}
