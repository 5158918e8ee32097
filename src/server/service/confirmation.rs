//! Single-use confirmation gates for completing or cancelling a ticket.
//!
//! A gate is opened when completion is requested with free helper slots, or when the cancel
//! button is pressed. It lives in memory only and expires after the configured timeout. No
//! lock is held while a gate waits; a spawned timer flips the gate to `Expired` and greys out
//! its prompt, and an expired gate is also detected lazily when someone answers it.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{sync::RwLock, time::Instant};
use uuid::Uuid;

use crate::server::{
    error::{gate::GateError, AppError},
    model::ticket::{MessageHandle, SettlementReceipt},
    port::Notifier,
    service::ticket::TicketService,
    state::AppState,
};

/// Terminal action a gate guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    Complete,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Pending,
    Confirmed,
    Declined,
    Expired,
}

#[derive(Debug, Clone)]
pub struct Gate {
    pub id: Uuid,
    pub ticket_name: String,
    pub action: GateAction,
    pub requester_id: u64,
    pub state: GateState,
    /// Posted confirm / decline prompt, once there is one.
    pub prompt: Option<MessageHandle>,
    expires_at: Instant,
}

impl Gate {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Shared registry of open gates.
#[derive(Clone)]
pub struct ConfirmationGates {
    gates: Arc<RwLock<HashMap<Uuid, Gate>>>,
    /// Retires prompts of gates that expire unanswered.
    notifier: Arc<dyn Notifier>,
}

impl ConfirmationGates {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gates: Arc::default(),
            notifier,
        }
    }

    /// Opens a pending gate that expires after `timeout`.
    pub async fn open(
        &self,
        ticket_name: &str,
        action: GateAction,
        requester_id: u64,
        timeout: Duration,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let gate = Gate {
            id,
            ticket_name: ticket_name.to_string(),
            action,
            requester_id,
            state: GateState::Pending,
            prompt: None,
            expires_at: Instant::now() + timeout,
        };
        self.gates.write().await.insert(id, gate);

        let gates = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            gates.expire(id).await;
        });

        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Gate> {
        self.gates.read().await.get(&id).cloned()
    }

    /// Records where the prompt of a gate was posted.
    ///
    /// Returns false when the gate is no longer pending, in which case the caller retires the
    /// prompt itself.
    pub async fn attach_prompt(&self, id: Uuid, handle: MessageHandle) -> bool {
        let mut gates = self.gates.write().await;
        match gates.get_mut(&id) {
            Some(gate) => {
                gate.prompt = Some(handle);
                gate.state == GateState::Pending && !gate.is_expired()
            }
            None => false,
        }
    }

    /// Flips an unanswered gate to `Expired` and greys out its prompt.
    ///
    /// Gates already flipped lazily by `resolve` still get their prompt retired here.
    async fn expire(&self, id: Uuid) {
        let prompt = {
            let mut gates = self.gates.write().await;
            match gates.get_mut(&id) {
                Some(gate) if matches!(gate.state, GateState::Pending | GateState::Expired) => {
                    gate.state = GateState::Expired;
                    tracing::debug!("Confirmation {} for {} expired", id, gate.ticket_name);
                    gate.prompt
                }
                _ => None,
            }
        };

        if let Some(handle) = prompt {
            if let Err(e) = self.notifier.disable_gate_prompt(handle, id).await {
                tracing::warn!("Failed to disable expired confirmation {}: {}", id, e);
            }
        }
    }

    /// Resolves a gate once.
    ///
    /// `permitted` is decided by the caller for responders other than the requester. A refused
    /// responder leaves the gate pending for the right person.
    ///
    /// # Returns
    /// - `Ok(Gate)` - Gate in its new `Confirmed` or `Declined` state
    /// - `Err(GateError::NotPermitted)` - Responder may not answer, gate untouched
    /// - `Err(GateError::Expired)` - Timeout passed before the answer
    /// - `Err(GateError::AlreadyResolved)` - Gate was answered before
    pub async fn resolve(
        &self,
        id: Uuid,
        responder_id: u64,
        permitted: bool,
        confirm: bool,
    ) -> Result<Gate, GateError> {
        let mut gates = self.gates.write().await;
        let gate = gates.get_mut(&id).ok_or(GateError::NotFound)?;

        match gate.state {
            GateState::Pending => {}
            GateState::Expired => return Err(GateError::Expired),
            GateState::Confirmed | GateState::Declined => return Err(GateError::AlreadyResolved),
        }

        if gate.is_expired() {
            gate.state = GateState::Expired;
            return Err(GateError::Expired);
        }

        if responder_id != gate.requester_id && !permitted {
            return Err(GateError::NotPermitted);
        }

        gate.state = if confirm {
            GateState::Confirmed
        } else {
            GateState::Declined
        };

        Ok(gate.clone())
    }

    /// Drops gates that are no longer pending.
    ///
    /// Pending gates past their deadline are kept for their timer, which retires the prompt.
    pub async fn prune(&self) -> usize {
        let mut gates = self.gates.write().await;
        let before = gates.len();
        gates.retain(|_, gate| gate.state == GateState::Pending);

        before - gates.len()
    }
}

/// What happened after a gate was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateResolution {
    Settled(SettlementReceipt),
    Cancelled,
    Declined,
}

/// Answers gates and runs the guarded action.
pub struct ConfirmationService<'a> {
    state: &'a AppState,
}

impl<'a> ConfirmationService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Applies a responder's answer to a gate.
    ///
    /// Confirming a completion settles the ticket, confirming a cancel cancels it. Declining
    /// only resolves the gate.
    pub async fn respond(
        &self,
        gate_id: Uuid,
        responder_id: u64,
        confirm: bool,
    ) -> Result<GateResolution, AppError> {
        let gate = self
            .state
            .gates
            .get(gate_id)
            .await
            .ok_or(GateError::NotFound)?;

        let permitted = responder_id == gate.requester_id
            || self.is_staff(responder_id, gate.action).await?;

        let gate = self
            .state
            .gates
            .resolve(gate_id, responder_id, permitted, confirm)
            .await?;

        if !confirm {
            tracing::debug!("Confirmation {} for {} declined", gate.id, gate.ticket_name);
            return Ok(GateResolution::Declined);
        }

        let tickets = TicketService::new(self.state);
        match gate.action {
            GateAction::Complete => Ok(GateResolution::Settled(
                tickets.settle(&gate.ticket_name, responder_id).await?,
            )),
            GateAction::Cancel => {
                tickets.cancel(&gate.ticket_name, responder_id).await?;
                Ok(GateResolution::Cancelled)
            }
        }
    }

    /// Posts the prompt of a freshly opened gate in the ticket channel, addressed to the
    /// requester.
    ///
    /// # Returns
    /// - `Ok(())` - Prompt posted and attached to the gate
    /// - `Err(AppError::GateErr(NotFound))` - Gate was pruned
    /// - `Err(AppError::PlatformErr)` - Prompt could not be posted
    pub async fn post_prompt(&self, gate_id: Uuid, channel_id: u64) -> Result<(), AppError> {
        let gate = self
            .state
            .gates
            .get(gate_id)
            .await
            .ok_or(GateError::NotFound)?;
        let question = match gate.action {
            GateAction::Complete => "Not every helper slot is filled. Complete the ticket anyway?",
            GateAction::Cancel => "Cancel this ticket? Nobody will receive points.",
        };
        let content = format!(
            "<@{}> {} (expires in {}s)",
            gate.requester_id,
            question,
            self.state.policy.confirmation_timeout.as_secs()
        );

        let notifier = &self.state.notifier;
        let handle = notifier.post_gate_prompt(channel_id, gate_id, &content).await?;
        if !self.state.gates.attach_prompt(gate_id, handle).await {
            notifier.disable_gate_prompt(handle, gate_id).await?;
        }

        Ok(())
    }

    /// Greys out the prompt of an answered gate. Failures are logged.
    pub async fn retire_prompt(&self, gate_id: Uuid) {
        let Some(handle) = self
            .state
            .gates
            .get(gate_id)
            .await
            .and_then(|gate| gate.prompt)
        else {
            return;
        };

        if let Err(e) = self
            .state
            .notifier
            .disable_gate_prompt(handle, gate_id)
            .await
        {
            tracing::warn!("Failed to disable confirmation {}: {}", gate_id, e);
        }
    }

    /// Admins may answer any gate, senior helpers only completions.
    async fn is_staff(&self, user_id: u64, action: GateAction) -> Result<bool, AppError> {
        let directory = &self.state.directory;
        if directory.has_role(user_id, self.state.roles.admin).await? {
            return Ok(true);
        }

        Ok(action == GateAction::Complete
            && directory
                .has_role(user_id, self.state.roles.senior_helper)
                .await?)
    }
}
