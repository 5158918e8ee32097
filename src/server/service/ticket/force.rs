use uuid::Uuid;

use crate::server::{
    error::{ticket::TicketError, AppError},
    model::ticket::TicketAction,
    service::confirmation::GateAction,
};

use super::TicketService;

impl<'a> TicketService<'a> {
    /// Opens a gate for an admin forcing a ticket closed by name.
    ///
    /// The gate is addressed to the admin, not the requester, and is opened whatever the
    /// number of claimers. Confirming it runs the usual settlement or cancellation.
    ///
    /// # Returns
    /// - `Ok(Uuid)` - Id of the pending gate
    /// - `Err(AppError::TicketErr(NotFound))` - No ticket with that name
    /// - `Err(AppError::TicketErr(AlreadyClosed | AlreadyLocked))` - Ticket left the open state
    /// - `Err(AppError::TicketErr(Unauthorized))` - Actor is not an admin
    pub async fn request_forced_close(
        &self,
        name: &str,
        admin_id: u64,
        action: GateAction,
    ) -> Result<Uuid, AppError> {
        if !self.is_admin(admin_id).await? {
            return Err(TicketError::Unauthorized.into());
        }

        let ticket = self.require(name.trim()).await?;
        let guarded = match action {
            GateAction::Complete => TicketAction::Complete,
            GateAction::Cancel => TicketAction::Cancel,
        };
        ticket.status.guard(guarded, &ticket.name)?;

        let gate_id = self
            .state
            .gates
            .open(
                &ticket.name,
                action,
                admin_id,
                self.state.policy.confirmation_timeout,
            )
            .await;

        tracing::info!(
            "Admin {} asked to force {:?} on {}, gate {}",
            admin_id,
            action,
            ticket.name,
            gate_id
        );

        Ok(gate_id)
    }
}
