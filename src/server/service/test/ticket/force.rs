use super::*;
use crate::server::{
    error::gate::GateError,
    service::confirmation::{ConfirmationService, GateAction, GateResolution},
};

/// Tests an admin forcing completion of a partially claimed ticket.
///
/// Verifies that the gate is addressed to the admin and that confirming it settles the
/// ticket in the admin's name.
///
/// Expected: Ok(Settled), ticket completed by the admin, claimer credited
#[tokio::test]
async fn admin_forces_completion() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.directory.grant(99, ADMIN);
    let ticket = TicketFactory::new(test.db())
        .requester_id("42")
        .build()
        .await?;
    factory::create_claimer(test.db(), ticket.id, "11").await?;

    let gate_id = TicketService::new(&test.state)
        .request_forced_close(&ticket.name, 99, GateAction::Complete)
        .await?;

    let gate = test.state.gates.get(gate_id).await.unwrap();
    assert_eq!(gate.requester_id, 99);
    assert_eq!(gate.action, GateAction::Complete);
    assert_eq!(test.ticket(&ticket.name).await.status, TicketStatus::Open);

    let resolution = ConfirmationService::new(&test.state)
        .respond(gate_id, 99, true)
        .await?;

    assert!(matches!(resolution, GateResolution::Settled(_)));
    let stored = test.ticket(&ticket.name).await;
    assert_eq!(stored.status, TicketStatus::Completed);
    assert_eq!(stored.closed_by, Some(99));
    assert_eq!(test.points_of(11).await, 1);

    Ok(())
}

/// Tests the requester answering a gate an admin opened to cancel their ticket.
///
/// Expected: Err(NotPermitted) for the requester, Ok(Cancelled) for the admin
#[tokio::test]
async fn forced_cancel_answers_to_the_admin() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.directory.grant(99, ADMIN);
    let ticket = TicketFactory::new(test.db())
        .requester_id("42")
        .build()
        .await?;

    let gate_id = TicketService::new(&test.state)
        .request_forced_close(&format!(" {} ", ticket.name), 99, GateAction::Cancel)
        .await?;
    let confirmations = ConfirmationService::new(&test.state);

    assert!(matches!(
        confirmations.respond(gate_id, 42, true).await,
        Err(AppError::GateErr(GateError::NotPermitted))
    ));
    assert_eq!(test.ticket(&ticket.name).await.status, TicketStatus::Open);

    let resolution = confirmations.respond(gate_id, 99, true).await?;

    assert!(matches!(resolution, GateResolution::Cancelled));
    assert_eq!(
        test.ticket(&ticket.name).await.status,
        TicketStatus::Cancelled
    );

    Ok(())
}

/// Tests forced closes that cannot open a gate.
///
/// Expected: Err(Unauthorized) for a non-admin, Err(NotFound) for an unknown name,
/// Err(AlreadyClosed) for a cancelled ticket
#[tokio::test]
async fn forced_close_requires_admin_and_open_ticket() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.directory.grant(99, ADMIN);
    let open = TicketFactory::new(test.db())
        .requester_id("42")
        .build()
        .await?;
    let cancelled = TicketFactory::new(test.db())
        .status("cancelled")
        .build()
        .await?;
    let tickets = TicketService::new(&test.state);

    assert!(matches!(
        tickets
            .request_forced_close(&open.name, 42, GateAction::Cancel)
            .await,
        Err(AppError::TicketErr(TicketError::Unauthorized))
    ));
    assert!(matches!(
        tickets
            .request_forced_close("ticket-missing", 99, GateAction::Complete)
            .await,
        Err(AppError::TicketErr(TicketError::NotFound(_)))
    ));
    assert!(matches!(
        tickets
            .request_forced_close(&cancelled.name, 99, GateAction::Complete)
            .await,
        Err(AppError::TicketErr(TicketError::AlreadyClosed(_)))
    ));

    Ok(())
}
