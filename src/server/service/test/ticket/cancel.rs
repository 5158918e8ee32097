use super::*;
use crate::server::service::confirmation::GateAction;

/// Tests the requester cancelling their ticket.
///
/// Verifies that the ticket is cancelled without moving points, every binding is cleared,
/// the cancellation is logged and the channel removed.
///
/// Expected: Ok(Ticket), status cancelled, nobody credited
#[tokio::test]
async fn requester_cancels_ticket() -> Result<(), AppError> {
    let test = TestState::new().await;
    let ticket = TicketFactory::new(test.db())
        .requester_id("42")
        .build()
        .await?;
    factory::create_claimer(test.db(), ticket.id, "11").await?;
    for user in ["11", "42"] {
        UserAccountFactory::new(test.db())
            .discord_id(user)
            .active_ticket(ticket.name.clone())
            .build()
            .await?;
    }

    let cancelled = TicketService::new(&test.state)
        .cancel(&ticket.name, 42)
        .await?;

    assert_eq!(cancelled.claimers, vec![11]);
    let stored = test.ticket(&ticket.name).await;
    assert_eq!(stored.status, TicketStatus::Cancelled);
    assert_eq!(stored.closed_by, Some(42));
    assert!(!stored.auto_closed);

    assert_eq!(test.active_ticket_of(11).await, None);
    assert_eq!(test.active_ticket_of(42).await, None);
    assert_eq!(test.points_of(11).await, 0);

    assert!(matches!(
        test.notifier.events().as_slice(),
        [LogEvent::TicketCancelled { cancelled_by: 42, .. }]
    ));
    assert_eq!(test.notifier.deleted(), vec![stored.channel_id.unwrap()]);

    Ok(())
}

/// Tests the cancel button opening a confirmation gate.
///
/// Expected: Pending cancel gate addressed to the requester, ticket still open
#[tokio::test]
async fn cancel_request_opens_gate() -> Result<(), AppError> {
    let test = TestState::new().await;
    let ticket = TicketFactory::new(test.db())
        .requester_id("42")
        .build()
        .await?;

    let gate_id = TicketService::new(&test.state)
        .request_cancellation(&ticket.name, 42)
        .await?;

    let gate = test.state.gates.get(gate_id).await.unwrap();
    assert_eq!(gate.action, GateAction::Cancel);
    assert_eq!(gate.requester_id, 42);
    assert_eq!(gate.ticket_name, ticket.name);
    assert_eq!(test.ticket(&ticket.name).await.status, TicketStatus::Open);

    Ok(())
}

/// Tests who may cancel a ticket.
///
/// Expected: Err(Unauthorized) for a helper, Ok for an admin
#[tokio::test]
async fn only_requester_and_admin_cancel() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.helpers(&[11]);
    test.directory.grant(99, ADMIN);
    let ticket = factory::create_ticket(test.db()).await?;
    let tickets = TicketService::new(&test.state);

    let by_helper = tickets.cancel(&ticket.name, 11).await;
    assert!(matches!(
        by_helper,
        Err(AppError::TicketErr(TicketError::Unauthorized))
    ));
    assert!(matches!(
        tickets.request_cancellation(&ticket.name, 11).await,
        Err(AppError::TicketErr(TicketError::Unauthorized))
    ));

    tickets.cancel(&ticket.name, 99).await?;
    assert_eq!(
        test.ticket(&ticket.name).await.status,
        TicketStatus::Cancelled
    );

    Ok(())
}

/// Tests cancelling tickets that already left the open state.
///
/// Expected: Err(AlreadyLocked) mid-settlement, Err(AlreadyClosed) once completed
#[tokio::test]
async fn cannot_cancel_settled_ticket() -> Result<(), AppError> {
    let test = TestState::new().await;
    let completing = TicketFactory::new(test.db())
        .requester_id("42")
        .status("completing")
        .build()
        .await?;
    let completed = TicketFactory::new(test.db())
        .requester_id("42")
        .status("completed")
        .build()
        .await?;
    let tickets = TicketService::new(&test.state);

    assert!(matches!(
        tickets.cancel(&completing.name, 42).await,
        Err(AppError::TicketErr(TicketError::AlreadyLocked(_)))
    ));
    assert!(matches!(
        tickets.cancel(&completed.name, 42).await,
        Err(AppError::TicketErr(TicketError::AlreadyClosed(_)))
    ));
    assert!(test.notifier.events().is_empty());

    Ok(())
}
