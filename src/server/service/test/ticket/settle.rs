use super::*;
use crate::server::{service::confirmation::GateState, util::time::week_start};

/// Seeds a ticket for requester 42 with bound claimers 11 and 12.
async fn claimed_ticket(
    test: &TestState,
    max_claimers: i32,
) -> Result<entity::ticket::Model, AppError> {
    let ticket = TicketFactory::new(test.db())
        .requester_id("42")
        .points(3)
        .max_claimers(max_claimers)
        .build()
        .await?;
    for helper in ["11", "12"] {
        factory::create_claimer(test.db(), ticket.id, helper).await?;
        UserAccountFactory::new(test.db())
            .discord_id(helper)
            .active_ticket(ticket.name.clone())
            .build()
            .await?;
    }
    UserAccountFactory::new(test.db())
        .discord_id("42")
        .active_ticket(ticket.name.clone())
        .build()
        .await?;

    Ok(ticket)
}

/// Tests completing a full ticket.
///
/// Verifies that every claimer is credited the ticket points, the requester gets the boss
/// count bonus, all bindings are cleared and the ticket is completed with its channel removed.
///
/// Expected: Ok(Settled) with 11 and 12 at 3 points and 42 at 1 point
#[tokio::test]
async fn settles_full_ticket() -> Result<(), AppError> {
    let test = TestState::new().await;
    let ticket = claimed_ticket(&test, 2).await?;

    let outcome = TicketService::new(&test.state)
        .request_completion(&ticket.name, 42)
        .await?;

    let receipt = match outcome {
        CompletionOutcome::Settled(receipt) => receipt,
        other => panic!("expected a settlement, got {:?}", other),
    };
    assert_eq!(receipt.helpers.len(), 2);
    assert_eq!(receipt.requester.credited, 1);

    assert_eq!(test.points_of(11).await, 3);
    assert_eq!(test.points_of(12).await, 3);
    assert_eq!(test.points_of(42).await, 1);
    for user_id in [11, 12, 42] {
        assert_eq!(test.active_ticket_of(user_id).await, None);
    }

    let stored = test.ticket(&ticket.name).await;
    assert_eq!(stored.status, TicketStatus::Completed);
    assert_eq!(stored.closed_by, Some(42));

    assert!(matches!(
        test.notifier.events().as_slice(),
        [LogEvent::TicketCompleted { .. }]
    ));
    assert_eq!(test.notifier.deleted(), vec![stored.channel_id.unwrap()]);
    assert_eq!(test.notifier.leaderboard_updates(), 1);

    Ok(())
}

/// Tests that a ticket pays out only once.
///
/// Expected: Second settle fails with AlreadyLocked and balances stay unchanged
#[tokio::test]
async fn settles_at_most_once() -> Result<(), AppError> {
    let test = TestState::new().await;
    let ticket = claimed_ticket(&test, 2).await?;
    let tickets = TicketService::new(&test.state);

    tickets.settle(&ticket.name, 42).await?;
    let again = tickets.settle(&ticket.name, 42).await;

    assert!(matches!(
        again,
        Err(AppError::TicketErr(TicketError::AlreadyLocked(_)))
    ));
    assert_eq!(test.points_of(11).await, 3);
    assert_eq!(test.points_of(42).await, 1);
    assert_eq!(test.notifier.events().len(), 1);

    Ok(())
}

/// Tests two settlements of the same ticket running at the same time.
///
/// Verifies that only one of them moves the ticket to completing and that the ledger is
/// written once.
///
/// Expected: One Ok and one Err(AlreadyLocked), 11 and 12 at 3 points, 42 at 1 point
#[tokio::test]
async fn concurrent_settlements_pay_once() -> Result<(), AppError> {
    let test = TestState::new().await;
    let ticket = claimed_ticket(&test, 2).await?;
    let tickets = TicketService::new(&test.state);

    let (first, second) = tokio::join!(
        tickets.settle(&ticket.name, 42),
        tickets.settle(&ticket.name, 42)
    );

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(
        loser,
        Err(AppError::TicketErr(TicketError::AlreadyLocked(_)))
    ));

    assert_eq!(test.points_of(11).await, 3);
    assert_eq!(test.points_of(12).await, 3);
    assert_eq!(test.points_of(42).await, 1);
    assert_eq!(
        test.ticket(&ticket.name).await.status,
        TicketStatus::Completed
    );
    assert_eq!(test.notifier.events().len(), 1);

    Ok(())
}

/// Tests completing a ticket with free helper slots.
///
/// Verifies that a confirmation gate is opened for the requester and nothing is settled yet.
///
/// Expected: Ok(ConfirmationRequired) with a pending gate
#[tokio::test]
async fn partial_ticket_requires_confirmation() -> Result<(), AppError> {
    let test = TestState::new().await;
    let ticket = claimed_ticket(&test, 3).await?;

    let outcome = TicketService::new(&test.state)
        .request_completion(&ticket.name, 42)
        .await?;

    let gate_id = match outcome {
        CompletionOutcome::ConfirmationRequired { gate_id } => gate_id,
        other => panic!("expected a confirmation gate, got {:?}", other),
    };
    let gate = test.state.gates.get(gate_id).await.unwrap();
    assert_eq!(gate.state, GateState::Pending);
    assert_eq!(gate.requester_id, 42);

    assert_eq!(test.ticket(&ticket.name).await.status, TicketStatus::Open);
    assert_eq!(test.points_of(11).await, 0);

    Ok(())
}

/// Tests who may complete a ticket.
///
/// Verifies that a claimer without staff roles is refused while a senior helper may settle a
/// ticket they did not request.
///
/// Expected: Err(Unauthorized) for the claimer, Ok for the senior helper
#[tokio::test]
async fn only_requester_and_staff_complete() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.directory.grant(77, SENIOR);
    let ticket = claimed_ticket(&test, 2).await?;
    let tickets = TicketService::new(&test.state);

    let by_claimer = tickets.settle(&ticket.name, 11).await;
    assert!(matches!(
        by_claimer,
        Err(AppError::TicketErr(TicketError::Unauthorized))
    ));
    assert_eq!(test.ticket(&ticket.name).await.status, TicketStatus::Open);

    let receipt = tickets.settle(&ticket.name, 77).await?;
    assert_eq!(receipt.settled_by, 77);

    Ok(())
}

/// Tests the weekly requester cap.
///
/// Verifies that only the part of the bonus below the cap is credited while the weekly
/// counter grows by the full attempted bonus.
///
/// Expected: 3 attempted, 1 credited, weekly counter 19 → 22
#[tokio::test]
async fn requester_bonus_respects_weekly_cap() -> Result<(), AppError> {
    let test = TestState::new().await;
    UserAccountFactory::new(test.db())
        .discord_id("42")
        .weekly_points(19, week_start(Utc::now()))
        .build()
        .await?;
    let ticket = TicketFactory::new(test.db())
        .requester_id("42")
        .bosses(&["Ultra Warden", "Binky", "Nulgath"])
        .max_claimers(1)
        .build()
        .await?;
    factory::create_claimer(test.db(), ticket.id, "11").await?;

    let receipt = TicketService::new(&test.state)
        .settle(&ticket.name, 42)
        .await?;

    assert_eq!(receipt.requester.attempted, 3);
    assert_eq!(receipt.requester.credited, 1);
    assert_eq!(test.points_of(42).await, 1);

    let account = UserAccountRepository::new(test.db())
        .find(42)
        .await?
        .unwrap();
    assert_eq!(account.weekly_points, 22);

    Ok(())
}

/// Tests that testing tickets never reward the requester.
///
/// Expected: Helper credited, requester at 0
#[tokio::test]
async fn testing_ticket_gives_no_requester_bonus() -> Result<(), AppError> {
    let test = TestState::new().await;
    let ticket = TicketFactory::new(test.db())
        .requester_id("42")
        .ticket_type("testing")
        .points(2)
        .max_claimers(1)
        .build()
        .await?;
    factory::create_claimer(test.db(), ticket.id, "11").await?;

    let receipt = TicketService::new(&test.state)
        .settle(&ticket.name, 42)
        .await?;

    assert_eq!(receipt.requester.credited, 0);
    assert_eq!(test.points_of(11).await, 2);
    assert_eq!(test.points_of(42).await, 0);

    Ok(())
}
