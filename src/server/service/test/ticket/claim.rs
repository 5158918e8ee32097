use super::*;

/// Tests a helper claiming a free slot.
///
/// Verifies that the claimer is stored, the helper is bound to the ticket and the claim is
/// announced in the ticket channel.
///
/// Expected: Ok(Claimed { 1/3 })
#[tokio::test]
async fn claims_slot_and_binds_helper() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.helpers(&[11]);
    let ticket = factory::create_ticket(test.db()).await?;

    let result = TicketService::new(&test.state).claim(&ticket.name, 11).await?;

    assert_eq!(
        result,
        ClaimResult::Claimed {
            claimers: 1,
            max_claimers: 3
        }
    );
    assert_eq!(test.ticket(&ticket.name).await.claimers, vec![11]);
    assert_eq!(
        test.active_ticket_of(11).await.as_deref(),
        Some(ticket.name.as_str())
    );
    assert_eq!(test.notifier.messages().len(), 1);

    Ok(())
}

/// Tests claiming a full ticket.
///
/// Expected: Err(CapacityExceeded { max: 1 }) and the second helper stays unbound
#[tokio::test]
async fn rejects_claim_on_full_ticket() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.helpers(&[11, 12]);
    let ticket = TicketFactory::new(test.db()).max_claimers(1).build().await?;
    let tickets = TicketService::new(&test.state);

    tickets.claim(&ticket.name, 11).await?;
    let result = tickets.claim(&ticket.name, 12).await;

    assert!(matches!(
        result,
        Err(AppError::TicketErr(TicketError::CapacityExceeded { max: 1 }))
    ));
    assert_eq!(test.active_ticket_of(12).await, None);

    Ok(())
}

/// Tests two helpers racing for the last slot.
///
/// Verifies that the per-ticket lock lets exactly one claim through and the loser is neither
/// stored as a claimer nor bound to the ticket.
///
/// Expected: One Ok(Claimed { 1/1 }) and one Err(CapacityExceeded { max: 1 })
#[tokio::test]
async fn concurrent_claims_fill_last_slot_once() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.helpers(&[11, 12]);
    let ticket = TicketFactory::new(test.db()).max_claimers(1).build().await?;
    let tickets = TicketService::new(&test.state);

    let (first, second) = tokio::join!(
        tickets.claim(&ticket.name, 11),
        tickets.claim(&ticket.name, 12)
    );

    let results = [first, second];
    let claimed = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Ok(ClaimResult::Claimed {
                    claimers: 1,
                    max_claimers: 1
                })
            )
        })
        .count();
    let rejected = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(AppError::TicketErr(TicketError::CapacityExceeded { max: 1 }))
            )
        })
        .count();
    assert_eq!((claimed, rejected), (1, 1));

    let claimers = test.ticket(&ticket.name).await.claimers;
    assert_eq!(claimers.len(), 1);
    let winner = claimers[0];
    let loser = if winner == 11 { 12 } else { 11 };
    assert_eq!(
        test.active_ticket_of(winner).await.as_deref(),
        Some(ticket.name.as_str())
    );
    assert_eq!(test.active_ticket_of(loser).await, None);

    Ok(())
}

/// Tests that a helper on another ticket cannot claim.
///
/// Expected: Err(AlreadyBusy) naming the other ticket
#[tokio::test]
async fn rejects_helper_bound_elsewhere() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.helpers(&[11]);
    UserAccountFactory::new(test.db())
        .discord_id("11")
        .active_ticket("ticket-777")
        .build()
        .await?;
    let ticket = factory::create_ticket(test.db()).await?;

    let result = TicketService::new(&test.state).claim(&ticket.name, 11).await;

    assert!(matches!(
        result,
        Err(AppError::TicketErr(TicketError::AlreadyBusy { ref active_ticket }))
            if active_ticket == "ticket-777"
    ));
    assert!(test.ticket(&ticket.name).await.claimers.is_empty());

    Ok(())
}

/// Tests that a requester cannot claim their own ticket, even as a helper.
///
/// Expected: Err(SelfClaimForbidden)
#[tokio::test]
async fn rejects_self_claim() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.helpers(&[42]);
    let ticket = TicketFactory::new(test.db())
        .requester_id("42")
        .build()
        .await?;

    let result = TicketService::new(&test.state).claim(&ticket.name, 42).await;

    assert!(matches!(
        result,
        Err(AppError::TicketErr(TicketError::SelfClaimForbidden))
    ));

    Ok(())
}

/// Tests that users without the helper role cannot claim.
///
/// Expected: Err(Unauthorized)
#[tokio::test]
async fn rejects_user_without_helper_role() -> Result<(), AppError> {
    let test = TestState::new().await;
    let ticket = factory::create_ticket(test.db()).await?;

    let result = TicketService::new(&test.state).claim(&ticket.name, 11).await;

    assert!(matches!(
        result,
        Err(AppError::TicketErr(TicketError::Unauthorized))
    ));
    assert_eq!(test.active_ticket_of(11).await, None);

    Ok(())
}

/// Tests that pressing claim again releases the slot.
///
/// Expected: Ok(Unclaimed { 0/3 }) with the binding cleared
#[tokio::test]
async fn second_claim_releases_slot() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.helpers(&[11]);
    let ticket = factory::create_ticket(test.db()).await?;
    let tickets = TicketService::new(&test.state);

    tickets.claim(&ticket.name, 11).await?;
    let result = tickets.claim(&ticket.name, 11).await?;

    assert_eq!(
        result,
        ClaimResult::Unclaimed {
            claimers: 0,
            max_claimers: 3
        }
    );
    assert!(test.ticket(&ticket.name).await.claimers.is_empty());
    assert_eq!(test.active_ticket_of(11).await, None);

    Ok(())
}

/// Tests claiming a ticket that is no longer open.
///
/// Expected: Err(AlreadyClosed)
#[tokio::test]
async fn rejects_claim_on_cancelled_ticket() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.helpers(&[11]);
    let ticket = TicketFactory::new(test.db())
        .status("cancelled")
        .build()
        .await?;

    let result = TicketService::new(&test.state).claim(&ticket.name, 11).await;

    assert!(matches!(
        result,
        Err(AppError::TicketErr(TicketError::AlreadyClosed(_)))
    ));

    Ok(())
}

/// Tests an admin evicting a claimer.
///
/// Expected: Ok(Ticket) without the claimer, binding cleared, no points moved
#[tokio::test]
async fn admin_removes_claimer() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.directory.grant(99, ADMIN);
    let ticket = factory::create_ticket(test.db()).await?;
    factory::create_claimer(test.db(), ticket.id, "11").await?;
    UserAccountFactory::new(test.db())
        .discord_id("11")
        .active_ticket(ticket.name.clone())
        .build()
        .await?;

    let updated = TicketService::new(&test.state)
        .remove_claimer(&ticket.name, 11, 99)
        .await?;

    assert!(updated.claimers.is_empty());
    assert!(test.ticket(&ticket.name).await.claimers.is_empty());
    assert_eq!(test.active_ticket_of(11).await, None);
    assert_eq!(test.points_of(11).await, 0);

    Ok(())
}

/// Tests the checks of claimer removal.
///
/// Expected: Err(Unauthorized) for non-admins, Err(NotAClaimer) for users without a slot
#[tokio::test]
async fn remove_claimer_checks_actor_and_target() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.directory.grant(99, ADMIN);
    let ticket = factory::create_ticket(test.db()).await?;
    factory::create_claimer(test.db(), ticket.id, "11").await?;
    let tickets = TicketService::new(&test.state);

    let by_helper = tickets.remove_claimer(&ticket.name, 11, 12).await;
    assert!(matches!(
        by_helper,
        Err(AppError::TicketErr(TicketError::Unauthorized))
    ));

    let not_claimer = tickets.remove_claimer(&ticket.name, 12, 99).await;
    assert!(matches!(
        not_claimer,
        Err(AppError::TicketErr(TicketError::NotAClaimer(12)))
    ));

    assert_eq!(test.ticket(&ticket.name).await.claimers, vec![11]);

    Ok(())
}
