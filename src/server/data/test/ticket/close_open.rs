use super::*;

/// Tests auto-closing an open ticket.
///
/// Expected: true, status closed with auto_closed set and no actor
#[tokio::test]
async fn closes_open_ticket() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    let closed = repo
        .close_open(&ticket.name, TicketStatus::Closed, None, true, Utc::now())
        .await?;

    assert!(closed);
    let stored = repo.find_by_name(&ticket.name).await?.unwrap();
    assert_eq!(stored.status, TicketStatus::Closed);
    assert!(stored.auto_closed);
    assert_eq!(stored.closed_by, None);
    assert!(stored.closed_at.is_some());

    Ok(())
}

/// Tests that a ticket mid-settlement cannot be cancelled.
///
/// Expected: false, status stays completing
#[tokio::test]
async fn leaves_completing_ticket_alone() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = TicketFactory::new(db).status("completing").build().await?;
    let repo = TicketRepository::new(db);

    let cancelled = repo
        .close_open(&ticket.name, TicketStatus::Cancelled, Some(1), false, Utc::now())
        .await?;

    assert!(!cancelled);
    let stored = repo.find_by_name(&ticket.name).await?.unwrap();
    assert_eq!(stored.status, TicketStatus::Completing);

    Ok(())
}
