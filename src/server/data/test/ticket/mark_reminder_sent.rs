use super::*;

/// Tests that the idle reminder flag flips only once.
///
/// Expected: true on the first call, false afterwards
#[tokio::test]
async fn flips_once() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    assert!(repo.mark_reminder_sent(&ticket.name).await?);
    assert!(!repo.mark_reminder_sent(&ticket.name).await?);

    let stored = repo.find_by_name(&ticket.name).await?.unwrap();
    assert!(stored.reminder_sent);

    Ok(())
}

/// Tests that closed tickets are never reminded.
///
/// Expected: false for a completed ticket
#[tokio::test]
async fn skips_closed_ticket() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = TicketFactory::new(db).status("completed").build().await?;

    assert!(!TicketRepository::new(db)
        .mark_reminder_sent(&ticket.name)
        .await?);

    Ok(())
}
