use super::*;

/// Tests that only one caller wins the settlement lock.
///
/// Verifies the open → completing compare-and-set succeeds once and records the settler.
///
/// Expected: true then false, ticket completing and closed_by set
#[tokio::test]
async fn only_first_caller_wins() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    assert!(repo.lock_for_settlement(&ticket.name, 7, Utc::now()).await?);
    assert!(!repo.lock_for_settlement(&ticket.name, 8, Utc::now()).await?);

    let stored = repo.find_by_name(&ticket.name).await?.unwrap();
    assert_eq!(stored.status, TicketStatus::Completing);
    assert_eq!(stored.closed_by, Some(7));

    Ok(())
}

/// Tests that closed tickets cannot be locked.
///
/// Expected: false for a cancelled ticket, status unchanged
#[tokio::test]
async fn ignores_cancelled_ticket() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = TicketFactory::new(db).status("cancelled").build().await?;
    let repo = TicketRepository::new(db);

    assert!(!repo.lock_for_settlement(&ticket.name, 7, Utc::now()).await?);

    let stored = repo.find_by_name(&ticket.name).await?.unwrap();
    assert_eq!(stored.status, TicketStatus::Cancelled);

    Ok(())
}

/// Tests that completion only follows a held lock.
///
/// Expected: false while open, true once completing, false again afterwards
#[tokio::test]
async fn completes_only_from_completing() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let ticket = factory::create_ticket(db).await?;
    let repo = TicketRepository::new(db);

    assert!(!repo.mark_completed(&ticket.name).await?);
    repo.lock_for_settlement(&ticket.name, 7, Utc::now()).await?;
    assert!(repo.mark_completed(&ticket.name).await?);
    assert!(!repo.mark_completed(&ticket.name).await?);

    let stored = repo.find_by_name(&ticket.name).await?.unwrap();
    assert_eq!(stored.status, TicketStatus::Completed);

    Ok(())
}
