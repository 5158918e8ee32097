use super::*;

/// Tests listing tickets stuck in settlement.
///
/// Verifies that only `completing` tickets locked before the cutoff are returned, with open
/// tickets and recently locked ones left out.
///
/// Expected: Only the old completing ticket
#[tokio::test]
async fn lists_old_completing_tickets() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = TicketRepository::new(db);
    let now = Utc::now();

    let stuck = factory::create_ticket(db).await?;
    let recent = factory::create_ticket(db).await?;
    factory::create_ticket(db).await?;

    repo.lock_for_settlement(&stuck.name, 1, now - Duration::hours(1))
        .await?;
    repo.lock_for_settlement(&recent.name, 1, now).await?;

    let listed = repo.list_stuck(now - Duration::minutes(10)).await?;

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, stuck.name);

    Ok(())
}
