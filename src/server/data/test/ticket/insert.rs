use super::*;

fn new_ticket(id: i64) -> NewTicket {
    NewTicket {
        id,
        requester_id: 42,
        ticket_type: TicketType::parse("Daily 4 Man"),
        server: "Twilly".to_string(),
        room: "1234".to_string(),
        username: "Hero".to_string(),
        bosses: vec!["Ultra Warden".to_string(), "Ultra Engineer".to_string()],
        points: 2,
        max_claimers: 3,
        total_kills: None,
        created_at: Utc::now(),
    }
}

/// Tests inserting a new ticket.
///
/// Verifies that the stored ticket is open, named after its zero padded id, keeps the boss
/// list order and has neither claimers nor a channel yet.
///
/// Expected: Ok with an open `ticket-007`
#[tokio::test]
async fn stores_open_ticket() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = TicketRepository::new(db);

    let ticket = repo.insert(new_ticket(7)).await?;

    assert_eq!(ticket.name, "ticket-007");
    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.bosses, vec!["Ultra Warden", "Ultra Engineer"]);
    assert!(ticket.claimers.is_empty());
    assert_eq!(ticket.channel_id, None);

    let stored = repo.find_by_name("ticket-007").await?.unwrap();
    assert_eq!(stored.id, 7);
    assert_eq!(stored.points, 2);
    assert_eq!(stored.requester_id, 42);

    Ok(())
}

/// Tests that ticket ids cannot be reused.
///
/// Expected: Err on the second insert with the same id
#[tokio::test]
async fn rejects_duplicate_id() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = TicketRepository::new(db);

    repo.insert(new_ticket(1)).await?;
    let result = repo.insert(new_ticket(1)).await;

    assert!(result.is_err());

    Ok(())
}

/// Tests looking up a ticket that does not exist.
///
/// Expected: Ok(None)
#[tokio::test]
async fn missing_ticket_is_none() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let found = TicketRepository::new(db).find_by_name("ticket-999").await?;

    assert!(found.is_none());

    Ok(())
}

/// Tests kill counts that do not fit the stored column.
///
/// Verifies that an oversized count is refused instead of being stored truncated, and that
/// a large count that fits reads back unchanged.
///
/// Expected: Err(InvalidInput) for u32::MAX, 2_000_000 stored as is
#[tokio::test]
async fn rejects_kill_count_outside_column() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = TicketRepository::new(db);

    let mut oversized = new_ticket(1);
    oversized.total_kills = Some(u32::MAX);
    let result = repo.insert(oversized).await;
    assert!(matches!(
        result,
        Err(AppError::TicketErr(TicketError::InvalidInput(_)))
    ));
    assert!(repo.find_by_name("ticket-001").await?.is_none());

    let mut large = new_ticket(2);
    large.total_kills = Some(2_000_000);
    repo.insert(large).await?;
    let stored = repo.find_by_name("ticket-002").await?.unwrap();
    assert_eq!(stored.total_kills, Some(2_000_000));

    Ok(())
}
