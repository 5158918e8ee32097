use super::*;

/// Tests binding an idle user.
///
/// Verifies that the account is created on demand and bound to the ticket.
///
/// Expected: true, account bound
#[tokio::test]
async fn binds_idle_user() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = UserAccountRepository::new(db);

    assert!(repo.bind_active_ticket_if_idle(55, "ticket-001").await?);

    let account = repo.find(55).await?.unwrap();
    assert_eq!(account.active_ticket.as_deref(), Some("ticket-001"));

    Ok(())
}

/// Tests that a busy user cannot be bound to a second ticket.
///
/// Expected: false for another ticket, true again for the same ticket
#[tokio::test]
async fn refuses_busy_user() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    UserAccountFactory::new(db)
        .discord_id("55")
        .active_ticket("ticket-001")
        .build()
        .await?;
    let repo = UserAccountRepository::new(db);

    assert!(!repo.bind_active_ticket_if_idle(55, "ticket-002").await?);
    assert!(repo.bind_active_ticket_if_idle(55, "ticket-001").await?);

    let account = repo.find(55).await?.unwrap();
    assert_eq!(account.active_ticket.as_deref(), Some("ticket-001"));

    Ok(())
}

/// Tests clearing a binding only when it points at a given ticket.
///
/// Expected: false for the wrong ticket, true for the bound one
#[tokio::test]
async fn clears_only_matching_binding() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    UserAccountFactory::new(db)
        .discord_id("55")
        .active_ticket("ticket-001")
        .build()
        .await?;
    let repo = UserAccountRepository::new(db);

    assert!(!repo.clear_active_ticket(55, Some("ticket-002")).await?);
    assert!(repo.clear_active_ticket(55, Some("ticket-001")).await?);
    assert!(!repo.clear_active_ticket(55, None).await?);

    let account = repo.find(55).await?.unwrap();
    assert_eq!(account.active_ticket, None);

    Ok(())
}
