use super::*;

/// Tests crediting a user without an account.
///
/// Verifies that the account is created and the claimed counter only moves for helpers.
///
/// Expected: 0 → 5, one claimed ticket
#[tokio::test]
async fn creates_account_on_first_credit() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = UserAccountRepository::new(db);

    let change = repo.credit(77, 5, true).await?;

    assert_eq!((change.before, change.after), (0, 5));
    let account = repo.find(77).await?.unwrap();
    assert_eq!(account.points, 5);
    assert_eq!(account.tickets_claimed, 1);

    Ok(())
}

/// Tests that credits add up.
///
/// Expected: 10 + 3 + 4 = 17, claimed counter unchanged without `helped`
#[tokio::test]
async fn accumulates_credits() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    create_account_with_points(db, "77", 10).await?;
    let repo = UserAccountRepository::new(db);

    repo.credit(77, 3, false).await?;
    let change = repo.credit(77, 4, false).await?;

    assert_eq!((change.before, change.after), (13, 17));
    assert_eq!(repo.find(77).await?.unwrap().tickets_claimed, 0);

    Ok(())
}

/// Tests overwriting a balance.
///
/// Expected: Change reports the old and new balance
#[tokio::test]
async fn sets_absolute_points() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    create_account_with_points(db, "77", 40).await?;
    let repo = UserAccountRepository::new(db);

    let change = repo.set_points(77, 12).await?;

    assert_eq!((change.before, change.after), (40, 12));
    assert_eq!(repo.find(77).await?.unwrap().points, 12);

    Ok(())
}

/// Tests resetting every balance.
///
/// Expected: All points and claimed counters zeroed
#[tokio::test]
async fn zeroes_all_points() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    UserAccountFactory::new(db)
        .discord_id("1")
        .points(10)
        .tickets_claimed(3)
        .build()
        .await?;
    create_account_with_points(db, "2", 20).await?;
    let repo = UserAccountRepository::new(db);

    assert_eq!(repo.zero_all_points().await?, 2);

    for account in repo.all().await? {
        assert_eq!(account.points, 0);
        assert_eq!(account.tickets_claimed, 0);
    }

    Ok(())
}
