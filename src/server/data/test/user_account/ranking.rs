use super::*;

/// Tests the leaderboard order.
///
/// Verifies that balances are sorted descending with ties broken by Discord id.
///
/// Expected: 30, then the two 20s by id, limited to three entries
#[tokio::test]
async fn orders_by_points_then_id() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    create_account_with_points(db, "300", 20).await?;
    create_account_with_points(db, "100", 30).await?;
    create_account_with_points(db, "200", 20).await?;
    create_account_with_points(db, "400", 5).await?;

    let top = UserAccountRepository::new(db).top_by_points(3).await?;

    let order: Vec<(u64, i64)> = top.iter().map(|e| (e.discord_id, e.points)).collect();
    assert_eq!(order, vec![(100, 30), (200, 20), (300, 20)]);

    Ok(())
}

/// Tests counting accounts ahead of a balance.
///
/// Expected: Ties do not count as ahead
#[tokio::test]
async fn counts_strictly_higher_balances() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    create_account_with_points(db, "1", 30).await?;
    create_account_with_points(db, "2", 20).await?;
    create_account_with_points(db, "3", 20).await?;

    let repo = UserAccountRepository::new(db);

    assert_eq!(repo.count_above(20).await?, 1);
    assert_eq!(repo.count_above(0).await?, 3);
    assert_eq!(repo.count_above(30).await?, 0);

    Ok(())
}
