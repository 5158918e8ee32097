use super::*;

fn entry(discord_id: u64, points: i64) -> LeaderboardEntry {
    LeaderboardEntry {
        discord_id,
        points,
        tickets_claimed: 1,
    }
}

/// Tests writing and reading back an archive.
///
/// Verifies that entries come back ordered by points and the archive becomes listable.
///
/// Expected: Archive found with entries 30, 20, 5
#[tokio::test]
async fn stores_snapshot() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ledger_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = PointsArchiveRepository::new(db);

    repo.create(
        "2026-10-19_12-00-00",
        1,
        Utc::now(),
        &[entry(2, 20), entry(1, 30), entry(3, 5)],
    )
    .await?;

    assert!(repo.exists("2026-10-19_12-00-00").await?);
    let archive = repo.find("2026-10-19_12-00-00").await?.unwrap();
    assert_eq!(archive.reset_by, 1);
    let points: Vec<i64> = archive.entries.iter().map(|e| e.points).collect();
    assert_eq!(points, vec![30, 20, 5]);

    assert_eq!(repo.list_ids().await?, vec!["2026-10-19_12-00-00".to_string()]);

    Ok(())
}

/// Tests archiving an empty ledger.
///
/// Expected: Archive exists with no entries
#[tokio::test]
async fn stores_empty_snapshot() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ledger_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = PointsArchiveRepository::new(db);

    repo.create("empty", 1, Utc::now(), &[]).await?;

    let archive = repo.find("empty").await?.unwrap();
    assert!(archive.entries.is_empty());
    assert!(repo.find("missing").await?.is_none());

    Ok(())
}

/// Tests that archive ids are unique.
///
/// Expected: Err when the id is reused
#[tokio::test]
async fn rejects_duplicate_id() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ledger_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = PointsArchiveRepository::new(db);

    repo.create("dup", 1, Utc::now(), &[]).await?;
    let result = repo.create("dup", 1, Utc::now(), &[]).await;

    assert!(result.is_err());

    Ok(())
}
