use super::*;

/// Tests storing a verified character binding.
///
/// Expected: Account verified with name, id, guild and history
#[tokio::test]
async fn binds_external_character() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = UserAccountRepository::new(db);

    repo.bind_external(
        9,
        "NewName",
        "81234567",
        Some("Oath"),
        &["OldName".to_string()],
        Utc::now(),
    )
    .await?;

    let account = repo.find(9).await?.unwrap();
    assert_eq!(account.verification_status, VerificationStatus::Verified);
    assert_eq!(account.external_name.as_deref(), Some("NewName"));
    assert_eq!(account.external_id.as_deref(), Some("81234567"));
    assert_eq!(account.external_guild.as_deref(), Some("Oath"));
    assert_eq!(account.previous_names, vec!["OldName".to_string()]);
    assert!(account.verified_at.is_some());

    Ok(())
}

/// Tests the per guild roster and counts.
///
/// Verifies that roster lookups ignore case, unverified accounts are ignored and
/// counts are sorted largest first.
///
/// Expected: Two Oath members, one Other member
#[tokio::test]
async fn groups_verified_accounts_by_guild() -> Result<(), AppError> {
    let test = TestBuilder::new().with_ticket_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    UserAccountFactory::new(db)
        .discord_id("1")
        .verified("A", Some("Oath"))
        .build()
        .await?;
    UserAccountFactory::new(db)
        .discord_id("2")
        .verified("B", Some("Oath"))
        .build()
        .await?;
    UserAccountFactory::new(db)
        .discord_id("3")
        .verified("C", Some("Other"))
        .build()
        .await?;
    UserAccountFactory::new(db).discord_id("4").build().await?;

    let repo = UserAccountRepository::new(db);

    let roster = repo.verified_in_guild("OATH").await?;
    let ids: Vec<u64> = roster.iter().map(|a| a.discord_id).collect();
    assert_eq!(ids, vec![1, 2]);

    let counts = repo.verified_guild_counts().await?;
    let counts: Vec<(&str, u64)> = counts.iter().map(|c| (c.guild.as_str(), c.members)).collect();
    assert_eq!(counts, vec![("Oath", 2), ("Other", 1)]);

    Ok(())
}
