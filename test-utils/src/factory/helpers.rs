//! Shared helper utilities for factory methods.

use sea_orm::{ConnectionTrait, DbErr};

static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);

/// Gets the next unique counter value for test data.
pub fn next_id() -> u64 {
    COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
}

/// Creates an open ticket owned by a fresh requester account.
///
/// # Returns
/// - `Ok((requester, ticket))` - Created requester account and ticket
/// - `Err(DbErr)` - Database error during creation
pub async fn create_ticket_with_requester<C: ConnectionTrait>(
    db: &C,
) -> Result<(entity::user_account::Model, entity::ticket::Model), DbErr> {
    let requester = crate::factory::user_account::create_account(db).await?;
    let ticket = crate::factory::ticket::TicketFactory::new(db)
        .requester_id(requester.discord_id.clone())
        .build()
        .await?;

    Ok((requester, ticket))
}
