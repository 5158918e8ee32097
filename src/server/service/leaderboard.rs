use crate::server::{
    data::user_account::UserAccountRepository, error::AppError,
    model::account::LeaderboardEntry, state::AppState,
};

/// Entries shown on the leaderboard.
pub const LEADERBOARD_SIZE: u64 = 10;

pub struct LeaderboardService<'a> {
    state: &'a AppState,
}

impl<'a> LeaderboardService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Re-renders the leaderboard from the current top balances.
    pub async fn refresh(&self) -> Result<Vec<LeaderboardEntry>, AppError> {
        let entries = UserAccountRepository::new(&self.state.db)
            .top_by_points(LEADERBOARD_SIZE)
            .await?;

        self.state.notifier.update_leaderboard(&entries).await?;
        tracing::debug!("Leaderboard refreshed with {} entries", entries.len());

        Ok(entries)
    }
}
