use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("No account found for user {0}")]
    UnknownUser(u64),

    #[error("Archive {0} was not found")]
    UnknownArchive(String),

    #[error("Boss {0} has no point rule")]
    UnknownBoss(String),
}
