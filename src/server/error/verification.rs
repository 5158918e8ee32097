use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Username must be between 1 and {max} characters")]
    InvalidName { max: usize },

    #[error("A verification for you is already running")]
    AlreadyPending,
}
