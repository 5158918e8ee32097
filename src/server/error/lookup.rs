use thiserror::Error;

/// External profile lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Transient 429-equivalent signal. Retried before reaching callers.
    #[error("Profile service is rate limiting requests")]
    RateLimited,

    #[error("Profile lookup failed: {0}")]
    Failed(String),
}
