use thiserror::Error;

/// Outcomes of responding to a confirmation gate that leave it untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("This confirmation no longer exists")]
    NotFound,

    /// Responder is neither the requester nor an authorized role.
    #[error("Only the requester or staff can answer this confirmation")]
    NotPermitted,

    #[error("This confirmation has expired")]
    Expired,

    #[error("This confirmation was already answered")]
    AlreadyResolved,
}
