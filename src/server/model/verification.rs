//! Domain models for external identity verification.

use crate::server::error::internal::InternalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStatus {
    Unverified,
    Verified,
    Failed,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Verified => "verified",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, InternalError> {
        match value {
            "unverified" => Ok(Self::Unverified),
            "verified" => Ok(Self::Verified),
            "failed" => Ok(Self::Failed),
            other => Err(InternalError::UnknownVariant {
                kind: "verification status",
                value: other.to_string(),
            }),
        }
    }
}

/// Profile returned by the external lookup service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    pub external_id: String,
    /// In-game guild, `None` when the character is guildless.
    pub guild: Option<String>,
}

/// Mutually exclusive role tier derived from verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTier {
    /// Verified and in the home guild.
    Member,
    /// Verified but outside the home guild.
    Outsider,
    /// Never verified successfully.
    Stranger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified {
        external_name: String,
        guild: Option<String>,
        tier: RoleTier,
    },
    /// The lookup answered but no such character exists.
    NotFound { tier: RoleTier },
}

/// Count of verified members per external guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildCount {
    pub guild: String,
    pub members: u64,
}
