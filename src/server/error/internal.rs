use std::num::ParseIntError;
use thiserror::Error;

/// Internal issues with the codebase indicating unexpected behavior & possible bugs
#[derive(Error, Debug)]
pub enum InternalError {
    /// Failure to parse a snowflake id from a stored String
    #[error("Failed to parse ID from String '{value}': {source}")]
    ParseStringId {
        /// The string value that failed to parse
        value: String,
        /// The underlying parse error
        #[source]
        source: ParseIntError,
    },

    /// A stored enum column holds a value the code does not know
    #[error("Unknown {kind} '{value}' in stored record")]
    UnknownVariant { kind: &'static str, value: String },

    /// A stored JSON column does not have the expected shape
    #[error("Malformed {column} column: {reason}")]
    MalformedColumn { column: &'static str, reason: String },

    /// A built-in pattern failed to compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
