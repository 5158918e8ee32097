use crate::server::error::{internal::InternalError, AppError};

/// Parses a stored snowflake id.
///
/// # Arguments
/// - `value` - The stored string to parse into `u64`
///
/// # Returns
/// - `Ok(u64)` - Successfully parsed id
/// - `Err(AppError::InternalErr(ParseStringId))` - Stored value is not a valid id
pub fn parse_u64_from_string(value: &str) -> Result<u64, AppError> {
    let result = value
        .parse::<u64>()
        .map_err(|e| InternalError::ParseStringId {
            value: value.to_string(),
            source: e,
        })?;

    Ok(result)
}

/// Parses an optional stored snowflake id, `None` passes through.
pub fn parse_optional_u64(value: Option<&str>) -> Result<Option<u64>, AppError> {
    value.map(parse_u64_from_string).transpose()
}
