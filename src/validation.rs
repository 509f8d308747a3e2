use crate::error::ApiError;
use crate::expander::DEFAULT_HORIZON_DAYS;

/// Session lengths offered by the booking form.
pub const ALLOWED_DURATIONS: [u32; 5] = [60, 90, 120, 150, 180];

pub fn validate_duration(value: u32) -> Result<u32, ApiError> {
    if ALLOWED_DURATIONS.contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::BadRequest(
            "duration must be one of 60, 90, 120, 150, 180 minutes".into(),
        ))
    }
}

/// Tutor ids end up as a single path segment on the backend, so anything
/// that could act as a separator or a dot segment is refused.
pub fn validate_tutor_id(value: &str) -> Result<&str, ApiError> {
    let looks_like_path = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\'])
        || value.chars().any(char::is_control);
    if looks_like_path {
        Err(ApiError::BadRequest("invalid tutor id".into()))
    } else {
        Ok(value)
    }
}

pub fn validate_horizon(value: u32) -> Result<u32, ApiError> {
    if (1..=DEFAULT_HORIZON_DAYS).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::BadRequest(format!(
            "horizon_days must be between 1 and {DEFAULT_HORIZON_DAYS}"
        )))
    }
}
