//! Validation of request bodies

use api_types::{ErrorResponse, PersonCountRequest};

/// Decode a person count request body.
///
/// An empty body or a JSON `null` is treated like `{}`.
pub fn parse_person_count_request(body: &[u8]) -> Result<PersonCountRequest, ErrorResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(PersonCountRequest::default());
    }
    serde_json::from_slice::<Option<PersonCountRequest>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse person count request");
            ErrorResponse::invalid_params(format!("Invalid request body: {}", e))
        })
}

/// Reject windows the engine cannot use as a `LIMIT`.
///
/// Zero is forwarded; it selects no dates.
pub fn validate_last_n_dates(last_n_dates: i64) -> Result<i64, ErrorResponse> {
    if last_n_dates < 0 {
        return Err(ErrorResponse::invalid_params(format!(
            "last_n_dates must not be negative, got {}",
            last_n_dates
        )));
    }
    Ok(last_n_dates)
}
