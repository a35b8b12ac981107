//! Count endpoints over the `procedure_occurrence` table

use crate::{
    helpers::{no_data, query_error},
    state::ApiState,
    validation::{parse_person_count_request, validate_last_n_dates},
};
use api_types::{CountResponse, ErrorResponse, PersonCountRequest};
use axum::{Json, body::Bytes, extract::State};

#[utoipa::path(
    get,
    path = "/procedure_occurrence/count",
    responses(
        (status = 200, description = "Total number of procedure occurrences", body = CountResponse),
        (status = 404, description = "The query returned no row", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "count"
)]
/// Get the total number of rows in the `procedure_occurrence` table
pub async fn procedure_count(
    State(state): State<ApiState>,
) -> Result<Json<CountResponse>, ErrorResponse> {
    let count = state
        .reader
        .get_total_procedure_count()
        .await
        .map_err(|e| query_error("total procedure count", e))?
        .ok_or_else(|| no_data("No data found in procedure_occurrence table"))?;

    tracing::info!(count, "Returning total procedure count");
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    post,
    path = "/procedure_occurrence/person_count",
    request_body = PersonCountRequest,
    responses(
        (status = 200, description = "Distinct persons over the most recent procedure dates", body = CountResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 404, description = "The query returned no row", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "person_count"
)]
/// Get the number of distinct persons with a procedure on one of the last N
/// distinct procedure dates.
///
/// `last_n_dates` defaults to 7 when omitted.
pub async fn person_count(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<CountResponse>, ErrorResponse> {
    let request = parse_person_count_request(&body)?;
    let last_n_dates = validate_last_n_dates(request.last_n_dates())?;

    let count = state
        .reader
        .get_person_count_for_recent_dates(last_n_dates)
        .await
        .map_err(|e| query_error("person count", e))?
        .ok_or_else(|| {
            no_data(format!(
                "No data found in procedure_occurrence table for the last {} days",
                last_n_dates
            ))
        })?;

    tracing::info!(count, last_n_dates, "Returning person count");
    Ok(Json(CountResponse { count }))
}
