//! Common helper functions used across API endpoints

use api_types::ErrorResponse;

/// Create a database error response with logging
pub fn database_error(operation: &str, error: impl std::fmt::Display) -> ErrorResponse {
    tracing::error!(operation = operation, error = %error, "Database operation failed");
    ErrorResponse::database_error()
}

/// Create a database error response for a specific query type
pub fn query_error(query_type: &str, error: impl std::fmt::Display) -> ErrorResponse {
    database_error(&format!("get {}", query_type), error)
}

/// Create a not-found response for a query that returned no row
pub fn no_data(detail: impl Into<String>) -> ErrorResponse {
    let detail = detail.into();
    tracing::info!(detail = %detail, "Query returned no rows");
    ErrorResponse::not_found(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn query_error_hides_backend_message() {
        let err = query_error("procedure count", "Access Denied: project secret-project");
        assert_eq!(err.r#type, "database-error");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.detail.contains("secret-project"));
    }

    #[test]
    fn no_data_is_not_found() {
        let err = no_data("No data found in procedure_occurrence table");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.detail, "No data found in procedure_occurrence table");
    }
}
