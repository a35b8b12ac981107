//! Thin HTTP API for counting procedure occurrences in `BigQuery`

pub mod helpers;
pub mod routes;
pub mod state;
pub mod validation;

use api_types::{CountResponse, ErrorResponse, HealthResponse, PersonCountRequest};
use utoipa::OpenApi;

pub use routes::router;
pub use state::ApiState;

/// `OpenAPI` documentation structure
#[derive(Debug, OpenApi)]
#[openapi(
    paths(routes::procedure::procedure_count, routes::procedure::person_count),
    components(schemas(CountResponse, PersonCountRequest, ErrorResponse, HealthResponse)),
    tags(
        (name = "count", description = "Endpoint to get the total count of rows from the procedure_occurrence table."),
        (name = "person_count", description = "Endpoint to get count of persons for the last N procedure_dat.")
    ),
    info(
        title = "Procedure Count API",
        description = "Counts over the CMS synthetic patient procedure_occurrence table",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
