//! `BigQuery` access for the procedure count API.
//!
//! The crate wraps the `BigQuery` v2 REST API with just enough surface to run
//! parameterized `jobs.query` calls, wait for them to finish and read scalar
//! values out of the returned rows. [`ProcedureReader`] owns the SQL for the
//! `procedure_occurrence` table.

pub mod auth;
pub mod client;
pub mod reader;
pub mod result;

pub use auth::{Credentials, ServiceAccountKey};
pub use client::{BigQueryClient, DEFAULT_API_URL, QueryParameter, QueryRequest};
pub use reader::{DEFAULT_DATASET, ProcedureReader};
pub use result::{FieldSchema, ResultSet};
