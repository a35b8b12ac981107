//! Shared state for API handlers

use bigquery::ProcedureReader;
use derive_more::Debug;

/// Shared state for API handlers.
///
/// Holds the single query handle created at startup; handlers only read it.
#[derive(Clone, Debug)]
pub struct ApiState {
    pub(crate) reader: ProcedureReader,
}

impl ApiState {
    /// Create a new [`ApiState`].
    pub const fn new(reader: ProcedureReader) -> Self {
        Self { reader }
    }

    /// Reader used to run count queries.
    pub const fn reader(&self) -> &ProcedureReader {
        &self.reader
    }
}
