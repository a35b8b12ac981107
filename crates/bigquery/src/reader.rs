//! Read-only count queries over the `procedure_occurrence` table.

use derive_more::Debug;
use eyre::Result;

use crate::client::{BigQueryClient, QueryParameter, QueryRequest};

/// Public CMS synthetic patient dataset (OMOP CDM).
pub const DEFAULT_DATASET: &str = "bigquery-public-data.cms_synthetic_patient_data_omop";

const COUNT_COLUMN: &str = "count";
const LAST_N_DATES_PARAM: &str = "last_n_dates";

/// Count queries against `<dataset>.procedure_occurrence`.
#[derive(Clone, Debug)]
pub struct ProcedureReader {
    /// Query client
    client: BigQueryClient,
    /// Fully qualified dataset, `project.dataset`
    dataset: String,
}

impl ProcedureReader {
    /// Create a reader over `dataset`.
    pub const fn new(client: BigQueryClient, dataset: String) -> Self {
        Self { client, dataset }
    }

    /// Dataset the table lives in.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    fn table(&self) -> String {
        format!("`{}.procedure_occurrence`", self.dataset)
    }

    /// Query counting every row of the table.
    pub fn total_count_query(&self) -> QueryRequest {
        QueryRequest::new(format!("SELECT COUNT(*) AS {COUNT_COLUMN} FROM {}", self.table()))
    }

    /// Query counting distinct persons with a procedure on one of the
    /// `last_n_dates` most recent distinct procedure dates.
    ///
    /// The window is bound as `@last_n_dates`, never spliced into the SQL.
    pub fn person_count_query(&self, last_n_dates: i64) -> QueryRequest {
        let table = self.table();
        let sql = format!(
            "SELECT COUNT(DISTINCT person_id) AS {COUNT_COLUMN} \
             FROM {table} \
             WHERE procedure_dat IN ( \
                SELECT procedure_dat \
                FROM ( \
                    SELECT DISTINCT procedure_dat \
                    FROM {table} \
                    ORDER BY procedure_dat DESC \
                    LIMIT @{LAST_N_DATES_PARAM} \
                ) \
             )"
        );
        QueryRequest::new(sql)
            .with_parameter(QueryParameter::int64(LAST_N_DATES_PARAM, last_n_dates))
    }

    async fn fetch_count(&self, request: QueryRequest) -> Result<Option<u64>> {
        let rows = self.client.query(&request).await?;
        rows.first_u64(COUNT_COLUMN)
    }

    /// Get the total number of procedure occurrences.
    ///
    /// `None` when the engine returned no row.
    pub async fn get_total_procedure_count(&self) -> Result<Option<u64>> {
        self.fetch_count(self.total_count_query()).await
    }

    /// Get the number of distinct persons with a procedure on one of the
    /// `last_n_dates` most recent procedure dates.
    ///
    /// `None` when the engine returned no row.
    pub async fn get_person_count_for_recent_dates(&self, last_n_dates: i64) -> Result<Option<u64>> {
        self.fetch_count(self.person_count_query(last_n_dates)).await
    }
}

#[cfg(test)]
mod tests;
