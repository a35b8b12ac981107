//! Minimal `BigQuery` v2 REST client for synchronous query jobs.

use std::time::Instant;

use derive_more::Debug;
use eyre::{Result, bail, eyre};
use reqwest::{Client as HttpClient, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, error};
use url::Url;

use crate::{
    auth::Credentials,
    result::{ResultSet, TableRow, TableSchema},
};

/// Public `BigQuery` REST endpoint.
pub const DEFAULT_API_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";
/// Server-side wait per `jobs.query` / `jobs.getQueryResults` call.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct ParameterType {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct ParameterValue {
    value: String,
}

/// A named query parameter, referenced in SQL as `@name`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameter {
    name: String,
    parameter_type: ParameterType,
    parameter_value: ParameterValue,
}

impl QueryParameter {
    /// An `INT64` parameter.
    pub fn int64(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            parameter_type: ParameterType { kind: "INT64".to_owned() },
            parameter_value: ParameterValue { value: value.to_string() },
        }
    }

    /// Parameter name without the leading `@`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value as sent on the wire.
    pub fn value(&self) -> &str {
        &self.parameter_value.value
    }
}

/// Body of a `jobs.query` request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// Standard SQL text
    pub query: String,
    /// Always `false`; queries are standard SQL
    pub use_legacy_sql: bool,
    /// `NAMED` when parameters are present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_mode: Option<String>,
    /// Bound parameters
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query_parameters: Vec<QueryParameter>,
    /// How long the server waits for completion before answering
    pub timeout_ms: u64,
    /// Processing location, e.g. `US`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl QueryRequest {
    /// A standard SQL query without parameters.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            use_legacy_sql: false,
            parameter_mode: None,
            query_parameters: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            location: None,
        }
    }

    /// Bind a named parameter.
    pub fn with_parameter(mut self, parameter: QueryParameter) -> Self {
        self.parameter_mode = Some("NAMED".to_owned());
        self.query_parameters.push(parameter);
        self
    }

    /// Look up a bound parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&QueryParameter> {
        self.query_parameters.iter().find(|p| p.name == name)
    }
}

/// Reference to the job backing a query.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    /// Project that ran the job
    pub project_id: String,
    /// Job identifier
    pub job_id: String,
    /// Location the job ran in
    #[serde(default)]
    pub location: Option<String>,
}

/// Response of `jobs.query` and `jobs.getQueryResults`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Whether the job finished; rows are only present when it did
    #[serde(default)]
    pub job_complete: bool,
    /// Job backing the query
    #[serde(default)]
    pub job_reference: Option<JobReference>,
    /// Result schema
    #[serde(default)]
    pub schema: Option<TableSchema>,
    /// Result rows
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for running queries through the `BigQuery` REST API.
#[derive(Clone, Debug)]
pub struct BigQueryClient {
    #[debug(skip)]
    http: HttpClient,
    base_url: Url,
    project_id: String,
    location: Option<String>,
    credentials: Credentials,
}

impl BigQueryClient {
    /// Create a client billing queries to `project_id`.
    pub fn new(base_url: Url, project_id: String, credentials: Credentials) -> Self {
        Self { http: HttpClient::new(), base_url, project_id, location: None, credentials }
    }

    /// Run jobs in `location` unless a request names its own.
    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    /// Project queries are billed to.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Run `request` and wait until its results are available.
    pub async fn query(&self, request: &QueryRequest) -> Result<ResultSet> {
        let start = Instant::now();
        let result = self.run_query(request).await;

        let duration_ms = start.elapsed().as_millis();
        match &result {
            Ok(rs) => debug!(
                query = %request.query,
                duration_ms,
                rows = rs.len(),
                "BigQuery query executed"
            ),
            Err(e) => {
                error!(query = %request.query, duration_ms, error = %e, "BigQuery query failed")
            }
        }
        result
    }

    async fn run_query(&self, request: &QueryRequest) -> Result<ResultSet> {
        let mut body = request.clone();
        if body.location.is_none() {
            body.location.clone_from(&self.location);
        }

        let url = self.endpoint(&format!("projects/{}/queries", self.project_id));
        let mut response: QueryResponse = self.send(self.http.post(&url).json(&body)).await?;

        while !response.job_complete {
            let mut job = response
                .job_reference
                .ok_or_else(|| eyre!("incomplete query response without a job reference"))?;
            if job.location.is_none() {
                job.location.clone_from(&body.location);
            }
            debug!(job_id = %job.job_id, "Waiting for BigQuery job to complete");
            response = self.get_query_results(&job, body.timeout_ms).await?;
        }

        Ok(ResultSet::from_wire(response.schema, response.rows))
    }

    /// Fetch the results of `job`, waiting up to `timeout_ms` on the server.
    pub async fn get_query_results(
        &self,
        job: &JobReference,
        timeout_ms: u64,
    ) -> Result<QueryResponse> {
        let url = self.endpoint(&format!("projects/{}/queries/{}", job.project_id, job.job_id));
        let mut params = vec![("timeoutMs", timeout_ms.to_string())];
        if let Some(location) = &job.location {
            params.push(("location", location.clone()));
        }
        self.send(self.http.get(&url).query(&params)).await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let token = self.credentials.bearer_token().await?;
        let resp = builder.bearer_auth(token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            bail!("BigQuery request failed ({status}): {message}");
        }
        Ok(resp.json::<T>().await?)
    }
}
