//! Procedure count API configuration
use std::path::{Path, PathBuf};

use bigquery::{DEFAULT_API_URL, DEFAULT_DATASET};
use clap::Parser;
use url::Url;

/// Default list of allowed CORS origins.
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";
/// Default service-account key file name.
pub const DEFAULT_CREDENTIALS_FILE: &str = "service-account.json";

/// `BigQuery` configuration options
#[derive(Debug, Clone, Parser)]
pub struct BigQueryOpts {
    /// Path to the service-account key file; relative paths are resolved
    /// against the directory of the executable
    #[clap(long, env = "GOOGLE_APPLICATION_CREDENTIALS", default_value = DEFAULT_CREDENTIALS_FILE)]
    pub credentials_path: PathBuf,
    /// Project queries are billed to (defaults to the key's project)
    #[clap(long, env = "BIGQUERY_PROJECT_ID")]
    pub project_id: Option<String>,
    /// Fully qualified dataset holding `procedure_occurrence`
    #[clap(long, env = "BIGQUERY_DATASET", default_value = DEFAULT_DATASET)]
    pub dataset: String,
    /// Processing location of query jobs
    #[clap(long, env = "BIGQUERY_LOCATION")]
    pub location: Option<String>,
    /// `BigQuery` REST endpoint
    #[clap(long = "api-url", env = "BIGQUERY_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: Url,
    /// Fixed bearer token to use instead of the key file
    #[clap(long, env = "BIGQUERY_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,
}

/// API server configuration options
#[derive(Debug, Clone, Parser)]
pub struct ApiOpts {
    /// API server host
    #[clap(long = "host", env = "API_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// API server port
    #[clap(long = "port", env = "API_PORT", default_value_t = 8000)]
    pub port: u16,
    /// Allowed CORS origins (comma separated)
    #[clap(
        long = "allowed-origins",
        env = "ALLOWED_ORIGINS",
        default_value = DEFAULT_ALLOWED_ORIGINS,
        value_delimiter = ','
    )]
    pub allowed_origins: Vec<String>,
}

/// CLI options for the API server
#[derive(Debug, Clone, Parser)]
#[clap(name = "api-server", about = "Procedure occurrence count API")]
pub struct Opts {
    /// `BigQuery` configuration
    #[clap(flatten)]
    pub bigquery: BigQueryOpts,

    /// API server configuration
    #[clap(flatten)]
    pub api: ApiOpts,
}

/// Resolve a credentials path, anchoring relative paths at `base_dir`.
pub fn resolve_credentials_path(path: &Path, base_dir: Option<&Path>) -> PathBuf {
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

impl BigQueryOpts {
    /// Credentials path resolved against the directory of the running
    /// executable.
    pub fn resolved_credentials_path(&self) -> PathBuf {
        let exe = std::env::current_exe().ok();
        let base = exe.as_deref().and_then(Path::parent);
        resolve_credentials_path(&self.credentials_path, base)
    }
}
