//! API server binary

use std::net::SocketAddr;

use api::ApiState;
use bigquery::{BigQueryClient, Credentials, ProcedureReader, ServiceAccountKey};
use clap::Parser;
use config::{BigQueryOpts, Opts};
use dotenvy::dotenv;
use eyre::{WrapErr, eyre};
use tracing::info;
use tracing_subscriber::filter::EnvFilter;

/// Build the query client, authenticating once before serving.
async fn connect(opts: BigQueryOpts) -> eyre::Result<BigQueryClient> {
    let (credentials, key_project) = match opts.access_token {
        Some(token) => (Credentials::from_token(token), None),
        None => {
            let path = opts.resolved_credentials_path();
            info!(path = %path.display(), "Loading BigQuery service account key");
            let key = ServiceAccountKey::from_file(&path)?;
            let project = key.project_id.clone();
            (Credentials::service_account(key), project)
        }
    };

    let project_id = opts
        .project_id
        .or(key_project)
        .ok_or_else(|| eyre!("no BigQuery project id configured and none in the key file"))?;

    credentials.bearer_token().await.wrap_err("failed to authenticate with BigQuery")?;
    info!(project_id = %project_id, "Authenticated with BigQuery");

    Ok(BigQueryClient::new(opts.api_url, project_id, credentials).with_location(opts.location))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();
    let opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let dataset = opts.bigquery.dataset.clone();
    let client = connect(opts.bigquery).await?;
    let state = ApiState::new(ProcedureReader::new(client, dataset));

    let addr: SocketAddr = format!("{}:{}", opts.api.host, opts.api.port).parse()?;
    server::run(addr, state, opts.api.allowed_origins).await
}
