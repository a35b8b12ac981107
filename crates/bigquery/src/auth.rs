//! Google OAuth credentials for the `BigQuery` REST API.

use std::{path::Path, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use derive_more::Debug;
use eyre::{Context, Result};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

/// OAuth scope requested for running query jobs.
pub const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";
/// Token endpoint used when the key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

/// Service-account key file as issued by Google Cloud IAM.
#[derive(Clone, Debug, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account e-mail, used as the JWT issuer
    pub client_email: String,
    /// PEM-encoded RSA private key
    #[debug(skip)]
    pub private_key: String,
    /// Identifier of the private key, sent as the JWT `kid`
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// OAuth token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// Project the key belongs to
    #[serde(default)]
    pub project_id: Option<String>,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    /// Load a key from a JSON key file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read service account key {}", path.display()))?;
        serde_json::from_str(&raw)
            .wrap_err_with(|| format!("invalid service account key {}", path.display()))
    }

    /// Build the signed JWT assertion exchanged for an access token.
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .wrap_err("invalid service account private key")?;
        let claims = Claims {
            iss: &self.client_email,
            scope: BIGQUERY_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&header, &claims, &key).wrap_err("failed to sign JWT assertion")
    }
}

#[derive(Clone, Debug)]
struct CachedToken {
    #[debug(skip)]
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now
    }
}

/// Access tokens minted from a service-account key.
///
/// The token is shared between clones and refreshed shortly before it expires.
#[derive(Clone, Debug)]
pub struct TokenSource {
    key: Arc<ServiceAccountKey>,
    #[debug(skip)]
    http: HttpClient,
    #[debug(skip)]
    cache: Arc<Mutex<Option<CachedToken>>>,
}

impl TokenSource {
    /// Create a token source for `key`.
    pub fn new(key: ServiceAccountKey) -> Self {
        Self { key: Arc::new(key), http: HttpClient::new(), cache: Arc::new(Mutex::new(None)) }
    }

    /// Key the tokens are minted from.
    pub fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    /// Return the cached token, exchanging a new one when it is missing or
    /// about to expire.
    pub async fn access_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;
        let now = Utc::now();
        if let Some(token) = cache.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }
        let token = exchange_token(&self.http, &self.key, now).await?;
        debug!(
            client_email = %self.key.client_email,
            expires_at = %token.expires_at,
            "Obtained BigQuery access token"
        );
        let value = token.value.clone();
        *cache = Some(token);
        Ok(value)
    }
}

/// Source of bearer tokens for `BigQuery` requests.
#[derive(Clone, Debug)]
pub enum Credentials {
    /// Tokens exchanged from a service-account key
    ServiceAccount(TokenSource),
    /// A fixed bearer token
    Static(#[debug(skip)] String),
}

impl Credentials {
    /// Credentials backed by a service-account key.
    pub fn service_account(key: ServiceAccountKey) -> Self {
        Self::ServiceAccount(TokenSource::new(key))
    }

    /// Credentials that always present `token`.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self::Static(token.into())
    }

    /// Return a bearer token for the next request.
    pub async fn bearer_token(&self) -> Result<String> {
        match self {
            Self::ServiceAccount(source) => source.access_token().await,
            Self::Static(token) => Ok(token.clone()),
        }
    }
}

async fn exchange_token(
    http: &HttpClient,
    key: &ServiceAccountKey,
    now: DateTime<Utc>,
) -> Result<CachedToken> {
    #[derive(Deserialize)]
    struct TokenResponse {
        access_token: String,
        expires_in: i64,
    }

    let assertion = key.assertion(now)?;
    let resp = http
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await?
        .error_for_status()
        .wrap_err("token exchange rejected")?;
    let token = resp.json::<TokenResponse>().await?;
    Ok(CachedToken {
        value: token.access_token,
        expires_at: now + Duration::seconds(token.expires_in),
    })
}
