//! HTTP client for the ISS JSON API.

use async_trait::async_trait;
use isskit_types::IssError;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::IssSource;

/// Default ISS endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://iss.moex.com/iss";

/// Paging policy for multi-page tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    /// Offset increment between pages.
    pub page_size: usize,
    /// Consecutive failed pages after which paging stops.
    pub max_consecutive_failures: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_consecutive_failures: 5,
        }
    }
}

/// Configuration for the ISS client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint root that URL templates are appended to.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Paging policy.
    pub paging: Paging,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("isskit/{}", env!("CARGO_PKG_VERSION")),
            paging: Paging::default(),
        }
    }
}

/// Errors that can occur while fetching tables.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status.
    #[error("Server error {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Response body was not JSON.
    #[error("Response is not JSON: {0}")]
    NotJson(#[from] serde_json::Error),

    /// The named sub-table is absent from the response.
    #[error("Table '{0}' not found in response")]
    MissingTable(String),

    /// The named sub-table does not have the expected shape.
    #[error("Table '{table}' is malformed: {reason}")]
    MalformedTable {
        /// The sub-table name.
        table: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The source serves JSON documents only.
    #[error("Source cannot download '{0}'")]
    Unsupported(String),

    /// A URL template placeholder had no value.
    #[error("Unresolved placeholder '{{{0}}}' in URL template")]
    Template(String),
}

impl From<FetchError> for IssError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::MissingTable(table) => {
                Self::incomplete(table, "table not found in response")
            }
            FetchError::MalformedTable { table, reason } => Self::incomplete(table, reason),
            FetchError::Template(name) => {
                Self::Parse(format!("unresolved placeholder '{{{name}}}' in URL template"))
            }
            other => Self::Transport(other.to_string()),
        }
    }
}

/// HTTP client for the ISS API.
///
/// Owned by the caller and passed by reference to every accessor; cloning is
/// cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct IssClient {
    client: Client,
    config: ClientConfig,
}

impl IssClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(ClientConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Joins a rendered path onto the configured base URL.
    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl IssSource for IssClient {
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, FetchError> {
        let url = self.url_for(path);
        debug!(%url, params = query.len(), "ISS request");

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(path);
        debug!(%url, "ISS download");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn paging(&self) -> Paging {
        self.config.paging
    }
}
