//! HTTP/JSON query provider
//!
//! Talks to a hosted record store over its JSON query API: one request opens
//! a paged execution and reports the page count, further requests fetch
//! individual pages by index. Basic authentication is sent with every
//! request. Errors are mapped to domain types; no HTTP client types leak out.

use crate::config::ProviderConfig;
use crate::domain::query::QuerySpec;
use crate::domain::record::{Page, RawRecord};
use crate::domain::{QueryError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::traits::{PageSource, QueryProvider};

/// Query provider over a JSON HTTP API
///
/// # Example
///
/// ```no_run
/// use tabula::adapters::provider::HttpProvider;
/// use tabula::config::ProviderConfig;
///
/// # fn example() -> tabula::domain::Result<()> {
/// let config = ProviderConfig::default();
/// let provider = HttpProvider::new(&config)?;
/// # Ok(())
/// # }
/// ```
pub struct HttpProvider {
    base_url: String,
    client: Arc<Client>,
    auth_header: Option<String>,
}

/// Body for opening a paged execution
#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    entity_type: &'a str,
    filter: &'a crate::domain::FilterTree,
    columns: &'a [crate::domain::ColumnSpec],
    page_size: usize,
}

/// Response to an opened execution
#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    execution_id: String,
    total_pages: usize,
    total_records: usize,
}

/// Body for a sequential run
#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    entity_type: &'a str,
    filter: &'a crate::domain::FilterTree,
    columns: &'a [crate::domain::ColumnSpec],
}

/// A batch of records, either one page or a whole run
#[derive(Debug, Deserialize)]
struct RecordsResponse {
    records: Vec<RawRecord>,
}

impl HttpProvider {
    /// Creates a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| {
            crate::domain::TabulaError::Configuration(format!(
                "Invalid provider base URL '{}': {}",
                config.base_url, e
            ))
        })?;

        let mut builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| {
            crate::domain::TabulaError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        let auth_header = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                let credentials = format!("{}:{}", username, password.expose_secret());
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                Some(format!("Basic {encoded}"))
            }
            _ => None,
        };

        Ok(Self {
            base_url,
            client: Arc::new(client),
            auth_header,
        })
    }

    /// The configured base URL, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_header {
            Some(header) => builder.header(reqwest::header::AUTHORIZATION, header),
            None => builder,
        }
    }
}

/// Maps a transport-level failure to a domain error
fn map_transport_error(err: reqwest::Error) -> QueryError {
    if err.is_timeout() {
        QueryError::Timeout(err.to_string())
    } else if err.is_connect() {
        QueryError::ConnectionFailed(err.to_string())
    } else {
        QueryError::ExecutionFailed(err.to_string())
    }
}

/// Maps a non-success status to a domain error
async fn map_status_error(response: Response) -> QueryError {
    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            QueryError::AuthenticationFailed(message)
        }
        s if s.is_server_error() => QueryError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => QueryError::ClientError {
            status: s.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl QueryProvider for HttpProvider {
    async fn execute(&self, spec: &QuerySpec, page_size: usize) -> Result<Box<dyn PageSource>> {
        let body = ExecuteRequest {
            entity_type: spec.entity_type.as_str(),
            filter: &spec.filter,
            columns: &spec.columns,
            page_size,
        };

        let url = format!("{}/api/v1/query", self.base_url);
        let response = self
            .request(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(map_status_error(response).await.into());
        }

        let opened: ExecuteResponse = response
            .json()
            .await
            .map_err(|e| QueryError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            entity_type = %spec.entity_type,
            execution_id = %opened.execution_id,
            total_pages = opened.total_pages,
            total_records = opened.total_records,
            "Opened paged query execution"
        );

        Ok(Box::new(HttpPageSource {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            auth_header: self.auth_header.clone(),
            execution_id: opened.execution_id,
            total_pages: opened.total_pages,
            total_records: opened.total_records,
        }))
    }

    async fn run(&self, spec: &QuerySpec) -> Result<Vec<RawRecord>> {
        let body = RunRequest {
            entity_type: spec.entity_type.as_str(),
            filter: &spec.filter,
            columns: &spec.columns,
        };

        let url = format!("{}/api/v1/query/run", self.base_url);
        let response = self
            .request(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(map_status_error(response).await.into());
        }

        let batch: RecordsResponse = response
            .json()
            .await
            .map_err(|e| QueryError::InvalidResponse(e.to_string()))?;

        Ok(batch.records)
    }
}

/// Paged execution handle held against the remote store
#[derive(Debug)]
struct HttpPageSource {
    client: Arc<Client>,
    base_url: String,
    auth_header: Option<String>,
    execution_id: String,
    total_pages: usize,
    total_records: usize,
}

#[async_trait]
impl PageSource for HttpPageSource {
    fn total_pages(&self) -> usize {
        self.total_pages
    }

    fn total_records(&self) -> usize {
        self.total_records
    }

    async fn fetch(&mut self, index: usize) -> Result<Page> {
        let url = format!(
            "{}/api/v1/query/{}/pages/{}",
            self.base_url, self.execution_id, index
        );

        let mut builder = self.client.get(&url);
        if let Some(header) = &self.auth_header {
            builder = builder.header(reqwest::header::AUTHORIZATION, header);
        }

        let response = builder.send().await.map_err(|e| QueryError::PageFetchFailed {
            position: index,
            message: map_transport_error(e).to_string(),
        })?;

        if !response.status().is_success() {
            let cause = map_status_error(response).await;
            return Err(QueryError::PageFetchFailed {
                position: index,
                message: cause.to_string(),
            }
            .into());
        }

        let batch: RecordsResponse = response.json().await.map_err(|e| {
            QueryError::PageFetchFailed {
                position: index,
                message: format!("invalid page payload: {e}"),
            }
        })?;

        Ok(Page::new(index, batch.records))
    }
}
