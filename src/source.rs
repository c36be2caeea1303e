//! Loading the district reference file and the metrics file.
//!
//! Both are static JSON assets served from a local path or an HTTP(S) URL. Failures never
//! reach the caller: they are logged and replaced by an empty district list or an empty
//! metric sequence.

use crate::cache::{DEFAULT_FRESHNESS, FreshCache};
use crate::locate::Coordinates;
use crate::model::{District, DistrictMetrics};
use crate::normalize::{MismatchPolicy, normalize};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tokio::time::sleep;

const MAX_RETRIES: usize = 3;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url} after {attempts} attempts: {source}")]
    Http {
        url: String,
        attempts: usize,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Where a JSON asset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url(value.to_string())
        } else {
            Self::Path(PathBuf::from(value))
        }
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, client: &Client) -> FetchResult<T> {
        let bytes = match self {
            Self::Path(path) => fs::read(path).await.map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            })?,
            Self::Url(url) => fetch_bytes_with_retry(client, url).await?,
        };
        serde_json::from_slice(&bytes).map_err(|source| FetchError::Json {
            origin: self.to_string(),
            source,
        })
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

pub async fn fetch_bytes_with_retry(client: &Client, url: &str) -> FetchResult<Vec<u8>> {
    let bytes = send_with_retry(client, url)
        .await?
        .bytes()
        .await
        .map_err(|source| FetchError::Http {
            url: url.to_string(),
            attempts: 1,
            source,
        })?;
    Ok(bytes.to_vec())
}

async fn send_with_retry(client: &Client, url: &str) -> FetchResult<Response> {
    let mut attempt = 1;
    loop {
        let result = match client.get(url).send().await {
            Ok(response) => response.error_for_status(),
            Err(err) => Err(err),
        };
        match result {
            Ok(success) => return Ok(success),
            Err(err) if attempt >= MAX_RETRIES => {
                return Err(FetchError::Http {
                    url: url.to_string(),
                    attempts: attempt,
                    source: err,
                });
            }
            Err(err) => {
                log::debug!("attempt {attempt} for {url} failed: {err}");
                sleep(calculate_backoff(attempt)).await;
                attempt += 1;
            }
        }
    }
}

fn calculate_backoff(attempt: usize) -> Duration {
    const MAX_BACKOFF_EXPONENT: u32 = 10;
    let exponent = u32::try_from(attempt)
        .unwrap_or(MAX_BACKOFF_EXPONENT)
        .min(MAX_BACKOFF_EXPONENT);
    Duration::from_secs(2_u64.saturating_pow(exponent))
}

/// Asks an IP geolocation endpoint for the caller's approximate position.
pub async fn fetch_location(client: &Client, url: &str) -> FetchResult<Coordinates> {
    Source::Url(url.to_string()).fetch_json(client).await
}

/// Cached access to the district list and per-district metrics.
pub struct DataSource {
    client: Client,
    districts_source: Source,
    metrics_source: Source,
    policy: MismatchPolicy,
    districts: FreshCache<(), Arc<Vec<District>>>,
    documents: FreshCache<(), Arc<Option<Value>>>,
    metrics: FreshCache<String, Arc<DistrictMetrics>>,
}

impl DataSource {
    pub fn new(
        client: Client,
        districts_source: Source,
        metrics_source: Source,
        policy: MismatchPolicy,
    ) -> Self {
        Self::with_freshness(
            client,
            districts_source,
            metrics_source,
            policy,
            DEFAULT_FRESHNESS,
        )
    }

    pub fn with_freshness(
        client: Client,
        districts_source: Source,
        metrics_source: Source,
        policy: MismatchPolicy,
        freshness: Duration,
    ) -> Self {
        Self {
            client,
            districts_source,
            metrics_source,
            policy,
            districts: FreshCache::new(freshness),
            documents: FreshCache::new(freshness),
            metrics: FreshCache::new(freshness),
        }
    }

    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// The district reference list; empty when it cannot be loaded.
    pub async fn districts(&self) -> Arc<Vec<District>> {
        self.districts
            .get_or_load((), move || async move {
                match self.districts_source.fetch_json::<Vec<District>>(&self.client).await {
                    Ok(districts) => {
                        log::debug!(
                            "loaded {} districts from {}",
                            districts.len(),
                            self.districts_source
                        );
                        Arc::new(districts)
                    }
                    Err(err) => {
                        log::error!("fetching districts failed: {err}");
                        Arc::new(Vec::new())
                    }
                }
            })
            .await
    }

    /// Metrics of one district; an empty sequence when the id is empty, unknown, or the
    /// metrics file cannot be loaded.
    pub async fn metrics(&self, district_id: Option<&str>) -> Arc<DistrictMetrics> {
        let Some(id) = district_id.filter(|id| !id.is_empty()) else {
            return Arc::new(DistrictMetrics::empty(None));
        };

        self.metrics
            .get_or_load(id.to_string(), move || async move {
                let document = self.metrics_document().await;
                let normalized = (*document).as_ref().map_or_else(
                    || DistrictMetrics::empty(Some(id)),
                    |raw| normalize(raw, Some(id), self.policy),
                );
                if normalized.metrics.is_empty() {
                    log::info!("no metrics for district {id}");
                }
                Arc::new(normalized)
            })
            .await
    }

    async fn metrics_document(&self) -> Arc<Option<Value>> {
        self.documents
            .get_or_load((), move || async move {
                match self.metrics_source.fetch_json::<Value>(&self.client).await {
                    Ok(raw) => Arc::new(Some(raw)),
                    Err(err) => {
                        log::error!("fetching metrics failed: {err}");
                        Arc::new(None)
                    }
                }
            })
            .await
    }
}
