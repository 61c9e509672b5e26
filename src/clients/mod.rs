pub mod fixture;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;
use crate::models::resources::ResourceSnapshot;

use fixture::FallbackSource;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Source of raw snapshots consumed by [`crate::store::ResourceStore`].
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch_snapshot(
        &self,
        cluster: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<ResourceSnapshot, FetchError>;

    async fn fetch_clusters(&self) -> Result<Vec<String>, FetchError>;

    /// Locally available substitute data. Only fails on a broken fixture.
    async fn fetch_mock_snapshot(&self) -> Result<ResourceSnapshot, FetchError>;

    /// Whether `fetch_snapshot` honours its `namespace` argument.
    fn supports_namespace_filter(&self) -> bool {
        false
    }
}

#[derive(Debug, Deserialize)]
struct ResourcesResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    resources: Option<ResourceSnapshot>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    request_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ClustersResponse {
    #[serde(default)]
    clusters: Option<Vec<String>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    request_id: Option<u64>,
}

/// Typed request/response client for the dashboard backend.
pub struct HttpFetcher {
    pub base_url: String,
    http: Client,
    next_request_id: AtomicU64,
    fallback: FallbackSource,
}

impl HttpFetcher {
    pub fn new(
        base_url: String,
        timeout: Duration,
        fallback: FallbackSource,
    ) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            next_request_id: AtomicU64::new(1),
            fallback,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<(u64, T), FetchError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        debug!(request_id, path, "backend request");

        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .header("Accept", "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if status.as_u16() >= 400 {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok((request_id, serde_json::from_str(&body)?))
    }
}

fn check_correlation(expected: u64, got: Option<u64>) -> Result<(), FetchError> {
    match got {
        Some(got) if got != expected => Err(FetchError::Correlation { expected, got }),
        _ => Ok(()),
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch_snapshot(
        &self,
        cluster: Option<&str>,
        namespace: Option<&str>,
    ) -> Result<ResourceSnapshot, FetchError> {
        let mut query = Vec::new();
        if let Some(c) = cluster {
            query.push(("cluster", c));
        }
        if let Some(ns) = namespace {
            query.push(("namespace", ns));
        }

        let (id, resp): (u64, ResourcesResponse) = self.get_json("/resources", &query).await?;
        check_correlation(id, resp.request_id)?;

        if let Some(err) = resp.error {
            return Err(FetchError::Backend(err));
        }
        match resp.resources {
            Some(resources) if resp.success => Ok(resources),
            _ => Err(FetchError::Backend("refresh was not successful".to_string())),
        }
    }

    async fn fetch_clusters(&self) -> Result<Vec<String>, FetchError> {
        let (id, resp): (u64, ClustersResponse) = self.get_json("/clusters", &[]).await?;
        check_correlation(id, resp.request_id)?;

        if let Some(err) = resp.error {
            return Err(FetchError::Backend(err));
        }
        resp.clusters
            .ok_or_else(|| FetchError::Backend("response has no cluster list".to_string()))
    }

    async fn fetch_mock_snapshot(&self) -> Result<ResourceSnapshot, FetchError> {
        self.fallback.load().await
    }

    fn supports_namespace_filter(&self) -> bool {
        true
    }
}
