//! Shared HTTP client for upstream providers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use crate::config::UpstreamConfig;

use super::error::{UpstreamError, snippet};

/// HTTP client used for every third-party call.
///
/// Cloning is cheap; clones share the connection pool and the concurrency
/// limit.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
}

impl UpstreamClient {
    /// Create a client with the given timeout and concurrency cap.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("sensor-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(UpstreamError::Transport)?;

        Ok(Self {
            http,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            timeout: config.timeout,
        })
    }

    /// Start building a request.
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Start building a GET request.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Start building a POST request.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// Per-stage timeout applied to every call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a request and return the body as text.
    ///
    /// Waiting for a concurrency permit, sending, and reading the body all
    /// count against the stage timeout. Non-success statuses become
    /// [`UpstreamError::Status`].
    pub async fn fetch_text(&self, request: RequestBuilder) -> Result<String, UpstreamError> {
        let exchange = async {
            let _permit = self
                .semaphore
                .acquire()
                .await
                .map_err(|_| UpstreamError::LimiterClosed)?;

            let response = request.send().await.map_err(|e| self.classify(e))?;
            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(UpstreamError::Status {
                    status: status.as_u16(),
                    body: snippet(&body),
                });
            }

            response.text().await.map_err(|e| self.classify(e))
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(self.timeout)),
        }
    }

    /// Send a request and decode the body as JSON.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, UpstreamError> {
        let body = self.fetch_text(request).await?;
        serde_json::from_str(&body).map_err(|e| UpstreamError::Json {
            message: e.to_string(),
        })
    }

    fn classify(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout(self.timeout)
        } else {
            UpstreamError::from(err)
        }
    }
}
