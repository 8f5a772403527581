//! GraphQL HTTP client implementation.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::GraphqlClientError;
use crate::operation::{GraphqlQuery, GraphqlRequest, GraphqlResponse};
use crate::retry::{RetryDecision, RetryPolicy};

type SharedRequestFuture = Shared<BoxFuture<'static, Result<Vec<u8>, GraphqlClientError>>>;

/// GraphQL client metrics.
#[derive(Debug, Default)]
#[allow(clippy::struct_field_names)]
pub struct GraphqlClientMetrics {
    requests_total: AtomicU64,
    requests_success: AtomicU64,
    requests_error: AtomicU64,
    requests_retried: AtomicU64,
    requests_deduplicated: AtomicU64,
}

impl GraphqlClientMetrics {
    /// Snapshot current metrics.
    #[must_use]
    pub fn snapshot(&self) -> GraphqlClientMetricsSnapshot {
        GraphqlClientMetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            requests_success: self.requests_success.load(Ordering::Relaxed),
            requests_error: self.requests_error.load(Ordering::Relaxed),
            requests_retried: self.requests_retried.load(Ordering::Relaxed),
            requests_deduplicated: self.requests_deduplicated.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_field_names)]
pub struct GraphqlClientMetricsSnapshot {
    /// Requests sent (retries excluded).
    pub requests_total: u64,
    /// Responses without GraphQL errors.
    pub requests_success: u64,
    /// Transport failures and responses carrying GraphQL errors.
    pub requests_error: u64,
    /// Retries performed.
    pub requests_retried: u64,
    /// Requests answered by an identical in-flight request.
    pub requests_deduplicated: u64,
}

#[derive(Debug, Clone)]
struct DedupState {
    inner: Arc<tokio::sync::Mutex<HashMap<u64, SharedRequestFuture>>>,
}

impl DedupState {
    fn new() -> Self {
        Self {
            inner: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
        }
    }
}

/// GraphQL client configuration.
#[derive(Debug, Clone)]
pub struct GraphqlClientConfig {
    /// Service name used in logs.
    pub service_name: String,
    /// Default headers applied to every request.
    pub headers: HeaderMap,
    /// Request timeout.
    pub timeout: Duration,
    /// Retry policy.
    pub retry: RetryPolicy,
    /// Deduplicate identical in-flight requests.
    pub dedup_in_flight: bool,
}

impl Default for GraphqlClientConfig {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            service_name: "graphql".to_string(),
            headers,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            dedup_in_flight: true,
        }
    }
}

/// GraphQL client builder.
#[derive(Debug, Clone)]
pub struct GraphqlClientBuilder {
    endpoint: String,
    config: GraphqlClientConfig,
}

impl GraphqlClientBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            config: GraphqlClientConfig::default(),
        }
    }

    /// Set the service name used in logs.
    #[must_use]
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.config.service_name = service_name.into();
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.config.headers.insert(name, value);
        self
    }

    /// Add a bearer token header.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        if let Ok(header) = HeaderValue::from_str(&value) {
            self.config
                .headers
                .insert(reqwest::header::AUTHORIZATION, header);
        }
        self
    }

    /// Set timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Enable or disable in-flight deduplication.
    #[must_use]
    pub const fn with_dedup_in_flight(mut self, enabled: bool) -> Self {
        self.config.dedup_in_flight = enabled;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GraphqlClient, GraphqlClientError> {
        GraphqlClient::with_config(self.endpoint, self.config)
    }
}

/// GraphQL client.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    endpoint: String,
    http: reqwest::Client,
    config: GraphqlClientConfig,
    dedup_state: Option<DedupState>,
    metrics: Arc<GraphqlClientMetrics>,
}

impl GraphqlClient {
    /// Create a client with custom configuration.
    pub fn with_config(
        endpoint: impl Into<String>,
        config: GraphqlClientConfig,
    ) -> Result<Self, GraphqlClientError> {
        let http = reqwest::Client::builder()
            .default_headers(config.headers.clone())
            .timeout(config.timeout)
            .build()?;
        let dedup_state = config.dedup_in_flight.then(DedupState::new);
        Ok(Self {
            endpoint: endpoint.into(),
            http,
            config,
            dedup_state,
            metrics: Arc::new(GraphqlClientMetrics::default()),
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Service name used in logs.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.config.service_name
    }

    /// Return client metrics snapshot.
    #[must_use]
    pub fn metrics(&self) -> GraphqlClientMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Run `query` with `variables`, naming the operation after the document.
    pub async fn query<V, R>(
        &self,
        query: &GraphqlQuery,
        variables: V,
    ) -> Result<GraphqlResponse<R>, GraphqlClientError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let mut request = GraphqlRequest::new(query.clone(), variables);
        if let Some(name) = query.operation_name() {
            request = request.with_operation_name(name);
        }
        self.execute_request(request).await
    }

    /// Run `query` and return data only (error on GraphQL errors).
    pub async fn query_strict<V, R>(
        &self,
        query: &GraphqlQuery,
        variables: V,
    ) -> Result<R, GraphqlClientError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let response = self.query(query, variables).await?;
        if !response.errors.is_empty() {
            return Err(GraphqlClientError::GraphqlErrors {
                errors: response.errors,
            });
        }
        response.data.ok_or_else(|| GraphqlClientError::Protocol {
            message: "missing GraphQL data".to_string(),
        })
    }

    /// Execute an arbitrary request.
    ///
    /// GraphQL errors are returned inside the response; only transport and
    /// decoding failures produce `Err`.
    pub async fn execute_request<V, R>(
        &self,
        request: GraphqlRequest<V>,
    ) -> Result<GraphqlResponse<R>, GraphqlClientError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let idempotent = !request.query.as_str().trim_start().starts_with("mutation");
        let body = serde_json::to_vec(&request)?;
        let bytes = self.execute_bytes(body, idempotent).await?;
        let response: GraphqlResponse<R> = serde_json::from_slice(&bytes)?;

        if response.errors.is_empty() {
            self.metrics
                .requests_success
                .fetch_add(1, Ordering::Relaxed);
        } else {
            self.metrics.requests_error.fetch_add(1, Ordering::Relaxed);
        }

        Ok(response)
    }

    async fn execute_bytes(
        &self,
        body_bytes: Vec<u8>,
        idempotent: bool,
    ) -> Result<Vec<u8>, GraphqlClientError> {
        self.metrics.requests_total.fetch_add(1, Ordering::Relaxed);

        // Mutations always go out on their own.
        let Some(state) = self.dedup_state.as_ref().filter(|_| idempotent) else {
            return self.send_with_retry(body_bytes, idempotent).await;
        };

        let key = hash_bytes(&body_bytes);
        let mut guard = state.inner.lock().await;
        if let Some(shared) = guard.get(&key).cloned() {
            drop(guard);
            self.metrics
                .requests_deduplicated
                .fetch_add(1, Ordering::Relaxed);
            return shared.await;
        }

        let client = self.clone();
        let future = async move { client.send_with_retry(body_bytes, idempotent).await }
            .boxed()
            .shared();
        guard.insert(key, future.clone());
        drop(guard);

        let result = future.await;
        state.inner.lock().await.remove(&key);
        result
    }

    async fn send_with_retry(
        &self,
        body_bytes: Vec<u8>,
        idempotent: bool,
    ) -> Result<Vec<u8>, GraphqlClientError> {
        let mut attempt = 1;
        loop {
            match self.send_once(&body_bytes).await {
                Ok(bytes) => return Ok(bytes),
                Err(err) => match self.config.retry.decide(&err, attempt, idempotent) {
                    RetryDecision::RetryAfter(delay) => {
                        self.metrics
                            .requests_retried
                            .fetch_add(1, Ordering::Relaxed);
                        debug!(
                            service = %self.config.service_name,
                            attempt,
                            ?delay,
                            error = %err,
                            "retrying GraphQL request"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    RetryDecision::DoNotRetry => {
                        self.metrics.requests_error.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                },
            }
        }
    }

    async fn send_once(&self, body_bytes: &[u8]) -> Result<Vec<u8>, GraphqlClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .body(body_bytes.to_vec())
            .send()
            .await?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(GraphqlClientError::HttpStatus {
                status,
                body: truncate_body(&bytes),
                retry_after,
            });
        }

        Ok(bytes.to_vec())
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn truncate_body(bytes: &[u8]) -> String {
    const MAX_LEN: usize = 4096;
    let mut body = String::from_utf8_lossy(bytes).to_string();
    if body.len() > MAX_LEN {
        let mut end = MAX_LEN;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push('…');
    }
    body
}

fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}
