//! Mock GraphQL endpoint for testing the HTTP client and executor.

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A wiremock server answering GraphQL POSTs on `/`.
///
/// Mocks are matched in mounting order; a mock limited with `times` stops
/// matching once used up.
pub struct MockGraphqlServer {
    server: MockServer,
}

impl MockGraphqlServer {
    /// Start a new mock server.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Endpoint URL.
    #[must_use]
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Underlying wiremock server for custom mocks.
    #[must_use]
    pub const fn inner(&self) -> &MockServer {
        &self.server
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Response Setup
    // ─────────────────────────────────────────────────────────────────────────

    /// Answer every query with `{"data": data}`.
    pub async fn respond_data(&self, data: Value) {
        self.respond_json(200, json!({ "data": data }), None).await;
    }

    /// Answer the next `times` queries with `{"data": data}`.
    pub async fn respond_data_times(&self, data: Value, times: u64) {
        self.respond_json(200, json!({ "data": data }), Some(times))
            .await;
    }

    /// Answer queries whose `variables.input` contains `input` with
    /// `{"data": data}`.
    pub async fn respond_data_for_input(&self, input: Value, data: Value) {
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({ "variables": { "input": input } })))
            .respond_with(json_response(200, json!({ "data": data })))
            .mount(&self.server)
            .await;
    }

    /// Answer every query with a 200 carrying `data` and GraphQL `errors`.
    pub async fn respond_errors(&self, data: Value, errors: Value) {
        self.respond_json(200, json!({ "data": data, "errors": errors }), None)
            .await;
    }

    /// Answer the next `times` queries (every query when `None`) with
    /// `status` and a JSON body.
    pub async fn respond_status(&self, status: u16, body: Value, times: Option<u64>) {
        self.respond_json(status, body, times).await;
    }

    /// Answer every query with `{"data": data}` after `delay`.
    pub async fn respond_delayed(&self, data: Value, delay: Duration) {
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(json_response(200, json!({ "data": data })).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    async fn respond_json(&self, status: u16, body: Value, times: Option<u64>) {
        let mock = Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(json_response(status, body));
        let mock = match times {
            Some(times) => mock.up_to_n_times(times),
            None => mock,
        };
        mock.mount(&self.server).await;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request Inspection
    // ─────────────────────────────────────────────────────────────────────────

    /// JSON bodies of every request received, oldest first.
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }

    /// Headers of the most recent request.
    pub async fn last_headers(&self) -> Vec<(String, String)> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .last()
            .map(|request| {
                request
                    .headers
                    .iter()
                    .map(|(name, value)| {
                        (
                            name.to_string(),
                            value.to_str().unwrap_or_default().to_string(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of requests received.
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}

fn json_response(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .set_body_json(body)
        .insert_header("content-type", "application/json")
}
