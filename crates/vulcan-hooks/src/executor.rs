//! The query execution seam and the result shapes crossing it.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vulcan_graphql::{GraphqlClientError, GraphqlError, GraphqlQuery};

use crate::options::{QueryOptions, QueryVariables};

/// Execution phase of a query, numbered like Apollo's `NetworkStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum NetworkStatus {
    /// First load, no data yet.
    Loading,
    /// Variables changed, refetching.
    SetVariables,
    /// Fetching an additional page.
    FetchMore,
    /// Explicit refetch.
    Refetch,
    /// Polling refresh.
    Poll,
    /// Settled with data.
    Ready,
    /// Settled with an error.
    Error,
}

impl NetworkStatus {
    /// Numeric code of the status.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Loading => 1,
            Self::SetVariables => 2,
            Self::FetchMore => 3,
            Self::Refetch => 4,
            Self::Poll => 6,
            Self::Ready => 7,
            Self::Error => 8,
        }
    }

    /// Status for a numeric code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::Loading,
            2 => Self::SetVariables,
            3 => Self::FetchMore,
            4 => Self::Refetch,
            6 => Self::Poll,
            7 => Self::Ready,
            8 => Self::Error,
            _ => return None,
        })
    }

    /// Whether a request is still running.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        self.code() < 7
    }
}

impl From<NetworkStatus> for u8 {
    fn from(status: NetworkStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for NetworkStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, String> {
        Self::from_code(code).ok_or_else(|| format!("unknown network status {code}"))
    }
}

/// Failure below the GraphQL layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Parsed body of the failed response, when it was JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Error attached to an execution result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryError {
    #[serde(default)]
    pub graphql_errors: Vec<GraphqlError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_error: Option<NetworkError>,
}

impl QueryError {
    /// Error made of GraphQL errors only.
    #[must_use]
    pub const fn graphql(errors: Vec<GraphqlError>) -> Self {
        Self {
            graphql_errors: errors,
            network_error: None,
        }
    }

    /// Error made of a network failure only.
    #[must_use]
    pub const fn network(error: NetworkError) -> Self {
        Self {
            graphql_errors: Vec::new(),
            network_error: Some(error),
        }
    }

    /// Human-readable summary.
    #[must_use]
    pub fn message(&self) -> String {
        if let Some(network) = &self.network_error {
            return format!("Network error: {}", network.message);
        }
        let messages: Vec<&str> = self
            .graphql_errors
            .iter()
            .map(|error| error.message.as_str())
            .collect();
        format!("GraphQL error: {}", messages.join("; "))
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for QueryError {}

impl From<GraphqlClientError> for QueryError {
    fn from(err: GraphqlClientError) -> Self {
        match err {
            GraphqlClientError::GraphqlErrors { errors } => Self::graphql(errors),
            other => Self::network(NetworkError {
                message: other.to_string(),
                status_code: other.status_code(),
                result: other.response_body_json(),
            }),
        }
    }
}

/// Snapshot produced by the query executor.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExecutionResult {
    pub data: Option<Value>,
    pub network_status: NetworkStatus,
    pub error: Option<QueryError>,
    /// Variables the snapshot was fetched with.
    pub variables: QueryVariables,
}

impl QueryExecutionResult {
    /// Snapshot of a query that has not produced anything yet.
    #[must_use]
    pub const fn loading(variables: QueryVariables) -> Self {
        Self {
            data: None,
            network_status: NetworkStatus::Loading,
            error: None,
            variables,
        }
    }
}

/// Merge of previously held data with a freshly fetched page.
pub type UpdateQuery = Box<dyn FnOnce(&Value, &Value) -> Value + Send>;

/// Request for additional results of a running query.
pub struct FetchMoreRequest {
    pub variables: QueryVariables,
    /// Called once with `(previous, fetched)` against the data current when
    /// the fetch resolves; its return value replaces the held data.
    pub update_query: UpdateQuery,
}

impl std::fmt::Debug for FetchMoreRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchMoreRequest")
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}

/// Executes multi queries on behalf of the adapter.
///
/// Implementations own transport, caching and retries. `execute` never fails:
/// errors are carried in the returned snapshot.
pub trait QueryExecutor: Send + Sync {
    /// Run `query` with `options` and return the settled snapshot.
    fn execute<'a>(
        &'a self,
        query: &'a GraphqlQuery,
        options: &'a QueryOptions,
    ) -> BoxFuture<'a, QueryExecutionResult>;

    /// Fetch more results of `query` and merge them into the held data.
    ///
    /// Returns the merged data.
    fn fetch_more<'a>(
        &'a self,
        query: &'a GraphqlQuery,
        request: FetchMoreRequest,
    ) -> BoxFuture<'a, Result<Value, QueryError>>;
}
