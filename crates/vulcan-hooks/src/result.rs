//! Normalized multi query results and the pagination operations they carry.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use vulcan_graphql::{GraphqlError, GraphqlQuery};

use crate::error::MultiQueryError;
use crate::executor::{
    FetchMoreRequest, NetworkError, NetworkStatus, QueryExecutionResult, QueryExecutor,
};
use crate::input::{DEFAULT_LIMIT, QueryInput};
use crate::multi::PaginationStore;
use crate::options::QueryVariables;
use crate::sink::{ErrorReport, ErrorSink};

/// What a result needs to move the pagination window.
#[derive(Clone)]
pub(crate) struct Pager {
    pub(crate) resolver_name: String,
    pub(crate) query: GraphqlQuery,
    /// Pagination state the result was fetched with.
    pub(crate) pagination: QueryInput,
    pub(crate) initial: QueryInput,
    pub(crate) store: Arc<dyn PaginationStore>,
    pub(crate) executor: Arc<dyn QueryExecutor>,
}

/// Result of one multi query execution.
#[derive(Clone)]
pub struct MultiQueryResult {
    /// Snapshot returned by the executor.
    pub execution: QueryExecutionResult,
    /// First load in flight (status 1).
    pub loading_initial: bool,
    /// Refetch or additional page in flight (status 2 or 3).
    pub loading_more: bool,
    /// `data[resolver].results`, when present.
    pub results: Option<Vec<Value>>,
    /// `data[resolver].totalCount`, when present.
    pub total_count: Option<u64>,
    /// Number of loaded results.
    pub count: Option<usize>,
    pub network_error: Option<NetworkError>,
    /// GraphQL errors carried in the body of a failed HTTP response.
    pub graphql_errors: Option<Vec<GraphqlError>>,
    pub fragment: String,
    pub fragment_name: String,
    pager: Pager,
}

impl std::fmt::Debug for MultiQueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiQueryResult")
            .field("execution", &self.execution)
            .field("loading_initial", &self.loading_initial)
            .field("loading_more", &self.loading_more)
            .field("count", &self.count)
            .field("total_count", &self.total_count)
            .field("resolver_name", &self.pager.resolver_name)
            .field("pagination", &self.pager.pagination)
            .finish_non_exhaustive()
    }
}

impl MultiQueryResult {
    pub(crate) fn new(
        execution: QueryExecutionResult,
        fragment: String,
        fragment_name: String,
        pager: Pager,
        sink: &dyn ErrorSink,
    ) -> Self {
        let (results, total_count) = extract_page(execution.data.as_ref(), &pager.resolver_name);
        let network_error = execution
            .error
            .as_ref()
            .and_then(|error| error.network_error.clone());
        let graphql_errors = network_graphql_errors(network_error.as_ref());

        if let Some(error) = &execution.error {
            sink.report(&ErrorReport {
                resolver_name: &pager.resolver_name,
                variables: &execution.variables,
                error,
            });
        }

        let status = execution.network_status;
        Self {
            loading_initial: status == NetworkStatus::Loading,
            loading_more: matches!(
                status,
                NetworkStatus::SetVariables | NetworkStatus::FetchMore
            ),
            count: results.as_ref().map(Vec::len),
            results,
            total_count,
            network_error,
            graphql_errors,
            fragment,
            fragment_name,
            execution,
            pager,
        }
    }

    /// Raw response data.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.execution.data.as_ref()
    }

    #[must_use]
    pub const fn network_status(&self) -> NetworkStatus {
        self.execution.network_status
    }

    /// Pagination state this result was fetched with.
    #[must_use]
    pub const fn pagination(&self) -> &QueryInput {
        &self.pager.pagination
    }

    /// Decode the loaded results into `T`.
    pub fn results_as<T: DeserializeOwned>(&self) -> Result<Option<Vec<T>>, MultiQueryError> {
        self.results
            .as_ref()
            .map(|items| {
                items
                    .iter()
                    .map(|item| T::deserialize(item).map_err(MultiQueryError::from))
                    .collect()
            })
            .transpose()
    }

    /// Grow the window by one initial page, or install `input` as the new
    /// pagination state.
    ///
    /// Only the state changes; the next execution refetches the whole window.
    pub fn load_more(&self, input: Option<QueryInput>) -> Result<(), MultiQueryError> {
        let next = match input {
            Some(input) => input,
            None => {
                let loaded = self.loaded_len()?;
                let page = self.pager.initial.limit.unwrap_or(DEFAULT_LIMIT);
                QueryInput {
                    limit: Some(loaded + page),
                    ..self.pager.pagination.clone()
                }
            }
        };
        debug!(
            resolver = %self.pager.resolver_name,
            limit = ?next.limit,
            offset = ?next.offset,
            "pagination window replaced"
        );
        self.pager.store.set(next);
        Ok(())
    }

    /// Fetch the page after the loaded results and append it to the held data.
    ///
    /// `input` (or the current pagination with `offset` at the loaded count)
    /// is layered over the executed input, so filters and sorting carry over.
    /// Pagination state is left untouched. Do not combine with polling: a
    /// poll replaces the appended pages.
    pub async fn load_more_incremental(
        &self,
        input: Option<QueryInput>,
    ) -> Result<Value, MultiQueryError> {
        let next = match input {
            Some(input) => input,
            None => QueryInput {
                offset: Some(self.loaded_len()?),
                ..self.pager.pagination.clone()
            },
        };
        let mut fetch_input = self.execution.variables.input.clone();
        fetch_input.merge(&next);

        let resolver_name = self.pager.resolver_name.clone();
        let request = FetchMoreRequest {
            variables: QueryVariables { input: fetch_input },
            update_query: Box::new(move |previous, fetched| {
                append_page(&resolver_name, previous, fetched)
            }),
        };
        debug!(
            resolver = %self.pager.resolver_name,
            offset = ?request.variables.input.offset,
            "fetching more results"
        );
        let merged = self
            .pager
            .executor
            .fetch_more(&self.pager.query, request)
            .await?;
        Ok(merged)
    }

    fn loaded_len(&self) -> Result<u64, MultiQueryError> {
        self.results
            .as_ref()
            .map(|results| results.len() as u64)
            .ok_or(MultiQueryError::NoResults)
    }
}

/// Read `data[resolver].results` and `data[resolver].totalCount`.
pub(crate) fn extract_page(
    data: Option<&Value>,
    resolver_name: &str,
) -> (Option<Vec<Value>>, Option<u64>) {
    let Some(page) = data.and_then(|data| data.get(resolver_name)) else {
        return (None, None);
    };
    let results = page
        .get("results")
        .and_then(Value::as_array)
        .cloned();
    let total_count = page.get("totalCount").and_then(Value::as_u64);
    (results, total_count)
}

/// `networkError.result.errors`, if every level is present and well formed.
fn network_graphql_errors(network_error: Option<&NetworkError>) -> Option<Vec<GraphqlError>> {
    let errors = network_error?.result.as_ref()?.get("errors")?;
    serde_json::from_value(errors.clone()).ok()
}

/// Append the fetched page to the previous data under `resolver_name`.
///
/// An empty or missing page keeps the previous data. Otherwise a fresh
/// container is returned; every other top-level field is carried over.
pub(crate) fn append_page(resolver_name: &str, previous: &Value, fetched: &Value) -> Value {
    let Some(new_items) = fetched
        .get(resolver_name)
        .and_then(|page| page.get("results"))
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
    else {
        return previous.clone();
    };

    let mut root = previous.as_object().cloned().unwrap_or_default();
    let page = root
        .entry(resolver_name.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !page.is_object() {
        *page = Value::Object(Map::new());
    }
    if let Value::Object(page) = page {
        let mut results = page
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        results.extend(new_items.iter().cloned());
        page.insert("results".to_string(), Value::Array(results));
    }
    Value::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_results_and_total() {
        let data = json!({"movies": {"results": [{"_id": "a"}, {"_id": "b"}], "totalCount": 10}});
        let (results, total) = extract_page(Some(&data), "movies");
        assert_eq!(results.map(|r| r.len()), Some(2));
        assert_eq!(total, Some(10));
    }

    #[test]
    fn missing_levels_yield_none() {
        assert_eq!(extract_page(None, "movies"), (None, None));
        assert_eq!(extract_page(Some(&json!({})), "movies"), (None, None));
        assert_eq!(
            extract_page(Some(&json!({"movies": null})), "movies"),
            (None, None)
        );
        assert_eq!(
            extract_page(Some(&json!({"movies": {"totalCount": 3}})), "movies"),
            (None, Some(3))
        );
    }

    #[test]
    fn network_errors_are_read_defensively() {
        assert!(network_graphql_errors(None).is_none());
        let bare = NetworkError {
            message: "timeout".to_string(),
            status_code: None,
            result: None,
        };
        assert!(network_graphql_errors(Some(&bare)).is_none());

        let without_errors = NetworkError {
            result: Some(json!({"data": null})),
            ..bare.clone()
        };
        assert!(network_graphql_errors(Some(&without_errors)).is_none());

        let malformed = NetworkError {
            result: Some(json!({"errors": "nope"})),
            ..bare.clone()
        };
        assert!(network_graphql_errors(Some(&malformed)).is_none());

        let with_errors = NetworkError {
            result: Some(json!({"errors": [{"message": "Unknown argument"}]})),
            ..bare
        };
        let errors = network_graphql_errors(Some(&with_errors)).expect("errors");
        assert_eq!(errors[0].message, "Unknown argument");
    }

    #[test]
    fn append_concatenates_and_keeps_other_fields() {
        let previous = json!({
            "movies": {"results": ["a", "b"], "totalCount": 4, "__typename": "MultiMovieOutput"},
            "currentUser": {"_id": "u1"}
        });
        let fetched = json!({"movies": {"results": ["c", "d"], "totalCount": 4}});
        let merged = append_page("movies", &previous, &fetched);
        assert_eq!(
            merged,
            json!({
                "movies": {"results": ["a", "b", "c", "d"], "totalCount": 4, "__typename": "MultiMovieOutput"},
                "currentUser": {"_id": "u1"}
            })
        );
        assert_eq!(previous["movies"]["results"], json!(["a", "b"]));
    }

    #[test]
    fn empty_or_missing_page_keeps_previous() {
        let previous = json!({"movies": {"results": ["a", "b"]}});
        assert_eq!(
            append_page("movies", &previous, &json!({"movies": {"results": []}})),
            previous
        );
        assert_eq!(append_page("movies", &previous, &json!({})), previous);
        assert_eq!(append_page("movies", &previous, &Value::Null), previous);
    }

    #[test]
    fn append_onto_missing_previous_page() {
        let merged = append_page("movies", &Value::Null, &json!({"movies": {"results": ["x"]}}));
        assert_eq!(merged, json!({"movies": {"results": ["x"]}}));
    }
}
