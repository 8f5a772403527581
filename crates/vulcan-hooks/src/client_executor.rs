//! Query executor backed by the HTTP GraphQL client.

use std::collections::HashMap;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;
use vulcan_graphql::{GraphqlClient, GraphqlError, GraphqlQuery, GraphqlResponse};

use crate::executor::{
    FetchMoreRequest, NetworkStatus, QueryError, QueryExecutionResult, QueryExecutor,
};
use crate::options::{ErrorPolicy, FetchPolicy, QueryOptions, QueryVariables};

#[derive(Debug, Clone)]
struct CacheEntry {
    variables: QueryVariables,
    data: Value,
}

/// Runs multi queries through a [`GraphqlClient`], keeping the latest data of
/// each query document in memory.
///
/// Incremental fetches merge into that held data. Polling is left to the
/// caller (see `MultiQuery::spawn_polling`).
#[derive(Debug)]
pub struct ClientExecutor {
    client: GraphqlClient,
    cache: Mutex<HashMap<GraphqlQuery, CacheEntry>>,
}

impl ClientExecutor {
    #[must_use]
    pub fn new(client: GraphqlClient) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn client(&self) -> &GraphqlClient {
        &self.client
    }

    /// Data currently held for `query`.
    pub async fn cached_data(&self, query: &GraphqlQuery) -> Option<Value> {
        self.cache
            .lock()
            .await
            .get(query)
            .map(|entry| entry.data.clone())
    }

    /// Drop the data held for `query`.
    pub async fn evict(&self, query: &GraphqlQuery) {
        self.cache.lock().await.remove(query);
    }

    async fn run(&self, query: &GraphqlQuery, options: &QueryOptions) -> QueryExecutionResult {
        if options.fetch_policy == FetchPolicy::CacheFirst {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache
                .get(query)
                .filter(|entry| entry.variables == options.variables)
            {
                debug!(operation = ?query.operation_name(), "answered from cache");
                return QueryExecutionResult {
                    data: Some(entry.data.clone()),
                    network_status: NetworkStatus::Ready,
                    error: None,
                    variables: options.variables.clone(),
                };
            }
        }

        let response: Result<GraphqlResponse<Value>, _> =
            self.client.query(query, &options.variables).await;
        let (data, error) = match response {
            Ok(response) => apply_error_policy(options.error_policy, response.data, response.errors),
            Err(err) => (None, Some(QueryError::from(err))),
        };

        if options.fetch_policy != FetchPolicy::NoCache {
            if let Some(data) = &data {
                self.cache.lock().await.insert(
                    query.clone(),
                    CacheEntry {
                        variables: options.variables.clone(),
                        data: data.clone(),
                    },
                );
            }
        }

        QueryExecutionResult {
            network_status: if error.is_some() {
                NetworkStatus::Error
            } else {
                NetworkStatus::Ready
            },
            data,
            error,
            variables: options.variables.clone(),
        }
    }

    async fn run_fetch_more(
        &self,
        query: &GraphqlQuery,
        request: FetchMoreRequest,
    ) -> Result<Value, QueryError> {
        let FetchMoreRequest {
            variables,
            update_query,
        } = request;
        let response: GraphqlResponse<Value> = self.client.query(query, &variables).await?;
        if !response.errors.is_empty() {
            return Err(QueryError::graphql(response.errors));
        }
        let fetched = response.data.unwrap_or(Value::Null);

        // Merge against whatever is held now, not what was held when the
        // fetch started.
        let mut cache = self.cache.lock().await;
        let entry = cache.entry(query.clone()).or_insert_with(|| CacheEntry {
            variables,
            data: Value::Null,
        });
        let merged = update_query(&entry.data, &fetched);
        entry.data = merged.clone();
        Ok(merged)
    }
}

fn apply_error_policy(
    policy: ErrorPolicy,
    data: Option<Value>,
    errors: Vec<GraphqlError>,
) -> (Option<Value>, Option<QueryError>) {
    if errors.is_empty() {
        return (data, None);
    }
    match policy {
        ErrorPolicy::None => (None, Some(QueryError::graphql(errors))),
        ErrorPolicy::Ignore => (data, None),
        ErrorPolicy::All => (data, Some(QueryError::graphql(errors))),
    }
}

impl QueryExecutor for ClientExecutor {
    fn execute<'a>(
        &'a self,
        query: &'a GraphqlQuery,
        options: &'a QueryOptions,
    ) -> BoxFuture<'a, QueryExecutionResult> {
        self.run(query, options).boxed()
    }

    fn fetch_more<'a>(
        &'a self,
        query: &'a GraphqlQuery,
        request: FetchMoreRequest,
    ) -> BoxFuture<'a, Result<Value, QueryError>> {
        self.run_fetch_more(query, request).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_policy_shapes_data_and_errors() {
        let data = Some(json!({"movies": null}));
        let errors = vec![GraphqlError::new("partial failure")];

        let (kept, error) = apply_error_policy(ErrorPolicy::All, data.clone(), errors.clone());
        assert_eq!(kept, data);
        assert_eq!(error.map(|e| e.graphql_errors.len()), Some(1));

        let (kept, error) = apply_error_policy(ErrorPolicy::None, data.clone(), errors.clone());
        assert!(kept.is_none());
        assert!(error.is_some());

        let (kept, error) = apply_error_policy(ErrorPolicy::Ignore, data.clone(), errors);
        assert_eq!(kept, data);
        assert!(error.is_none());

        let (kept, error) = apply_error_policy(ErrorPolicy::None, data.clone(), Vec::new());
        assert_eq!(kept, data);
        assert!(error.is_none());
    }
}
