//! Test fixtures: a sample model and response builders.

use serde_json::{Value, json};
use vulcan_graphql::GraphqlModel;
use vulcan_hooks::{NetworkStatus, QueryExecutionResult, QueryVariables};

// ─────────────────────────────────────────────────────────────────────────────
// Models
// ─────────────────────────────────────────────────────────────────────────────

/// `Movie` / `Movies` model with an `_id name year` default fragment.
#[must_use]
pub fn movie_model() -> GraphqlModel {
    GraphqlModel::new("Movie", "Movies")
        .and_then(|model| model.with_default_fields(&["_id", "name", "year"]))
        .expect("movie fixture model is valid")
}

// ─────────────────────────────────────────────────────────────────────────────
// Response data
// ─────────────────────────────────────────────────────────────────────────────

/// One movie document.
#[must_use]
pub fn movie(id: &str) -> Value {
    json!({"_id": id, "name": format!("Movie {id}"), "year": 1999})
}

/// `data` of a multi movie response.
#[must_use]
pub fn movies_data(ids: &[&str], total_count: u64) -> Value {
    json!({
        "movies": {
            "results": ids.iter().map(|id| movie(id)).collect::<Vec<_>>(),
            "totalCount": total_count,
            "__typename": "MultiMovieOutput"
        }
    })
}

/// A fetched page carrying `ids` only.
#[must_use]
pub fn movies_page(ids: &[&str]) -> Value {
    json!({
        "movies": {
            "results": ids.iter().map(|id| movie(id)).collect::<Vec<_>>()
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Execution snapshots
// ─────────────────────────────────────────────────────────────────────────────

/// Settled snapshot carrying `data`.
#[must_use]
pub fn ready(data: Value) -> QueryExecutionResult {
    with_status(Some(data), NetworkStatus::Ready)
}

/// Snapshot in `status`, optionally carrying `data`.
#[must_use]
pub fn with_status(data: Option<Value>, status: NetworkStatus) -> QueryExecutionResult {
    QueryExecutionResult {
        data,
        network_status: status,
        error: None,
        variables: QueryVariables::default(),
    }
}
