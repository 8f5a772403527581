//! Adapter error type.

use thiserror::Error;
use vulcan_graphql::QueryBuildError;

use crate::executor::QueryError;

/// Errors raised by the multi query adapter itself.
///
/// Query failures are not among them: those travel inside the result.
#[derive(Debug, Error)]
pub enum MultiQueryError {
    /// The query document could not be built.
    #[error("failed to build multi query: {0}")]
    Build(#[from] QueryBuildError),

    /// Loading more needs a loaded page or an explicit input.
    #[error("no results loaded; pass an explicit input to load more")]
    NoResults,

    /// The incremental fetch failed.
    #[error("fetch more failed: {0}")]
    FetchMore(#[from] QueryError),

    /// Results did not match the requested item type.
    #[error("failed to decode results: {0}")]
    Decode(#[from] serde_json::Error),
}
