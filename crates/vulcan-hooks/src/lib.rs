//! Vulcan Hooks - paginated list queries over GraphQL models.
//!
//! [`MultiQuery`] builds the list query of a [`vulcan_graphql::GraphqlModel`],
//! merges defaults, static options, per-call input and pagination state into
//! execution options, hands them to a [`QueryExecutor`], and normalizes the
//! snapshot it returns into a [`MultiQueryResult`] with loading flags, the
//! result list, counts and two ways to load more.
//!
//! ```rust,ignore
//! let executor = Arc::new(ClientExecutor::new(GraphqlClientBuilder::new(url).build()?));
//! let movies = MultiQuery::new(&model, MultiOptions::default(), MultiProps::default(), executor)?;
//! let page = movies.execute().await;
//! page.load_more(None)?;
//! let bigger_page = movies.execute().await;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

mod client_executor;
mod error;
mod executor;
mod input;
mod multi;
mod options;
mod result;
mod sink;

pub use client_executor::ClientExecutor;
pub use error::MultiQueryError;
pub use executor::{
    FetchMoreRequest, NetworkError, NetworkStatus, QueryError, QueryExecutionResult,
    QueryExecutor, UpdateQuery,
};
pub use input::{DEFAULT_LIMIT, QueryInput, deep_merge};
pub use multi::{MultiQuery, PaginationStore, SharedPaginationStore, use_multi};
pub use options::{
    DEFAULT_POLL_INTERVAL, ErrorPolicy, ExecutionContext, FetchPolicy, MultiOptions, MultiProps,
    QueryOptions, QueryOptionsOverride, QueryVariables, build_multi_query_options,
    initial_pagination_input,
};
pub use result::MultiQueryResult;
pub use sink::{ErrorReport, ErrorSink, TracingErrorSink};
