//! Vulcan GraphQL - model descriptors, query templates and HTTP transport.
//!
//! This crate provides:
//! - Model descriptors naming the GraphQL types and resolvers of a data model.
//! - The multi-item query template and query builder.
//! - An HTTP GraphQL client with retry, backoff and in-flight deduplication.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]

mod client;
mod error;
mod model;
mod operation;
mod retry;
mod template;

pub use client::{
    GraphqlClient, GraphqlClientBuilder, GraphqlClientConfig, GraphqlClientMetrics,
    GraphqlClientMetricsSnapshot,
};
pub use error::{
    GraphqlClientError, GraphqlError, GraphqlErrorLocation, GraphqlPathSegment, HttpErrorInfo,
    ModelError, QueryBuildError,
};
pub use model::{GraphqlModel, fragment_name_of, resolver_name_of};
pub use operation::{GraphqlQuery, GraphqlRequest, GraphqlResponse};
pub use retry::{RetryDecision, RetryPolicy, RetryStrategy};
pub use template::{BuildMultiQueryArgs, MultiTemplateArgs, build_multi_query, multi_client_template};
