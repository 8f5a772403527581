//! Vulcan Test Kit - fixtures and mocks for testing multi queries.
//!
//! - [`MockExecutor`] - scripted query executor recording what it was asked
//! - [`RecordingErrorSink`] - error sink keeping every report
//! - [`MockGraphqlServer`] - wiremock-backed GraphQL endpoint
//! - [`fixtures`] - a sample model and response builders
//! - Tracing configuration for test output
//!
//! # Example
//!
//! ```rust,ignore
//! use vulcan_testkit::{MockExecutor, fixtures};
//!
//! let executor = Arc::new(MockExecutor::new());
//! executor.push_result(fixtures::ready(fixtures::movies_data(&["a", "b"], 2)));
//! let multi = MultiQuery::new(&fixtures::movie_model(), MultiOptions::default(), MultiProps::default(), executor.clone())?;
//! assert_eq!(multi.execute().await.count, Some(2));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_panics_doc)]

pub mod fixtures;
mod mock_executor;
mod mock_server;
mod tracing_config;

pub use mock_executor::*;
pub use mock_server::*;
pub use tracing_config::*;
