//! Multi query options and their merge into execution options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::input::{DEFAULT_LIMIT, QueryInput};

/// Polling interval used when the caller does not set one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);

/// How GraphQL errors affect the returned data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Errors discard the data.
    #[default]
    None,
    /// Errors are dropped, data is kept.
    Ignore,
    /// Data and errors are both returned.
    All,
}

/// Where results may be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Answer from the executor cache when the same variables were fetched.
    #[default]
    CacheFirst,
    /// Always hit the network, then store the result.
    NetworkOnly,
    /// Always hit the network and never store.
    NoCache,
}

/// Whether a user can observe the query results as they change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionContext {
    /// Results are displayed and refreshed live.
    #[default]
    Interactive,
    /// Server-side rendering, batch jobs and other one-shot contexts.
    Headless,
}

/// Variables of a multi query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryVariables {
    pub input: QueryInput,
}

/// Raw execution options supplied by the caller; every set field wins over
/// the computed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptionsOverride {
    /// `Some(None)` disables polling.
    pub poll_interval: Option<Option<Duration>>,
    pub error_policy: Option<ErrorPolicy>,
    pub fetch_policy: Option<FetchPolicy>,
    /// Replaces the merged variables entirely.
    pub variables: Option<QueryVariables>,
}

/// Options accepted by the multi query adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiOptions {
    /// Static query input.
    pub input: Option<QueryInput>,
    /// Initial page size when `input.limit` is unset.
    pub limit: Option<u64>,
    /// Polling interval; `None` disables polling.
    pub poll_interval: Option<Duration>,
    /// Fragment text overriding the model default.
    pub fragment: Option<String>,
    /// Fragment name overriding the model default.
    pub fragment_name: Option<String>,
    /// Extra root fields fetched alongside the list.
    pub extra_queries: Option<String>,
    pub query_options: QueryOptionsOverride,
    pub context: ExecutionContext,
}

impl Default for MultiOptions {
    fn default() -> Self {
        Self {
            input: None,
            limit: None,
            poll_interval: Some(DEFAULT_POLL_INTERVAL),
            fragment: None,
            fragment_name: None,
            extra_queries: None,
            query_options: QueryOptionsOverride::default(),
            context: ExecutionContext::Interactive,
        }
    }
}

impl MultiOptions {
    #[must_use]
    pub fn with_input(mut self, input: QueryInput) -> Self {
        self.input = Some(input);
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Option<Duration>) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Use `fragment` instead of the model default; its name is read from the
    /// text unless set with [`Self::with_fragment_name`].
    #[must_use]
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    #[must_use]
    pub fn with_fragment_name(mut self, name: impl Into<String>) -> Self {
        self.fragment_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_extra_queries(mut self, extra: impl Into<String>) -> Self {
        self.extra_queries = Some(extra.into());
        self
    }

    #[must_use]
    pub fn with_query_options(mut self, overrides: QueryOptionsOverride) -> Self {
        self.query_options = overrides;
        self
    }

    #[must_use]
    pub const fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }
}

/// Per-call input of the adapter, layered over [`MultiOptions::input`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiProps {
    pub input: Option<QueryInput>,
}

impl MultiProps {
    #[must_use]
    pub const fn new(input: QueryInput) -> Self {
        Self { input: Some(input) }
    }
}

/// Options handed to the query executor.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub variables: QueryVariables,
    pub poll_interval: Option<Duration>,
    pub error_policy: ErrorPolicy,
    pub fetch_policy: FetchPolicy,
}

/// Pagination input at activation: the limit only.
///
/// The limit is the first one set among the per-call input, the static
/// input, the static `limit` option and [`DEFAULT_LIMIT`].
#[must_use]
pub fn initial_pagination_input(options: &MultiOptions, props: &MultiProps) -> QueryInput {
    let limit = props
        .input
        .as_ref()
        .and_then(|input| input.limit)
        .or_else(|| options.input.as_ref().and_then(|input| input.limit))
        .or(options.limit)
        .unwrap_or(DEFAULT_LIMIT);
    QueryInput::with_limit(limit)
}

/// Compute the execution options of one query run.
///
/// The input is `defaults ⊕ options.input ⊕ (options.input ⊕ props.input) ⊕
/// pagination`, later layers winning field by field.
#[must_use]
pub fn build_multi_query_options(
    options: &MultiOptions,
    pagination: &QueryInput,
    props: &MultiProps,
) -> QueryOptions {
    let empty = QueryInput::default();
    let options_input = options.input.as_ref().unwrap_or(&empty);
    let props_input = props.input.as_ref().unwrap_or(&empty);

    let dynamic_input = QueryInput::merged([options_input, props_input]);
    let input = QueryInput::merged([
        &QueryInput::defaults(),
        options_input,
        &dynamic_input,
        pagination,
    ]);

    let poll_interval = match options.context {
        ExecutionContext::Interactive => options.poll_interval.filter(|d| !d.is_zero()),
        ExecutionContext::Headless => None,
    };

    let overrides = &options.query_options;
    QueryOptions {
        variables: overrides
            .variables
            .clone()
            .unwrap_or(QueryVariables { input }),
        poll_interval: overrides.poll_interval.unwrap_or(poll_interval),
        error_policy: overrides.error_policy.unwrap_or(ErrorPolicy::All),
        fetch_policy: overrides.fetch_policy.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initial_limit_precedence() {
        let options = MultiOptions::default()
            .with_limit(7)
            .with_input(QueryInput::with_limit(9));
        let props = MultiProps::new(QueryInput::with_limit(11));
        assert_eq!(
            initial_pagination_input(&options, &props),
            QueryInput::with_limit(11)
        );
        assert_eq!(
            initial_pagination_input(&options, &MultiProps::default()),
            QueryInput::with_limit(9)
        );
        let options = MultiOptions::default().with_limit(7);
        assert_eq!(
            initial_pagination_input(&options, &MultiProps::default()),
            QueryInput::with_limit(7)
        );
        assert_eq!(
            initial_pagination_input(&MultiOptions::default(), &MultiProps::default()),
            QueryInput::with_limit(DEFAULT_LIMIT)
        );
    }

    #[test]
    fn merged_input_layers_all_sources() {
        let options = MultiOptions::default().with_input(QueryInput {
            filter: Some(json!({"year": {"_gte": 1990}})),
            sort: Some(json!({"name": "asc"})),
            enable_cache: Some(true),
            ..QueryInput::default()
        });
        let props = MultiProps::new(QueryInput {
            filter: Some(json!({"genre": {"_eq": "scifi"}})),
            search: Some("alien".to_string()),
            ..QueryInput::default()
        });
        let pagination = QueryInput {
            limit: Some(40),
            offset: Some(20),
            ..QueryInput::default()
        };

        let built = build_multi_query_options(&options, &pagination, &props);
        assert_eq!(
            serde_json::to_value(&built.variables).expect("serialize"),
            json!({
                "input": {
                    "filter": {"year": {"_gte": 1990}, "genre": {"_eq": "scifi"}},
                    "sort": {"name": "asc"},
                    "search": "alien",
                    "offset": 20,
                    "limit": 40,
                    "enableTotal": true,
                    "enableCache": true
                }
            })
        );
        assert_eq!(built.poll_interval, Some(DEFAULT_POLL_INTERVAL));
        assert_eq!(built.error_policy, ErrorPolicy::All);
        assert_eq!(built.fetch_policy, FetchPolicy::CacheFirst);
    }

    #[test]
    fn headless_context_disables_polling() {
        let options = MultiOptions::default()
            .with_poll_interval(Some(Duration::from_secs(5)))
            .with_context(ExecutionContext::Headless);
        let built = build_multi_query_options(
            &options,
            &QueryInput::with_limit(20),
            &MultiProps::default(),
        );
        assert_eq!(built.poll_interval, None);
    }

    #[test]
    fn zero_interval_means_no_polling() {
        let options = MultiOptions::default().with_poll_interval(Some(Duration::ZERO));
        let built = build_multi_query_options(
            &options,
            &QueryInput::with_limit(20),
            &MultiProps::default(),
        );
        assert_eq!(built.poll_interval, None);
    }

    #[test]
    fn raw_options_override_computed_values() {
        let overrides = QueryOptionsOverride {
            poll_interval: Some(Some(Duration::from_secs(1))),
            error_policy: Some(ErrorPolicy::None),
            fetch_policy: Some(FetchPolicy::NetworkOnly),
            variables: Some(QueryVariables {
                input: QueryInput::with_limit(3),
            }),
        };
        let options = MultiOptions::default()
            .with_context(ExecutionContext::Headless)
            .with_query_options(overrides);
        let built = build_multi_query_options(
            &options,
            &QueryInput::with_limit(20),
            &MultiProps::default(),
        );
        assert_eq!(built.variables.input, QueryInput::with_limit(3));
        assert_eq!(built.poll_interval, Some(Duration::from_secs(1)));
        assert_eq!(built.error_policy, ErrorPolicy::None);
        assert_eq!(built.fetch_policy, FetchPolicy::NetworkOnly);
    }

    #[test]
    fn policies_serialize_like_graphql_clients() {
        assert_eq!(serde_json::to_value(ErrorPolicy::All).expect("json"), json!("all"));
        assert_eq!(
            serde_json::to_value(FetchPolicy::CacheFirst).expect("json"),
            json!("cache-first")
        );
    }
}
