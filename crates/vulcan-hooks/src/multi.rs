//! The multi query adapter.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use vulcan_graphql::{
    BuildMultiQueryArgs, GraphqlModel, GraphqlQuery, build_multi_query, fragment_name_of,
};

use crate::error::MultiQueryError;
use crate::executor::QueryExecutor;
use crate::input::QueryInput;
use crate::options::{
    FetchPolicy, MultiOptions, MultiProps, QueryOptions, build_multi_query_options,
    initial_pagination_input,
};
use crate::result::{MultiQueryResult, Pager};
use crate::sink::{ErrorSink, TracingErrorSink};

/// Holder of the pagination state of one adapter.
///
/// Owned by the calling context; the adapter reads it before every execution
/// and results write it through [`MultiQueryResult::load_more`].
pub trait PaginationStore: Send + Sync {
    /// Current state, `None` before initialization.
    fn get(&self) -> Option<QueryInput>;

    /// Replace the state wholesale.
    fn set(&self, input: QueryInput);

    /// Current state, installing `initial` when there is none yet.
    fn get_or_init(&self, initial: &QueryInput) -> QueryInput {
        self.get().unwrap_or_else(|| {
            self.set(initial.clone());
            initial.clone()
        })
    }
}

/// In-memory pagination store; clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct SharedPaginationStore {
    inner: Arc<Mutex<Option<QueryInput>>>,
}

impl SharedPaginationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the state; the next adapter activation re-initializes it.
    pub fn clear(&self) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl PaginationStore for SharedPaginationStore {
    fn get(&self) -> Option<QueryInput> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, input: QueryInput) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(input);
    }
}

/// Paginated list query over one model.
pub struct MultiQuery {
    resolver_name: String,
    options: MultiOptions,
    props: MultiProps,
    fragment: String,
    fragment_name: String,
    query: GraphqlQuery,
    initial_pagination: QueryInput,
    store: Arc<dyn PaginationStore>,
    executor: Arc<dyn QueryExecutor>,
    sink: Arc<dyn ErrorSink>,
}

impl std::fmt::Debug for MultiQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiQuery")
            .field("resolver_name", &self.resolver_name)
            .field("fragment_name", &self.fragment_name)
            .field("options", &self.options)
            .field("props", &self.props)
            .field("pagination", &self.pagination_input())
            .finish_non_exhaustive()
    }
}

impl MultiQuery {
    /// Build the query for `model` and initialize a private pagination store.
    ///
    /// The fragment comes from the options, else the model default. Its name
    /// comes from the options, else the supplied fragment text, else the
    /// model default.
    pub fn new(
        model: &GraphqlModel,
        options: MultiOptions,
        props: MultiProps,
        executor: Arc<dyn QueryExecutor>,
    ) -> Result<Self, MultiQueryError> {
        let fragment = options
            .fragment
            .clone()
            .unwrap_or_else(|| model.default_fragment().to_string());
        let fragment_name = options
            .fragment_name
            .clone()
            .or_else(|| {
                options
                    .fragment
                    .as_deref()
                    .and_then(fragment_name_of)
                    .map(ToString::to_string)
            })
            .unwrap_or_else(|| model.default_fragment_name().to_string());

        let query = build_multi_query(BuildMultiQueryArgs {
            type_name: model.type_name(),
            multi_type_name: model.multi_type_name(),
            fragment_name: &fragment_name,
            fragment: &fragment,
            extra_queries: options.extra_queries.as_deref(),
        })?;

        let initial_pagination = initial_pagination_input(&options, &props);
        let store: Arc<dyn PaginationStore> = Arc::new(SharedPaginationStore::new());
        store.get_or_init(&initial_pagination);

        Ok(Self {
            resolver_name: model.multi_resolver_name().to_string(),
            options,
            props,
            fragment,
            fragment_name,
            query,
            initial_pagination,
            store,
            executor,
            sink: Arc::new(TracingErrorSink::default()),
        })
    }

    /// Keep pagination state in `store`, initializing it if empty.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn PaginationStore>) -> Self {
        store.get_or_init(&self.initial_pagination);
        self.store = store;
        self
    }

    /// Report query errors to `sink` instead of the log.
    #[must_use]
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the per-call input; pagination state is kept.
    pub fn set_props(&mut self, props: MultiProps) {
        self.props = props;
    }

    #[must_use]
    pub const fn query(&self) -> &GraphqlQuery {
        &self.query
    }

    #[must_use]
    pub fn resolver_name(&self) -> &str {
        &self.resolver_name
    }

    #[must_use]
    pub const fn initial_pagination(&self) -> &QueryInput {
        &self.initial_pagination
    }

    /// Current pagination state.
    #[must_use]
    pub fn pagination_input(&self) -> QueryInput {
        self.store
            .get()
            .unwrap_or_else(|| self.initial_pagination.clone())
    }

    /// Execution options for the current pagination state.
    #[must_use]
    pub fn query_options(&self) -> QueryOptions {
        build_multi_query_options(&self.options, &self.pagination_input(), &self.props)
    }

    /// Run one execution cycle and normalize its result.
    pub async fn execute(&self) -> MultiQueryResult {
        self.execute_with(self.query_options()).await
    }

    async fn execute_with(&self, options: QueryOptions) -> MultiQueryResult {
        debug!(
            resolver = %self.resolver_name,
            limit = ?options.variables.input.limit,
            offset = ?options.variables.input.offset,
            fetch_policy = ?options.fetch_policy,
            "executing multi query"
        );
        let pagination = self.pagination_input();
        let execution = self.executor.execute(&self.query, &options).await;
        MultiQueryResult::new(
            execution,
            self.fragment.clone(),
            self.fragment_name.clone(),
            Pager {
                resolver_name: self.resolver_name.clone(),
                query: self.query.clone(),
                pagination,
                initial: self.initial_pagination.clone(),
                store: Arc::clone(&self.store),
                executor: Arc::clone(&self.executor),
            },
            self.sink.as_ref(),
        )
    }

    /// Re-run the query from the network every poll interval and send each
    /// result to `sender`.
    ///
    /// Returns `None` when polling is disabled. The task stops once the
    /// receiver is dropped.
    pub fn spawn_polling(
        self: &Arc<Self>,
        sender: mpsc::Sender<MultiQueryResult>,
    ) -> Option<JoinHandle<()>> {
        let interval = self.query_options().poll_interval?;
        let this = Arc::clone(self);
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut options = this.query_options();
                options.fetch_policy = FetchPolicy::NetworkOnly;
                let result = this.execute_with(options).await;
                if sender.send(result).await.is_err() {
                    debug!(resolver = %this.resolver_name, "polling stopped");
                    break;
                }
            }
        }))
    }
}

/// One execution of a multi query whose pagination state lives in `store`.
///
/// Calling it again with the same store continues where
/// [`MultiQueryResult::load_more`] left the window.
pub async fn use_multi(
    model: &GraphqlModel,
    options: MultiOptions,
    props: MultiProps,
    executor: Arc<dyn QueryExecutor>,
    store: Arc<dyn PaginationStore>,
) -> Result<MultiQueryResult, MultiQueryError> {
    let multi = MultiQuery::new(model, options, props, executor)?.with_store(store);
    Ok(multi.execute().await)
}
