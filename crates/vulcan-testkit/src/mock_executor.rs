//! Scripted query executor and recording error sink.

use std::collections::VecDeque;
use std::sync::Mutex;

use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use serde_json::Value;
use vulcan_graphql::GraphqlQuery;
use vulcan_hooks::{
    ErrorReport, ErrorSink, FetchMoreRequest, QueryError, QueryExecutionResult, QueryExecutor,
    QueryOptions, QueryVariables,
};

#[derive(Default)]
struct MockState {
    results: VecDeque<QueryExecutionResult>,
    last: Option<QueryExecutionResult>,
    pages: VecDeque<Result<Value, QueryError>>,
    data: Option<Value>,
    executed: Vec<QueryOptions>,
    fetch_more_calls: Vec<QueryVariables>,
}

/// Executor returning scripted snapshots and pages.
///
/// `execute` pops the next scripted snapshot, repeating the last one once the
/// script runs out, and stamps it with the variables it was called with.
/// `fetch_more` pops the next scripted page and merges it into the held data
/// with the request's `update_query`, the way a client cache would.
#[derive(Default)]
pub struct MockExecutor {
    state: Mutex<MockState>,
}

impl std::fmt::Debug for MockExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("MockExecutor")
            .field("queued_results", &state.results.len())
            .field("queued_pages", &state.pages.len())
            .field("executed", &state.executed.len())
            .finish_non_exhaustive()
    }
}

impl MockExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot for the next `execute`.
    pub fn push_result(&self, result: QueryExecutionResult) {
        self.state.lock().unwrap().results.push_back(result);
    }

    /// Queue a page for the next `fetch_more`.
    pub fn push_page(&self, page: Value) {
        self.state.lock().unwrap().pages.push_back(Ok(page));
    }

    /// Make the next `fetch_more` fail.
    pub fn push_fetch_error(&self, error: QueryError) {
        self.state.lock().unwrap().pages.push_back(Err(error));
    }

    /// Replace the held data, as if another fetch had just landed.
    pub fn set_data(&self, data: Value) {
        self.state.lock().unwrap().data = Some(data);
    }

    /// Data currently held.
    #[must_use]
    pub fn data(&self) -> Option<Value> {
        self.state.lock().unwrap().data.clone()
    }

    /// Options of every `execute` call, oldest first.
    #[must_use]
    pub fn executed(&self) -> Vec<QueryOptions> {
        self.state.lock().unwrap().executed.clone()
    }

    /// Variables of every `fetch_more` call, oldest first.
    #[must_use]
    pub fn fetch_more_calls(&self) -> Vec<QueryVariables> {
        self.state.lock().unwrap().fetch_more_calls.clone()
    }

    fn next_result(&self, options: &QueryOptions) -> QueryExecutionResult {
        let mut state = self.state.lock().unwrap();
        state.executed.push(options.clone());
        let scripted = state.results.pop_front().or_else(|| state.last.clone());
        let mut result = scripted
            .unwrap_or_else(|| QueryExecutionResult::loading(options.variables.clone()));
        result.variables = options.variables.clone();
        if result.data.is_some() {
            state.data.clone_from(&result.data);
        }
        state.last = Some(result.clone());
        result
    }

    fn next_page(&self, request: FetchMoreRequest) -> Result<Value, QueryError> {
        let mut state = self.state.lock().unwrap();
        state.fetch_more_calls.push(request.variables);
        let page = state.pages.pop_front().unwrap_or(Ok(Value::Null))?;
        let previous = state.data.take().unwrap_or(Value::Null);
        let merged = (request.update_query)(&previous, &page);
        state.data = Some(merged.clone());
        Ok(merged)
    }
}

impl QueryExecutor for MockExecutor {
    fn execute<'a>(
        &'a self,
        _query: &'a GraphqlQuery,
        options: &'a QueryOptions,
    ) -> BoxFuture<'a, QueryExecutionResult> {
        future::ready(self.next_result(options)).boxed()
    }

    fn fetch_more<'a>(
        &'a self,
        _query: &'a GraphqlQuery,
        request: FetchMoreRequest,
    ) -> BoxFuture<'a, Result<Value, QueryError>> {
        future::ready(self.next_page(request)).boxed()
    }
}

/// Owned copy of an [`ErrorReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedReport {
    pub resolver_name: String,
    pub variables: QueryVariables,
    pub error: QueryError,
}

/// Error sink keeping every report it receives.
#[derive(Debug, Default)]
pub struct RecordingErrorSink {
    reports: Mutex<Vec<RecordedReport>>,
}

impl RecordingErrorSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reports(&self) -> Vec<RecordedReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl ErrorSink for RecordingErrorSink {
    fn report(&self, report: &ErrorReport<'_>) {
        self.reports.lock().unwrap().push(RecordedReport {
            resolver_name: report.resolver_name.to_string(),
            variables: report.variables.clone(),
            error: report.error.clone(),
        });
    }
}
