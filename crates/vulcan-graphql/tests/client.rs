use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use vulcan_graphql::{
    BuildMultiQueryArgs, GraphqlClientBuilder, GraphqlClientError, GraphqlQuery, GraphqlResponse,
    RetryPolicy, build_multi_query,
};
use vulcan_testkit::init_test_tracing;

const MOVIES_QUERY: &str = "query multiMovieQuery($input: MultiMovieInput) { movies(input: $input) { results { _id } totalCount } }";

#[derive(Debug, Serialize)]
struct InputVars {
    input: Value,
}

#[derive(Debug, Deserialize)]
struct MoviesData {
    movies: MoviesPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoviesPage {
    results: Vec<Movie>,
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct Movie {
    #[serde(rename = "_id")]
    id: String,
}

struct SequenceResponder {
    counter: Arc<AtomicUsize>,
}

impl Respond for SequenceResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let attempt = self.counter.fetch_add(1, Ordering::SeqCst);
        if attempt == 0 {
            ResponseTemplate::new(500).set_body_json(json!({"error": "fail"}))
        } else {
            ResponseTemplate::new(200).set_body_json(json!({
                "data": {"movies": {"results": [{"_id": "m2"}], "totalCount": 1}}
            }))
        }
    }
}

struct CountingResponder {
    counter: Arc<AtomicUsize>,
    status: u16,
    body: Value,
    delay: Option<Duration>,
}

impl Respond for CountingResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.counter.fetch_add(1, Ordering::SeqCst);
        let mut response = ResponseTemplate::new(self.status).set_body_json(self.body.clone());
        if let Some(delay) = self.delay {
            response = response.set_delay(delay);
        }
        response
    }
}

fn fast_retry(attempts: usize) -> RetryPolicy {
    RetryPolicy::default()
        .with_max_attempts(attempts)
        .with_backoff(Duration::from_millis(5), Duration::from_millis(20), Duration::ZERO)
}

#[tokio::test]
async fn query_sends_operation_name_and_variables() {
    init_test_tracing();
    let server = MockServer::start().await;

    let expected_body = json!({
        "query": MOVIES_QUERY,
        "operationName": "multiMovieQuery",
        "variables": {"input": {"limit": 2}},
    });

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"movies": {"results": [{"_id": "m1"}, {"_id": "m2"}], "totalCount": 7}}
        })))
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .with_service_name("test")
        .build()
        .expect("client");

    let response: GraphqlResponse<MoviesData> = client
        .query(
            &GraphqlQuery::from_static(MOVIES_QUERY),
            InputVars {
                input: json!({"limit": 2}),
            },
        )
        .await
        .expect("query should succeed");

    assert!(response.is_ok());
    let page = response.data.expect("data").movies;
    assert_eq!(page.total_count, 7);
    assert_eq!(
        page.results.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
        ["m1", "m2"]
    );
    assert_eq!(client.metrics().requests_success, 1);
}

#[tokio::test]
async fn built_multi_query_is_sent_verbatim() {
    init_test_tracing();
    let server = MockServer::start().await;
    let fragment = "fragment MovieDefaultFragment on Movie {\n  _id\n}";
    let query = build_multi_query(BuildMultiQueryArgs {
        type_name: "Movie",
        multi_type_name: "Movies",
        fragment_name: "MovieDefaultFragment",
        fragment,
        extra_queries: None,
    })
    .expect("query");

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(json!({
            "query": query.as_str(),
            "operationName": "multiMovieQuery",
            "variables": {"input": {"limit": 20}},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"movies": {"results": [], "totalCount": 0}}
        })))
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri()).build().expect("client");
    let data: MoviesData = client
        .query_strict(&query, InputVars {
            input: json!({"limit": 20}),
        })
        .await
        .expect("query should succeed");
    assert!(data.movies.results.is_empty());
}

#[tokio::test]
async fn graphql_errors_are_returned_in_the_response() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"movies": null},
            "errors": [{"message": "not allowed", "path": ["movies"]}]
        })))
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri()).build().expect("client");
    let query = GraphqlQuery::from_static(MOVIES_QUERY);

    let response: GraphqlResponse<Value> = client
        .query(&query, InputVars { input: json!({}) })
        .await
        .expect("transport succeeded");
    assert!(!response.is_ok());
    assert_eq!(response.errors[0].message, "not allowed");
    assert_eq!(response.data, Some(json!({"movies": null})));

    let err = client
        .query_strict::<_, Value>(&query, InputVars { input: json!({}) })
        .await
        .expect_err("strict query fails on GraphQL errors");
    assert!(matches!(err, GraphqlClientError::GraphqlErrors { .. }));
    assert!(!err.is_network());
}

#[tokio::test]
async fn server_errors_are_retried() {
    init_test_tracing();
    let server = MockServer::start().await;
    let counter = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(SequenceResponder {
            counter: counter.clone(),
        })
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .with_retry_policy(fast_retry(3))
        .build()
        .expect("client");

    let data: MoviesData = client
        .query_strict(
            &GraphqlQuery::from_static(MOVIES_QUERY),
            InputVars { input: json!({}) },
        )
        .await
        .expect("retry should succeed");

    assert_eq!(data.movies.results[0].id, "m2");
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    let metrics = client.metrics();
    assert_eq!(metrics.requests_retried, 1);
    assert_eq!(metrics.requests_total, 1);
}

#[tokio::test]
async fn mutations_are_not_retried() {
    init_test_tracing();
    let server = MockServer::start().await;
    let counter = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(CountingResponder {
            counter: counter.clone(),
            status: 503,
            body: json!({"error": "unavailable"}),
            delay: None,
        })
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .with_retry_policy(fast_retry(3))
        .build()
        .expect("client");

    let err = client
        .query::<_, Value>(
            &GraphqlQuery::from_static("mutation createMovie($input: Value) { createMovie }"),
            InputVars { input: json!({}) },
        )
        .await
        .expect_err("mutation should fail");

    assert_eq!(err.status_code(), Some(503));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_status_keeps_json_body() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{"message": "Unknown argument \"foo\""}]
        })))
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .with_retry_policy(fast_retry(3))
        .build()
        .expect("client");

    let err = client
        .query::<_, Value>(
            &GraphqlQuery::from_static(MOVIES_QUERY),
            InputVars { input: json!({}) },
        )
        .await
        .expect_err("400 should fail");

    assert!(!err.is_retryable());
    assert_eq!(err.status_code(), Some(400));
    let body = err.response_body_json().expect("json body");
    assert_eq!(body["errors"][0]["message"], "Unknown argument \"foo\"");
    assert_eq!(client.metrics().requests_retried, 0);
}

#[tokio::test]
async fn identical_in_flight_queries_share_one_request() {
    init_test_tracing();
    let server = MockServer::start().await;
    let counter = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(CountingResponder {
            counter: counter.clone(),
            status: 200,
            body: json!({"data": {"movies": {"results": [], "totalCount": 0}}}),
            delay: Some(Duration::from_millis(100)),
        })
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri()).build().expect("client");
    let query = GraphqlQuery::from_static(MOVIES_QUERY);

    let (first, second) = tokio::join!(
        client.query::<_, Value>(&query, InputVars { input: json!({"limit": 5}) }),
        client.query::<_, Value>(&query, InputVars { input: json!({"limit": 5}) }),
    );
    first.expect("first");
    second.expect("second");

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(client.metrics().requests_deduplicated, 1);
}

#[tokio::test]
async fn dedup_can_be_disabled() {
    init_test_tracing();
    let server = MockServer::start().await;
    let counter = Arc::new(AtomicUsize::new(0));

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(CountingResponder {
            counter: counter.clone(),
            status: 200,
            body: json!({"data": {"movies": {"results": [], "totalCount": 0}}}),
            delay: Some(Duration::from_millis(50)),
        })
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .with_dedup_in_flight(false)
        .build()
        .expect("client");
    let query = GraphqlQuery::from_static(MOVIES_QUERY);

    let (first, second) = tokio::join!(
        client.query::<_, Value>(&query, InputVars { input: json!({}) }),
        client.query::<_, Value>(&query, InputVars { input: json!({}) }),
    );
    first.expect("first");
    second.expect("second");

    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn bearer_token_is_sent() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(wiremock::matchers::header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;

    let client = GraphqlClientBuilder::new(server.uri())
        .with_bearer_token("secret-token")
        .with_retry_policy(RetryPolicy::never())
        .build()
        .expect("client");

    let response: GraphqlResponse<Value> = client
        .query(&GraphqlQuery::from_static(MOVIES_QUERY), InputVars { input: json!({}) })
        .await
        .expect("authorized request matches");
    assert!(response.is_ok());
}
