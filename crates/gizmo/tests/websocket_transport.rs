// Test module - relaxed lint rules
#![allow(clippy::indexing_slicing)]
#![allow(clippy::panic)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(missing_docs)]

//! End-to-end tests over a real WebSocket against the in-process fake server.

use std::time::Duration;

use gizmo::{Client, ClientConfig, ErrorCode, Query, StreamMode, WebSocketTransport};
use gizmo_fixtures::{frames, init_test_logging, FakeGraphServer};
use serde_json::json;

#[tokio::test]
async fn round_trip_over_websocket() {
    init_test_logging();
    let server = FakeGraphServer::start(|envelope| {
        let name = envelope.args.bindings["name"].clone();
        vec![frames::success(json!([
            frames::vertex(1, "person", json!({"name": [name]}))
        ]))]
    })
    .await;
    let client = Client::new(WebSocketTransport::new(server.endpoint()));

    let query = Query::new("g.V().has('name', name)").param("name", "alice");
    let response = client.send(&query).await.unwrap();

    assert_eq!(response.status().code, 200);
    let row = response.get(0).unwrap();
    assert_eq!(row.get("name"), Some(&json!(["alice"])));
    assert_eq!(row.get("type"), Some(&json!("vertex")));

    let received = server.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].args.gremlin, "g.V().has('name', name)");
}

#[tokio::test]
async fn single_mode_returns_first_frame_only() {
    let server = FakeGraphServer::start(|_| {
        vec![
            frames::partial(json!([1, 2])),
            frames::success(json!([3])),
        ]
    })
    .await;
    let client = Client::new(WebSocketTransport::new(server.endpoint()));

    let response = client.send(&Query::new("g.V().count()")).await.unwrap();
    assert_eq!(response.status().code, 206);
    assert_eq!(response.raw_data(), &[json!(1), json!(2)]);
}

#[tokio::test]
async fn aggregate_mode_merges_partial_frames() {
    let server = FakeGraphServer::start(|_| {
        vec![
            frames::partial(json!([{"a": 1}])),
            frames::partial(json!([{"a": 2}])),
            frames::success(json!([{"a": 3}])),
        ]
    })
    .await;
    let transport =
        WebSocketTransport::new(server.endpoint()).with_stream_mode(StreamMode::Aggregate);
    let client = Client::new(transport);

    let response = client.send(&Query::new("g.V()")).await.unwrap();
    assert_eq!(response.status().code, 200);
    let values: Vec<_> = response
        .translate()
        .iter()
        .map(|row| row.get("a").cloned().unwrap())
        .collect();
    assert_eq!(values, vec![json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn slow_server_hits_the_timeout() {
    let server = FakeGraphServer::start_with_delay(
        |_| vec![frames::success(json!([]))],
        Duration::from_millis(500),
    )
    .await;
    let transport =
        WebSocketTransport::new(server.endpoint()).with_timeout(Duration::from_millis(50));
    let client = Client::new(transport);

    let err = client.send(&Query::new("g.V()")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Connection);
    assert_eq!(err.context, Some(json!({"timeout_ms": 50})));
}

#[tokio::test]
async fn server_closing_without_reply_is_a_connection_error() {
    let server = FakeGraphServer::start(|_| Vec::new()).await;
    let client = Client::new(WebSocketTransport::new(server.endpoint()));

    let err = client.send(&Query::new("g.V()")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Connection);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        timeout_ms: Some(2_000),
        log_requests: true,
        ..ClientConfig::default()
    };
    let client = Client::from_config(&config).unwrap();

    let err = client.send(&Query::new("g.V()")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Connection);
    assert!(client.tracer().unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_sends_use_independent_connections() {
    let server = FakeGraphServer::start(|envelope| {
        vec![frames::success(json!([envelope.args.gremlin.clone()]))]
    })
    .await;
    let client = Client::new(WebSocketTransport::new(server.endpoint()));

    let queries: Vec<Query> = (0..5).map(|n| Query::new(format!("q{n}"))).collect();
    let responses = futures::future::join_all(queries.iter().map(|query| client.send(query))).await;

    for (n, response) in responses.into_iter().enumerate() {
        let response = response.unwrap();
        assert_eq!(response.raw_data(), &[json!(format!("q{n}"))]);
    }
    assert_eq!(server.connections(), 5);
}
