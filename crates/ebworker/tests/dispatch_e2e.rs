//! End-to-end tests from configuration to dispatch.

use std::io::Write;
use std::sync::Arc;

use ebworker::prelude::*;
use ebworker_test::{CountingMiddleware, RecordingResolver, TerminalProbe, TestDelivery};
use http::StatusCode;
use proptest::prelude::*;
use serde_json::json;

fn counting_resolver() -> Arc<RecordingResolver> {
    Arc::new(
        RecordingResolver::new()
            .with("FooMiddleware", CountingMiddleware::new())
            .with("BarMiddleware", CountingMiddleware::new())
            .with("BazMiddleware", CountingMiddleware::new()),
    )
}

fn message_delivery() -> Delivery {
    TestDelivery::message("message-name", json!({"id": 123}))
        .queue("default-queue")
        .message_id("123abc")
        .build()
        .unwrap()
}

#[test]
fn test_dispatch_from_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
        [messages]
        "message-name" = ["FooMiddleware", "BarMiddleware", "BazMiddleware"]
        "#
    )
    .unwrap();

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    let resolver = counting_resolver();
    let worker = ebworker::worker_from_config(&config, Arc::clone(&resolver)).unwrap();

    let probe = TerminalProbe::new();
    let response = worker
        .process(message_delivery(), TestDelivery::response(), probe.terminal())
        .unwrap();

    assert_eq!(CountingMiddleware::header_count_of(&response), Some(3));
    assert_eq!(
        resolver.requested(),
        ["FooMiddleware", "BarMiddleware", "BazMiddleware"]
    );

    let delivery = probe.take_delivery().unwrap();
    assert_eq!(CountingMiddleware::count_of(&delivery), 3);
    assert_eq!(delivery.matched_queue(), Some("default-queue"));
    assert_eq!(delivery.message_id(), Some("123abc"));
    assert_eq!(delivery.message_name(), Some("message-name"));
    assert_eq!(delivery.message_payload(), Some(&json!({"id": 123})));
}

#[test]
fn test_empty_mapping_returns_seed_response() {
    let config = WorkerConfig::builder().message("message-name", json!([])).build();
    let worker = ebworker::worker_from_config(&config, counting_resolver()).unwrap();
    let probe = TerminalProbe::new();

    let response = worker
        .process(message_delivery(), TestDelivery::response(), probe.terminal())
        .unwrap();

    assert_eq!(probe.calls(), 1);
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.body().is_empty());
    assert_eq!(CountingMiddleware::header_count_of(&response), None);

    let delivery = probe.take_delivery().unwrap();
    assert_eq!(delivery.matched_queue(), Some("default-queue"));
    assert_eq!(delivery.message_id(), Some("123abc"));
}

#[test]
fn test_invalid_mapping_rejected_at_build() {
    let config = WorkerConfig::builder().message("message-name", json!(10)).build();
    let err = ebworker::worker_from_config(&config, counting_resolver()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMapping { .. }));
}

#[test]
fn test_configured_header_names() {
    let config = ConfigLoader::new()
        .with_string(
            r#"
            [messages]
            "message-name" = "FooMiddleware"

            [headers]
            queue = "X-Queue"
            message_id = "X-Message-Id"
            "#,
            "toml",
        )
        .unwrap()
        .load()
        .unwrap();
    let worker = ebworker::worker_from_config(&config, counting_resolver()).unwrap();

    let delivery = TestDelivery::message("message-name", json!(null))
        .header("x-queue", "custom-queue")
        .header("x-message-id", "m-1")
        .build()
        .unwrap();

    let probe = TerminalProbe::new();
    worker
        .process(delivery, TestDelivery::response(), probe.terminal())
        .unwrap();

    let delivery = probe.take_delivery().unwrap();
    assert_eq!(delivery.matched_queue(), Some("custom-queue"));
    assert_eq!(delivery.message_id(), Some("m-1"));
    assert_eq!(delivery.message_payload(), Some(&json!(null)));
}

#[test]
fn test_periodic_task_dispatch() {
    let config = WorkerConfig::builder()
        .message("nightly-report", "FooMiddleware")
        .build();
    let resolver = counting_resolver();
    let worker = ebworker::worker_from_config(&config, Arc::clone(&resolver)).unwrap();

    let delivery = TestDelivery::builder()
        .queue("default-queue")
        .task_name("nightly-report")
        .build()
        .unwrap();

    let probe = TerminalProbe::new();
    worker
        .process(delivery, TestDelivery::response(), probe.terminal())
        .unwrap();

    let delivery = probe.take_delivery().unwrap();
    assert_eq!(delivery.message_name(), Some("nightly-report"));
    assert_eq!(delivery.message_payload(), Some(&json!(null)));
    assert_eq!(resolver.requested(), ["FooMiddleware"]);
}

#[test]
fn test_unresolvable_identifier() {
    let config = WorkerConfig::builder()
        .message("message-name", json!(["FooMiddleware", "Missing"]))
        .build();
    let worker = ebworker::worker_from_config(&config, counting_resolver()).unwrap();
    let probe = TerminalProbe::new();

    let err = worker
        .process(message_delivery(), TestDelivery::response(), probe.terminal())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert!(!probe.was_called());
}

#[test]
fn test_malformed_body() {
    let config = WorkerConfig::builder().message("message-name", json!([])).build();
    let worker = ebworker::worker_from_config(&config, counting_resolver()).unwrap();
    let delivery = TestDelivery::builder().raw_body("{not json").build().unwrap();

    let err = worker.dispatch(delivery, TestDelivery::response()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_terminal_error_propagates() {
    let config = WorkerConfig::builder()
        .message("message-name", "FooMiddleware")
        .build();
    let worker = ebworker::worker_from_config(&config, counting_resolver()).unwrap();
    let probe = TerminalProbe::new();

    let err = worker
        .process(
            message_delivery(),
            TestDelivery::response(),
            probe.failing_terminal("application failed"),
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Handler);
    assert_eq!(err.to_string(), "application failed");
    assert_eq!(probe.calls(), 1);
}

proptest! {
    #[test]
    fn prop_unmapped_names_fail_before_dispatch(name in "[a-z][a-z0-9.-]{0,24}") {
        prop_assume!(name != "message-name");

        let config = WorkerConfig::builder().message("message-name", json!([])).build();
        let resolver = counting_resolver();
        let worker = ebworker::worker_from_config(&config, Arc::clone(&resolver)).unwrap();
        let probe = TerminalProbe::new();

        let delivery = TestDelivery::message(name.clone(), json!({"id": 1})).build().unwrap();
        let err = worker
            .process(delivery, TestDelivery::response(), probe.terminal())
            .unwrap_err();

        prop_assert_eq!(err.kind(), ErrorKind::Configuration);
        let quoted = format!("\"{name}\"");
        prop_assert!(err.to_string().contains(&quoted));
        prop_assert!(!probe.was_called());
        prop_assert_eq!(resolver.resolution_count(), 0);
    }

    #[test]
    fn prop_counter_matches_mapping_length(len in 0usize..6) {
        let identifiers: Vec<String> = ["FooMiddleware", "BarMiddleware", "BazMiddleware"]
            .iter()
            .cycle()
            .take(len)
            .map(ToString::to_string)
            .collect();

        let config = WorkerConfig::builder()
            .message("message-name", json!(identifiers))
            .build();
        let worker = ebworker::worker_from_config(&config, counting_resolver()).unwrap();
        let probe = TerminalProbe::new();

        worker
            .process(message_delivery(), TestDelivery::response(), probe.terminal())
            .unwrap();

        let delivery = probe.take_delivery().unwrap();
        prop_assert_eq!(CountingMiddleware::count_of(&delivery), len as u64);
    }
}
