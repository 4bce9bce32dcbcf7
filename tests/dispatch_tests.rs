//! # Dispatch Integration Tests
//!
//! Resolution and dispatch through the public API, including concurrent
//! first use under lazy resolution.

mod common;

use common::{counting_registry, test_registry};
use foundry_runtime::registry::ResolutionState;
use foundry_runtime::{Dispatcher, FoundryError, HandlerResolver, Payload, Prediction};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn dispatcher(reference: &str) -> Dispatcher {
    Dispatcher::new(Arc::new(HandlerResolver::new(
        reference,
        Arc::new(test_registry()),
    )))
}

#[tokio::test]
async fn test_wordcount_scenario() {
    let dispatcher = dispatcher("examples.wordcount:predict");

    let single = dispatcher
        .predict(Payload::from(json!({"text": "a b c"})))
        .await
        .unwrap();
    assert_eq!(single, Prediction::Single(json!({"word_count": 3})));

    let batch = dispatcher
        .predict(Payload::from(json!([{"text": "a"}, {"text": "a b"}])))
        .await
        .unwrap();
    assert_eq!(
        batch,
        Prediction::Batch(vec![json!({"word_count": 1}), json!({"word_count": 2})])
    );
}

#[tokio::test]
async fn test_item_two_of_three_fails_whole_call() {
    let dispatcher = dispatcher("tests.picky:predict");

    let error = dispatcher
        .predict(Payload::from(json!([{}, {"bad": true}, {}])))
        .await
        .unwrap_err();

    match error {
        FoundryError::ComponentExecution { index, error } => {
            assert_eq!(index, Some(1));
            assert_eq!(error.to_string(), "item marked bad");
        }
        other => panic!("expected component failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_nonexistent_module_surfaces_handler_load_error() {
    let dispatcher = dispatcher("examples.nonexistent:predict");

    let error = dispatcher
        .predict(Payload::from(json!({"text": "a"})))
        .await
        .unwrap_err();
    assert_eq!(error.error_code(), "HANDLER_LOAD_ERROR");
    assert!(!error.is_client_fault());
    assert!(matches!(
        dispatcher.resolver().state(),
        ResolutionState::Failed(_)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_share_one_resolution() {
    let calls = Arc::new(AtomicUsize::new(0));
    let dispatcher = Dispatcher::new(Arc::new(HandlerResolver::new(
        "tests.counted:predict",
        Arc::new(counting_registry(calls.clone())),
    )));

    let requests = (0..32).map(|i| {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            dispatcher
                .predict(Payload::from(json!({ "text": "x ".repeat(i) })))
                .await
        })
    });

    let results = futures::future::join_all(requests).await;
    for (i, joined) in results.into_iter().enumerate() {
        let value = joined.unwrap().unwrap().into_value();
        assert_eq!(value["word_count"], i);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_broken_factory_failure_is_sticky() {
    let dispatcher = dispatcher("tests.broken:predict");

    for _ in 0..3 {
        let error = dispatcher
            .predict(Payload::from(json!({})))
            .await
            .unwrap_err();
        assert!(error.to_string().contains("model weights missing"));
    }
}
