use criterion::{black_box, criterion_group, criterion_main, Criterion};
use foundry_runtime::adapters::{BackendAdapter, RestAdapter, RestRequest};
use foundry_runtime::{
    ComponentRegistry, Dispatcher, FoundryRuntime, HandlerReference, HandlerResolver, Payload,
    RuntimeConfig,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime")
}

fn benchmark_reference_parsing(c: &mut Criterion) {
    c.bench_function("reference_parse", |b| {
        b.iter(|| HandlerReference::parse(black_box("components.word_count:predict")))
    });
}

fn benchmark_dispatch(c: &mut Criterion) {
    let rt = runtime();
    let dispatcher = Dispatcher::new(Arc::new(HandlerResolver::new(
        "components.word_count:predict",
        Arc::new(ComponentRegistry::with_builtin_components()),
    )));
    rt.block_on(dispatcher.warm_up()).expect("handler resolves");

    let record = json!({"text": "the quick brown fox jumps over the lazy dog"});
    let batch: Vec<Value> = (0..100).map(|_| record.clone()).collect();

    c.bench_function("dispatch_single", |b| {
        b.iter(|| rt.block_on(dispatcher.predict(Payload::from(black_box(record.clone())))))
    });
    c.bench_function("dispatch_batch_100", |b| {
        b.iter(|| rt.block_on(dispatcher.predict(Payload::Batch(black_box(batch.clone())))))
    });
}

fn benchmark_rest_cycle(c: &mut Criterion) {
    let rt = runtime();
    let foundry = FoundryRuntime::with_builtin_components(RuntimeConfig::default());
    rt.block_on(foundry.start()).expect("handler resolves");
    let adapter = RestAdapter::new(foundry.adapter_runtime());

    c.bench_function("rest_decode_invoke_encode", |b| {
        b.iter(|| {
            rt.block_on(adapter.handle(RestRequest::predict(black_box(
                r#"{"text": "the quick brown fox"}"#,
            ))))
        })
    });
}

criterion_group!(
    benches,
    benchmark_reference_parsing,
    benchmark_dispatch,
    benchmark_rest_cycle
);
criterion_main!(benches);
