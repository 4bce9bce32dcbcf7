#![allow(dead_code)]

pub mod strategies;

use anyhow::bail;
use foundry_runtime::components::{Component, FnComponent};
use foundry_runtime::registry::{ComponentInfo, ComponentRegistry};
use foundry_runtime::{web, AdapterKind, FoundryRuntime, RuntimeConfig};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Whitespace token counter registered as `examples.wordcount:predict`
pub fn wordcount(input: Value) -> anyhow::Result<Value> {
    let text = input.get("text").and_then(Value::as_str).unwrap_or_default();
    Ok(json!({ "word_count": text.split_whitespace().count() }))
}

/// Waits before echoing its input, without blocking the runtime
pub struct Sleepy(pub std::time::Duration);

#[async_trait::async_trait]
impl Component for Sleepy {
    fn name(&self) -> &str {
        "sleepy"
    }

    async fn predict(&self, input: Value) -> anyhow::Result<Value> {
        tokio::time::sleep(self.0).await;
        Ok(input)
    }
}

/// Built-ins plus the test components:
///
/// - `examples.wordcount:predict` counts whitespace tokens
/// - `tests.picky:predict` fails on inputs carrying a `bad` key
/// - `tests.broken:predict` fails to initialise
/// - `tests.sleepy:predict` takes a second per item
pub fn test_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::with_builtin_components();
    registry
        .register_instance(
            "tests.sleepy:predict",
            ComponentInfo::described("slow echo"),
            Arc::new(Sleepy(std::time::Duration::from_secs(1))) as Arc<dyn Component>,
        )
        .unwrap();
    registry
        .register_instance(
            "examples.wordcount:predict",
            ComponentInfo::described("split on whitespace, count tokens"),
            Arc::new(FnComponent::new("wordcount", wordcount)) as Arc<dyn Component>,
        )
        .unwrap();
    registry
        .register_instance(
            "tests.picky:predict",
            ComponentInfo::described("fails on items marked bad"),
            Arc::new(FnComponent::new("picky", |input: Value| {
                if input.get("bad").is_some() {
                    bail!("item marked bad");
                }
                Ok(json!({ "ok": true }))
            })) as Arc<dyn Component>,
        )
        .unwrap();
    registry
        .register(
            "tests.broken:predict",
            ComponentInfo::described("cannot be built"),
            || bail!("model weights missing"),
        )
        .unwrap();
    registry
}

/// Registry whose `tests.counted:predict` factory counts its invocations
pub fn counting_registry(calls: Arc<AtomicUsize>) -> ComponentRegistry {
    let mut registry = test_registry();
    registry
        .register(
            "tests.counted:predict",
            ComponentInfo::described("counted"),
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(std::time::Duration::from_millis(25));
                Ok(Arc::new(FnComponent::new("counted", wordcount)) as Arc<dyn Component>)
            },
        )
        .unwrap();
    registry
}

pub fn test_config(kind: AdapterKind, handler: &str) -> RuntimeConfig {
    RuntimeConfig {
        handler: handler.to_string(),
        adapter: kind,
        bind_address: "127.0.0.1:0".to_string(),
        eager_resolve: false,
        ..RuntimeConfig::default()
    }
}

/// Adapter server on an ephemeral port
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub runtime: FoundryRuntime,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<foundry_runtime::Result<()>>,
}

impl TestServer {
    pub async fn start(kind: AdapterKind, handler: &str) -> Self {
        Self::start_with(test_config(kind, handler), test_registry()).await
    }

    pub async fn start_with(config: RuntimeConfig, registry: ComponentRegistry) -> Self {
        let runtime = FoundryRuntime::new(config, registry);
        runtime.start().await.expect("runtime should start");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (sender, receiver) = oneshot::channel::<()>();

        let state = runtime.web_state();
        let handle = tokio::spawn(async move {
            web::serve(listener, state, async {
                let _ = receiver.await;
            })
            .await
        });

        Self {
            base_url: format!("http://{address}"),
            client: reqwest::Client::new(),
            runtime,
            shutdown: Some(sender),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client.post(self.url(path)).json(body).send().await.unwrap()
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .unwrap()
    }

    pub async fn stop(mut self) {
        if let Some(sender) = self.shutdown.take() {
            let _ = sender.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}
