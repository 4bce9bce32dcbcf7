//! # Dispatcher
//!
//! Normalizes a [`Payload`] into component calls and mirrors the input shape
//! in the output: a single record or scalar yields one result, a batch yields
//! a result per item in input order.
//!
//! A batch fails fast: the first failing item aborts the whole call and the
//! error carries that item's index. Partial results are never returned.

use super::payload::{Payload, Prediction};
use crate::error::{FoundryError, Result};
use crate::logging::log_dispatch_operation;
use crate::registry::{HandlerResolver, ResolvedHandler};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    resolver: Arc<HandlerResolver>,
}

impl Dispatcher {
    pub fn new(resolver: Arc<HandlerResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &Arc<HandlerResolver> {
        &self.resolver
    }

    /// Resolve the handler now instead of on the first request
    pub async fn warm_up(&self) -> Result<ResolvedHandler> {
        Ok(self.resolver.resolve().await?)
    }

    /// Invoke the component for a payload of any shape
    pub async fn predict(&self, payload: Payload) -> Result<Prediction> {
        match payload {
            Payload::Batch(items) => self.predict_batch(items).await.map(Prediction::Batch),
            Payload::Single(record) => self
                .predict_one(Value::Object(record))
                .await
                .map(Prediction::Single),
            Payload::Scalar(value) => self.predict_one(value).await.map(Prediction::Single),
        }
    }

    /// Invoke the component once and return its result unwrapped
    pub async fn predict_one(&self, input: Value) -> Result<Value> {
        let handler = self.resolver.resolve().await?;
        let started = Instant::now();

        debug!(handler = %handler.reference(), "Processing single item");
        let outcome = handler
            .component()
            .predict(input)
            .await
            .map_err(|error| FoundryError::ComponentExecution { index: None, error });

        log_dispatch_operation(
            "predict",
            self.resolver.reference_text(),
            Some(1),
            status_of(&outcome),
            Some(started.elapsed().as_millis() as u64),
        );
        outcome
    }

    /// Invoke the component once per item, preserving order, failing fast
    pub async fn predict_batch(&self, items: Vec<Value>) -> Result<Vec<Value>> {
        let handler = self.resolver.resolve().await?;
        let started = Instant::now();
        let total = items.len();

        debug!(handler = %handler.reference(), items = total, "Processing batch");
        let mut results = Vec::with_capacity(total);
        for (index, item) in items.into_iter().enumerate() {
            match handler.component().predict(item).await {
                Ok(result) => results.push(result),
                Err(error) => {
                    warn!(
                        handler = %handler.reference(),
                        index,
                        total,
                        error = %error,
                        "Batch item failed; aborting batch"
                    );
                    log_dispatch_operation(
                        "predict_batch",
                        self.resolver.reference_text(),
                        Some(total),
                        "failed",
                        Some(started.elapsed().as_millis() as u64),
                    );
                    return Err(FoundryError::ComponentExecution {
                        index: Some(index),
                        error,
                    });
                }
            }
        }

        log_dispatch_operation(
            "predict_batch",
            self.resolver.reference_text(),
            Some(total),
            "completed",
            Some(started.elapsed().as_millis() as u64),
        );
        Ok(results)
    }
}

fn status_of<T>(outcome: &Result<T>) -> &'static str {
    if outcome.is_ok() {
        "completed"
    } else {
        "failed"
    }
}
