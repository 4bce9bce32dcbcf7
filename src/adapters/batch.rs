//! # Batch Adapter
//!
//! Managed endpoints invoke a scoring entry point in two ways: online with a
//! single JSON document, and offline with mini-batches of records or files.
//! Offline units always dispatch in batch mode and output rows line up with
//! input rows by position.
//!
//! File units are read according to their extension:
//!
//! | extension | records |
//! |---|---|
//! | `.jsonl`, `.ndjson` | one JSON value per non-empty line |
//! | `.json` | an array, or one value |
//! | anything else | one raw string per non-empty line |
//!
//! Each unit yields either all of its rows or exactly one failure record,
//! never a mix. A file unit's record names the file it came from, so a
//! flattened output can still be lined up with its inputs:
//! `{"error": "...", "status": "failed", "code": "...", "index": 1, "file": "part-1.jsonl"}`.

use super::{AdapterRuntime, BackendAdapter, Decoded};
use crate::constants::{system, AdapterKind};
use crate::dispatch::{Payload, Prediction};
use crate::error::{FoundryError, Result};
use crate::logging::log_adapter_operation;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One unit of offline work
#[derive(Debug, Clone, PartialEq)]
pub enum BatchUnit {
    /// Records already materialised by the host
    Records(Vec<Value>),
    /// A mini-batch file on local storage
    File(PathBuf),
}

impl BatchUnit {
    fn describe(&self) -> String {
        match self {
            BatchUnit::Records(items) => format!("{} in-memory records", items.len()),
            BatchUnit::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub error: String,
    pub status: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Source file of a failed file unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl FailureRecord {
    pub fn from_error(error: &FoundryError) -> Self {
        Self {
            error: error.to_string(),
            status: system::FAILED_STATUS.to_string(),
            code: error.error_code().to_string(),
            index: error.batch_index(),
            file: None,
        }
    }

    pub fn with_file(mut self, path: &Path) -> Self {
        self.file = Some(path.display().to_string());
        self
    }

    pub fn into_value(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutput {
    Rows(Vec<Value>),
    Failed(FailureRecord),
}

impl BatchOutput {
    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutput::Rows(_))
    }

    /// Output rows; a failure contributes its failure record as the only row
    pub fn into_rows(self) -> Vec<Value> {
        match self {
            BatchOutput::Rows(rows) => rows,
            BatchOutput::Failed(record) => vec![record.into_value()],
        }
    }
}

#[derive(Debug)]
pub struct BatchContext {
    source: String,
    file: Option<PathBuf>,
}

/// Parse a mini-batch file's contents according to its extension
pub fn parse_records(path: &Path, contents: &str) -> Result<Vec<Value>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jsonl") | Some("ndjson") => contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(number, line)| {
                serde_json::from_str(line).map_err(|e| {
                    FoundryError::decode(format!(
                        "{}:{}: invalid JSON line: {e}",
                        path.display(),
                        number + 1
                    ))
                })
            })
            .collect(),
        Some("json") => {
            let value: Value = serde_json::from_str(contents).map_err(|e| {
                FoundryError::decode(format!("{}: invalid JSON: {e}", path.display()))
            })?;
            Ok(match value {
                Value::Array(items) => items,
                other => vec![other],
            })
        }
        _ => Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| Value::String(line.to_string()))
            .collect()),
    }
}

#[derive(Debug, Clone)]
pub struct BatchAdapter {
    runtime: AdapterRuntime,
}

impl BatchAdapter {
    pub fn new(runtime: AdapterRuntime) -> Self {
        Self { runtime }
    }

    /// Process mini-batch files in order, one output per file
    pub async fn run_files(&self, paths: &[PathBuf]) -> Vec<BatchOutput> {
        let mut outputs = Vec::with_capacity(paths.len());
        for path in paths {
            outputs.push(self.handle(BatchUnit::File(path.clone())).await);
        }
        info!(
            files = paths.len(),
            failed = outputs.iter().filter(|output| !output.is_success()).count(),
            "Mini-batch run finished"
        );
        outputs
    }

    /// Write rows as JSON Lines, returning the number of rows written
    pub async fn write_rows(path: &Path, rows: &[Value]) -> Result<usize> {
        let mut buffer = Vec::new();
        for row in rows {
            serde_json::to_writer(&mut buffer, row).map_err(std::io::Error::from)?;
            buffer.push(b'\n');
        }
        tokio::fs::write(path, buffer).await?;
        debug!(path = %path.display(), rows = rows.len(), "Wrote batch output");
        Ok(rows.len())
    }

    /// Online scoring; the output mirrors the input shape
    pub async fn try_score(&self, input: Value) -> Result<Value> {
        self.invoke(Payload::from(input))
            .await
            .map(Prediction::into_value)
    }

    /// Online scoring that reports failures as a failure record
    pub async fn score(&self, input: Value) -> Value {
        match self.try_score(input).await {
            Ok(value) => value,
            Err(error) => {
                log_adapter_operation(
                    AdapterKind::Batch.as_str(),
                    "score",
                    "failed",
                    Some(error.error_code()),
                );
                FailureRecord::from_error(&error).into_value()
            }
        }
    }
}

#[async_trait]
impl BackendAdapter for BatchAdapter {
    type Request = BatchUnit;
    type Response = BatchOutput;
    type Context = BatchContext;

    fn kind(&self) -> AdapterKind {
        AdapterKind::Batch
    }

    fn runtime(&self) -> &AdapterRuntime {
        &self.runtime
    }

    async fn decode(&self, unit: BatchUnit) -> Decoded<BatchContext> {
        let context = BatchContext {
            source: unit.describe(),
            file: match &unit {
                BatchUnit::File(path) => Some(path.clone()),
                BatchUnit::Records(_) => None,
            },
        };

        match unit {
            BatchUnit::Records(items) => Decoded::ok(context, Payload::Batch(items)),
            BatchUnit::File(path) => {
                let contents = match tokio::fs::read_to_string(&path).await {
                    Ok(contents) => contents,
                    Err(error) if error.kind() == std::io::ErrorKind::InvalidData => {
                        let message = format!("{}: not valid UTF-8 text", path.display());
                        return Decoded::rejected(context, FoundryError::decode(message));
                    }
                    Err(error) => return Decoded::rejected(context, FoundryError::Io(error)),
                };
                match parse_records(&path, &contents) {
                    Ok(items) => Decoded::ok(context, Payload::Batch(items)),
                    Err(error) => Decoded::rejected(context, error),
                }
            }
        }
    }

    fn encode(&self, context: BatchContext, outcome: Result<Prediction>) -> BatchOutput {
        match outcome {
            Ok(prediction) => {
                let rows = prediction.into_rows();
                log_adapter_operation(
                    AdapterKind::Batch.as_str(),
                    "run",
                    "completed",
                    Some(&format!("source={} rows={}", context.source, rows.len())),
                );
                BatchOutput::Rows(rows)
            }
            Err(error) => {
                log_adapter_operation(
                    AdapterKind::Batch.as_str(),
                    "run",
                    "failed",
                    Some(&format!("source={} code={}", context.source, error.error_code())),
                );
                let record = FailureRecord::from_error(&error);
                BatchOutput::Failed(match &context.file {
                    Some(path) => record.with_file(path),
                    None => record,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::runtime_for;
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn adapter(reference: &str) -> BatchAdapter {
        BatchAdapter::new(runtime_for(reference))
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_records_by_extension() {
        let jsonl = parse_records(Path::new("a.jsonl"), "{\"text\": \"a\"}\n\n{\"text\": \"b c\"}\n")
            .unwrap();
        assert_eq!(jsonl, vec![json!({"text": "a"}), json!({"text": "b c"})]);

        let array = parse_records(Path::new("a.JSON"), r#"[{"text": "a"}, 3]"#).unwrap();
        assert_eq!(array, vec![json!({"text": "a"}), json!(3)]);

        let single = parse_records(Path::new("a.json"), r#"{"text": "a"}"#).unwrap();
        assert_eq!(single, vec![json!({"text": "a"})]);

        let raw = parse_records(Path::new("a.txt"), "first line\n  \nsecond\r\n").unwrap();
        assert_eq!(raw, vec![json!("first line"), json!("second")]);
    }

    #[test]
    fn test_parse_records_reports_bad_line() {
        let error = parse_records(Path::new("in.ndjson"), "{}\n{broken\n").unwrap_err();
        assert!(error.is_client_fault());
        assert!(error.to_string().contains("in.ndjson:2"));
    }

    #[tokio::test]
    async fn test_records_unit_preserves_order() {
        let output = adapter("components.word_count:predict")
            .handle(BatchUnit::Records(vec![
                json!({"text": "a b c"}),
                json!({"text": ""}),
                json!({"text": "a"}),
            ]))
            .await;

        let counts: Vec<i64> = output
            .into_rows()
            .iter()
            .map(|row| row["word_count"].as_i64().unwrap())
            .collect();
        assert_eq!(counts, vec![3, 0, 1]);
    }

    #[tokio::test]
    async fn test_failure_record_carries_index() {
        let output = adapter("tests.picky:predict")
            .handle(BatchUnit::Records(vec![json!({}), json!({}), json!({"bad": 1})]))
            .await;

        assert_eq!(
            output,
            BatchOutput::Failed(FailureRecord {
                error: "item marked bad".to_string(),
                status: "failed".to_string(),
                code: "COMPONENT_EXECUTION_ERROR".to_string(),
                index: Some(2),
                file: None,
            })
        );
    }

    #[tokio::test]
    async fn test_run_files_in_order_and_write_rows() {
        let dir = TempDir::new().unwrap();
        let first = write_file(&dir, "one.jsonl", "{\"text\": \"a\"}\n{\"text\": \"a b\"}\n");
        let second = write_file(&dir, "two.txt", "x y z\n");
        let missing = dir.path().join("missing.jsonl");

        let adapter = adapter("components.word_count:predict");
        let outputs = adapter.run_files(&[first, second, missing]).await;

        assert_eq!(outputs.len(), 3);
        assert!(outputs[0].is_success());
        assert!(outputs[1].is_success());
        match &outputs[2] {
            BatchOutput::Failed(record) => assert_eq!(record.code, "IO_ERROR"),
            other => panic!("expected failure, got {other:?}"),
        }

        let rows: Vec<Value> = outputs
            .into_iter()
            .take(2)
            .flat_map(BatchOutput::into_rows)
            .collect();
        let target = dir.path().join("out.jsonl");
        assert_eq!(BatchAdapter::write_rows(&target, &rows).await.unwrap(), 3);

        let written = std::fs::read_to_string(&target).unwrap();
        let counts: Vec<i64> = written
            .lines()
            .map(|line| serde_json::from_str::<Value>(line).unwrap()["word_count"].as_i64().unwrap())
            .collect();
        assert_eq!(counts, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_failed_file_record_names_its_file() {
        let dir = TempDir::new().unwrap();
        let bad = write_file(&dir, "a.jsonl", "{}\n{\"bad\": true}\n{}\n");
        let good = write_file(&dir, "b.jsonl", "{}\n{}\n");

        let outputs = adapter("tests.picky:predict").run_files(&[bad.clone(), good]).await;

        match &outputs[0] {
            BatchOutput::Failed(record) => {
                assert_eq!(record.index, Some(1));
                assert_eq!(record.file.as_deref(), Some(bad.display().to_string().as_str()));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        let rows: Vec<Value> = outputs.into_iter().flat_map(BatchOutput::into_rows).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0]["file"].as_str().unwrap().ends_with("a.jsonl"));
        assert!(rows[1].get("file").is_none());
    }

    #[tokio::test]
    async fn test_invalid_utf8_file_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.jsonl");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

        let output = adapter("components.word_count:predict")
            .handle(BatchUnit::File(path))
            .await;

        match output {
            BatchOutput::Failed(record) => {
                assert_eq!(record.code, "DECODE_ERROR");
                assert!(record.file.unwrap().ends_with("binary.jsonl"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_online_score_mirrors_shape() {
        let adapter = adapter("components.word_count:predict");

        assert_eq!(adapter.score(json!({"text": "a b"})).await["word_count"], 2);
        assert!(adapter.score(json!([{"text": "a"}])).await.is_array());
    }

    #[tokio::test]
    async fn test_online_score_failure_record() {
        let scored = adapter("tests.picky:predict").score(json!({"bad": true})).await;
        assert_eq!(scored["status"], "failed");
        assert_eq!(scored["error"], "item marked bad");
        assert!(scored.get("index").is_none());
    }
}
