//! # Batch Adapter Integration Tests
//!
//! Mini-batch files on disk through the offline entry points.

mod common;

use common::{test_config, test_registry};
use foundry_runtime::adapters::{BatchAdapter, BatchOutput, BatchUnit};
use foundry_runtime::{AdapterKind, BackendAdapter, FoundryRuntime};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

fn adapter(handler: &str) -> BatchAdapter {
    let runtime = FoundryRuntime::new(test_config(AdapterKind::Batch, handler), test_registry());
    BatchAdapter::new(runtime.adapter_runtime())
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn test_mixed_file_formats_keep_row_order() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write(&dir, "part-0.jsonl", "{\"text\": \"a\"}\n{\"text\": \"a b\"}\n"),
        write(&dir, "part-1.json", r#"[{"text": "a b c"}, {"text": ""}]"#),
        write(&dir, "part-2.csv", "one two\nthree\n"),
    ];

    let outputs = adapter("components.word_count:predict")
        .run_files(&inputs)
        .await;
    assert!(outputs.iter().all(BatchOutput::is_success));

    let counts: Vec<i64> = outputs
        .into_iter()
        .flat_map(BatchOutput::into_rows)
        .map(|row| row["word_count"].as_i64().unwrap())
        .collect();
    assert_eq!(counts, vec![1, 2, 3, 0, 2, 1]);
}

#[tokio::test]
async fn test_failed_file_yields_failure_record_in_place() {
    let dir = TempDir::new().unwrap();
    let inputs = vec![
        write(&dir, "ok.jsonl", "{}\n"),
        write(&dir, "bad.jsonl", "{}\n{\"bad\": 1}\n{}\n"),
        write(&dir, "ok-again.jsonl", "{}\n"),
    ];

    let adapter = adapter("tests.picky:predict");
    let outputs = adapter.run_files(&inputs).await;

    assert_eq!(outputs.len(), 3);
    assert!(outputs[0].is_success());
    assert!(outputs[2].is_success());
    match &outputs[1] {
        BatchOutput::Failed(record) => {
            assert_eq!(record.status, "failed");
            assert_eq!(record.index, Some(1));
            assert_eq!(record.code, "COMPONENT_EXECUTION_ERROR");
            assert!(record.file.as_deref().unwrap().ends_with("bad.jsonl"));
        }
        other => panic!("expected failure record, got {other:?}"),
    }

    let out_dir = TempDir::new().unwrap();
    let target = out_dir.path().join("scored.jsonl");
    let rows: Vec<Value> = outputs.into_iter().flat_map(BatchOutput::into_rows).collect();
    BatchAdapter::write_rows(&target, &rows).await.unwrap();

    let lines: Vec<Value> = std::fs::read_to_string(&target)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1]["status"], "failed");
    assert!(lines[1]["file"].as_str().unwrap().ends_with("bad.jsonl"));
}

#[tokio::test]
async fn test_in_memory_records_unit() {
    let output = adapter("examples.wordcount:predict")
        .handle(BatchUnit::Records(vec![json!({"text": "x"}), json!({"text": "x y"})]))
        .await;

    assert_eq!(
        output,
        BatchOutput::Rows(vec![json!({"word_count": 1}), json!({"word_count": 2})])
    );
}

#[tokio::test]
async fn test_batch_health_reports_adapter_without_resolving() {
    let adapter = adapter("examples.wordcount:predict");
    let status = adapter.health();

    assert_eq!(status.adapter, Some(AdapterKind::Batch));
    assert_eq!(status.handler, "examples.wordcount:predict");
    assert!(!status.ready);
}
