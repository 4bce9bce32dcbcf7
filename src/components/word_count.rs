//! # Word Count Component
//!
//! Counts whitespace-separated words and reports simple length statistics.
//! Registered as `components.word_count:predict`, the runtime's default
//! component.

use super::{text_of, Component};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, Copy)]
pub struct WordCount;

impl WordCount {
    pub fn new() -> Self {
        Self
    }

    /// Count words in a single text
    pub fn analyze(text: &str) -> Value {
        let words: Vec<&str> = text.split_whitespace().collect();

        let mut length_distribution: BTreeMap<usize, u64> = BTreeMap::new();
        for word in &words {
            *length_distribution.entry(word.chars().count()).or_default() += 1;
        }

        let total_chars: usize = words.iter().map(|w| w.chars().count()).sum();
        let average_word_length = total_chars as f64 / words.len().max(1) as f64;

        let distribution: Map<String, Value> = length_distribution
            .into_iter()
            .map(|(len, count)| (len.to_string(), json!(count)))
            .collect();

        json!({
            "text": text,
            "word_count": words.len(),
            "character_count": text.chars().count(),
            "average_word_length": average_word_length,
            "length_distribution": distribution,
        })
    }
}

#[async_trait]
impl Component for WordCount {
    fn name(&self) -> &str {
        "word_count"
    }

    async fn predict(&self, input: Value) -> Result<Value> {
        Ok(Self::analyze(&text_of(&input)))
    }
}
