//! # Text Processor Component
//!
//! Counts words and keeps only those within a configured length window.
//! Registered as `components.text_processor:predict`.

use super::{text_of, Component, ComponentSettings};
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextProcessor {
    min_length: usize,
    max_length: usize,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self {
            min_length: 3,
            max_length: 100,
        }
    }
}

impl TextProcessor {
    pub fn new(min_length: usize, max_length: usize) -> Result<Self> {
        if min_length > max_length {
            bail!("min_length ({min_length}) exceeds max_length ({max_length})");
        }
        Ok(Self {
            min_length,
            max_length,
        })
    }

    /// Build from component settings; `min_length` and `max_length` fall back
    /// to the defaults when absent
    pub fn from_settings(settings: &ComponentSettings) -> Result<Self> {
        let defaults = Self::default();
        let min_length = length_setting(settings, "min_length", defaults.min_length)?;
        let max_length = length_setting(settings, "max_length", defaults.max_length)?;
        Self::new(min_length, max_length)
    }

    pub fn process(&self, text: &str) -> Value {
        let words: Vec<&str> = text.split_whitespace().collect();
        let filtered: Vec<&str> = words
            .iter()
            .copied()
            .filter(|w| (self.min_length..=self.max_length).contains(&w.chars().count()))
            .collect();

        json!({
            "original_text": text,
            "word_count": words.len(),
            "filtered_word_count": filtered.len(),
            "filtered_text": filtered.join(" "),
        })
    }
}

fn length_setting(settings: &ComponentSettings, key: &str, default: usize) -> Result<usize> {
    match settings.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => match value.as_u64().and_then(|n| usize::try_from(n).ok()) {
            Some(n) => Ok(n),
            None => bail!("{key} must be a non-negative integer, got {value}"),
        },
    }
}

#[async_trait]
impl Component for TextProcessor {
    fn name(&self) -> &str {
        "text_processor"
    }

    async fn predict(&self, input: Value) -> Result<Value> {
        match &input {
            Value::Object(_) | Value::String(_) => Ok(self.process(&text_of(&input))),
            other => bail!("text_processor expects a mapping or a string, got {other}"),
        }
    }
}
