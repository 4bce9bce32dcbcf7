use proptest::prelude::*;
use serde_json::{json, Value};

/// Strategy for dotted module paths such as `components.word_count`
pub fn module_path_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,12}(\\.[a-z_][a-z0-9_]{0,12}){0,3}"
}

/// Strategy for callable names
pub fn callable_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,20}"
}

/// Strategy for free text made of short words and irregular whitespace
pub fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(("[a-zA-Z]{1,12}", "[ \t\n]{1,3}"), 0..20).prop_map(|parts| {
        parts
            .into_iter()
            .map(|(word, gap)| format!("{word}{gap}"))
            .collect::<String>()
    })
}

/// Strategy for single input records
pub fn record_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        text_strategy().prop_map(|text| json!({ "text": text })),
        text_strategy().prop_map(|text| json!({ "text": text, "id": 7 })),
        Just(json!({})),
    ]
}

/// Strategy for batches of records
pub fn batch_strategy() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(record_strategy(), 0..16)
}
