//! A MapReduce-compatible implementation of word count.
//!

use crate::*;
use anyhow::Result;

pub fn map(_name: &str, contents: &str) -> Result<Vec<KeyValue>> {
    Ok(workload::words(contents)
        .map(|word| KeyValue::new(word, "1"))
        .collect())
}

pub fn reduce(_key: &str, values: &[String]) -> Result<String> {
    Ok(values.len().to_string())
}
