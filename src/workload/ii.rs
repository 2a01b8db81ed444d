//! An inverted index: for every word, the documents it appears in.
//!

use crate::*;
use anyhow::Result;
use itertools::Itertools;

/// Emits `(word, document)` once for each distinct word of the document.
pub fn map(name: &str, contents: &str) -> Result<Vec<KeyValue>> {
    Ok(workload::words(contents)
        .unique()
        .map(|word| KeyValue::new(word, name))
        .collect())
}

/// Produces `"<count> <doc>,<doc>,..."` with the documents sorted.
pub fn reduce(_key: &str, values: &[String]) -> Result<String> {
    let docs = values.iter().sorted().dedup().collect_vec();
    Ok(format!("{} {}", docs.len(), docs.iter().join(",")))
}
