//! The partition-and-shuffle core of a MapReduce (lite) system.
//!
//! A job is split into `n_map` map tasks and `n_reduce` reduce tasks. Each
//! map task runs a user map function over one input unit and spreads its
//! output over `n_reduce` intermediate files; each reduce task gathers one
//! intermediate file from every map task, groups and sorts by key, and runs
//! the user reduce function once per key. The two phases only meet through
//! the file names handed out by [`addressing::JobLayout`].
//!
//! Scheduling the tasks is left to the caller.

use serde::{Deserialize, Serialize};
use std::fs;
use std::hash::Hasher;
use std::io;
use std::path::Path;

pub mod addressing;
pub mod cmd;
pub mod codec;
pub mod engine;
pub mod error;
pub mod staging;
pub mod workload;

pub use addressing::JobLayout;
pub use engine::{perform_map, perform_reduce, MapSummary, MapTask, ReduceSummary, ReduceTask};
pub use error::TaskError;

/////////////////////////////////////////////////////////////////////////////
// MapReduce application types
/////////////////////////////////////////////////////////////////////////////

/// A map function takes the name and contents of an input unit.
///
/// It returns every key-value pair emitted for that unit, in emission order.
pub type MapFn = fn(name: &str, contents: &str) -> anyhow::Result<Vec<KeyValue>>;

/// A reduce function takes in a key and all values emitted for that key.
/// It returns an [`anyhow::Result`] containing a single output value.
pub type ReduceFn = fn(key: &str, values: &[String]) -> anyhow::Result<String>;

/// A map reduce application.
#[derive(Copy, Clone)]
pub struct Workload {
    pub map_fn: MapFn,
    pub reduce_fn: ReduceFn,
}

/////////////////////////////////////////////////////////////////////////////
// Key-value pairs
/////////////////////////////////////////////////////////////////////////////

/// A single key-value pair.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct KeyValue {
    /// The key.
    pub key: String,
    /// The value.
    pub value: String,
}

impl KeyValue {
    /// Construct a new key-value pair from the given key and value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Get the key of this key-value pair.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the value of this key-value pair.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Consumes the key-value pair and returns the key.
    #[inline]
    pub fn into_key(self) -> String {
        self.key
    }

    /// Consumes the key-value pair and returns the value.
    #[inline]
    pub fn into_value(self) -> String {
        self.value
    }
}

/// One named blob of text handed to a map task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputUnit {
    pub name: String,
    pub contents: String,
}

impl InputUnit {
    /// Reads the whole file at `path`. The unit is named after the path as given.
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    pub fn load(path: &Path) -> io::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(Self {
            name: path.display().to_string(),
            contents,
        })
    }
}

/////////////////////////////////////////////////////////////////////////////
// Partitioning
/////////////////////////////////////////////////////////////////////////////

/// Hashes an intermediate key. Compute a reduce bucket for a given key
/// by calculating `ihash(key) % n_reduce`.
///
/// FNV-1a over the raw UTF-8 bytes, so the result is the same in every
/// process that computes it.
pub fn ihash(key: &str) -> u32 {
    let mut hasher = fnv::FnvHasher::default();
    hasher.write(key.as_bytes());
    (hasher.finish() & 0x7fff_ffff) as u32
}

/// The reduce bucket, in `[0, n_reduce)`, that `key` is routed to.
///
/// # Panics
///
/// Panics if `n_reduce` is zero.
#[inline]
pub fn partition(key: &str, n_reduce: usize) -> usize {
    assert!(n_reduce > 0, "n_reduce must be positive");
    ihash(key) as usize % n_reduce
}
