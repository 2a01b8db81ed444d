use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::codec::CodecError;

/// Why a map or reduce task failed.
///
/// Every variant is fatal to the task: nothing is retried here, and the
/// caller is expected to run the whole task again.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("cannot read input unit {}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("map function failed on {name}")]
    MapFunction {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("reduce function failed on key {key:?}")]
    ReduceFunction {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("cannot create output {}", path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("cannot open intermediate file {}", path.display())]
    OpenIntermediate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt intermediate file {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

impl TaskError {
    pub(crate) fn write_output(path: impl Into<PathBuf>, source: impl Into<CodecError>) -> Self {
        TaskError::WriteOutput {
            path: path.into(),
            source: source.into(),
        }
    }
}
