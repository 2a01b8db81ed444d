//! Executors for a single map task or a single reduce task.
//!
//! Both executors are synchronous and own every file they touch, so any
//! number of them can run side by side on different threads or processes.
//! The only ordering the caller has to enforce is that all map tasks of a
//! job are done before its reduce tasks start.

use std::fmt;
use std::path::PathBuf;

use log::{trace, warn};

use crate::TaskError;

mod map;
mod reduce;

pub use map::perform_map;
pub use reduce::perform_reduce;

/// Identifies one map task of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapTask {
    /// Index of this map task, in `[0, n_map)`.
    pub map_task: usize,
    /// The input unit this task maps.
    pub input: PathBuf,
    /// Number of reduce tasks, and so of intermediate files to produce.
    pub n_reduce: usize,
}

/// Identifies one reduce task of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceTask {
    /// Index of this reduce task, in `[0, n_reduce)`.
    pub reduce_task: usize,
    /// Number of map tasks that ran, and so of intermediate files to read.
    pub n_map: usize,
}

/// What a successful map task produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSummary {
    /// Records emitted by the map function.
    pub records: usize,
    /// Intermediate files, indexed by reduce task.
    pub partitions: Vec<PathBuf>,
}

/// What a successful reduce task produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReduceSummary {
    /// Distinct keys, one output record each.
    pub keys: usize,
    /// Intermediate records read across all map tasks.
    pub records: usize,
    pub output: PathBuf,
}

/// Lifecycle of a task. Any state may move to `Failed`, which is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Start,
    ReadingInputs,
    Processing,
    WritingOutput,
    Done,
    Failed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Start => "start",
            TaskState::ReadingInputs => "reading inputs",
            TaskState::Processing => "processing",
            TaskState::WritingOutput => "writing output",
            TaskState::Done => "done",
            TaskState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Tracks and logs the state of one running task.
pub(crate) struct Progress {
    task: String,
    state: TaskState,
}

impl Progress {
    pub(crate) fn new(task: String) -> Self {
        trace!("{task}: {}", TaskState::Start);
        Self {
            task,
            state: TaskState::Start,
        }
    }

    pub(crate) fn task(&self) -> &str {
        &self.task
    }

    pub(crate) fn state(&self) -> TaskState {
        self.state
    }

    pub(crate) fn enter(&mut self, next: TaskState) {
        debug_assert!(!matches!(self.state, TaskState::Done | TaskState::Failed));
        trace!("{}: {} -> {}", self.task, self.state, next);
        self.state = next;
    }

    /// Moves to `Done` or `Failed` depending on how the task ended.
    pub(crate) fn finish<T>(mut self, result: Result<T, TaskError>) -> Result<T, TaskError> {
        match &result {
            Ok(_) => self.enter(TaskState::Done),
            Err(e) => {
                warn!("{} failed while {}: {}", self.task(), self.state(), e);
                self.enter(TaskState::Failed);
            }
        }
        result
    }
}
