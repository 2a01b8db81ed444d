//! Names of the files that connect map tasks to reduce tasks.

use std::path::{Path, PathBuf};

/// Name of the intermediate file written by map task `map_task` for
/// reduce task `reduce_task`.
pub fn intermediate_name(job: &str, map_task: usize, reduce_task: usize) -> String {
    format!("mrtmp.{job}-{map_task}-{reduce_task}")
}

/// Name of the final output file of reduce task `reduce_task`.
pub fn output_name(job: &str, reduce_task: usize) -> String {
    format!("mrtmp.{job}-res-{reduce_task}")
}

/// Where the files of one job live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLayout {
    dir: PathBuf,
    job: String,
}

impl JobLayout {
    pub fn new(dir: impl Into<PathBuf>, job: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            job: job.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    pub fn intermediate_path(&self, map_task: usize, reduce_task: usize) -> PathBuf {
        self.dir.join(intermediate_name(&self.job, map_task, reduce_task))
    }

    pub fn output_path(&self, reduce_task: usize) -> PathBuf {
        self.dir.join(output_name(&self.job, reduce_task))
    }
}
