use std::collections::HashMap;
use std::fs::File;

use itertools::Itertools;
use log::{debug, info};

use super::{Progress, ReduceSummary, ReduceTask, TaskState};
use crate::codec::{RecordReader, RecordWriter};
use crate::staging::StagedFile;
use crate::{JobLayout, KeyValue, TaskError};

/// Runs one reduce task.
///
/// Reads the intermediate file addressed to this task from every map task,
/// groups the values by key (map task order first, then emission order),
/// and calls `reduce_fn` once per distinct key in ascending key order.
/// The results are written to the task's output file, which only appears
/// once it is complete.
pub fn perform_reduce<F>(
    layout: &JobLayout,
    task: &ReduceTask,
    reduce_fn: F,
) -> Result<ReduceSummary, TaskError>
where
    F: Fn(&str, &[String]) -> anyhow::Result<String>,
{
    let mut progress = Progress::new(format!("reduce task {}", task.reduce_task));
    let result = run(layout, task, reduce_fn, &mut progress);
    progress.finish(result)
}

fn run<F>(
    layout: &JobLayout,
    task: &ReduceTask,
    reduce_fn: F,
    progress: &mut Progress,
) -> Result<ReduceSummary, TaskError>
where
    F: Fn(&str, &[String]) -> anyhow::Result<String>,
{
    if task.n_map == 0 {
        return Err(TaskError::InvalidTask("n_map must be at least 1".into()));
    }

    progress.enter(TaskState::ReadingInputs);
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    let mut records = 0;
    for map_task in 0..task.n_map {
        let path = layout.intermediate_path(map_task, task.reduce_task);
        let file = File::open(&path).map_err(|source| TaskError::OpenIntermediate {
            path: path.clone(),
            source,
        })?;
        let mut count = 0;
        for kv in RecordReader::new(file) {
            let KeyValue { key, value } = kv.map_err(|source| TaskError::Decode {
                path: path.clone(),
                source,
            })?;
            grouped.entry(key).or_default().push(value);
            count += 1;
        }
        debug!("reduce task {}: {} records from {}", task.reduce_task, count, path.display());
        records += count;
    }

    progress.enter(TaskState::Processing);
    let output = grouped
        .into_iter()
        .sorted_unstable_by(|a, b| a.0.cmp(&b.0))
        .map(|(key, values)| match reduce_fn(&key, &values) {
            Ok(value) => Ok(KeyValue { key, value }),
            Err(source) => Err(TaskError::ReduceFunction { key, source }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    progress.enter(TaskState::WritingOutput);
    let path = layout.output_path(task.reduce_task);
    let staged = StagedFile::create(&path).map_err(|source| TaskError::CreateOutput {
        path: path.clone(),
        source,
    })?;
    let mut writer = RecordWriter::new(staged);
    for kv in &output {
        writer
            .write(kv)
            .map_err(|e| TaskError::write_output(&path, e))?;
    }
    let staged = writer
        .into_inner()
        .map_err(|e| TaskError::write_output(&path, e))?;
    let path = staged
        .commit()
        .map_err(|e| TaskError::write_output(&path, e))?;

    info!(
        "reduce task {}: reduced {} records from {} map tasks into {} keys at {}",
        task.reduce_task,
        records,
        task.n_map,
        output.len(),
        path.display()
    );
    Ok(ReduceSummary {
        keys: output.len(),
        records,
        output: path,
    })
}
