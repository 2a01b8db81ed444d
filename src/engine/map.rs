use log::{debug, info};

use super::{MapSummary, MapTask, Progress, TaskState};
use crate::codec::RecordWriter;
use crate::staging::StagedFile;
use crate::{partition, InputUnit, JobLayout, KeyValue, TaskError};

/// Runs one map task.
///
/// Reads the task's input unit, calls `map_fn` once on it and spreads the
/// emitted records over `n_reduce` intermediate files, one per reduce task,
/// by the hash of their keys. Records keep their emission order inside each
/// file.
///
/// The intermediate files are only put in place once every record has been
/// written. On failure none of this attempt's temporary files are left
/// behind, and the task can simply be run again.
pub fn perform_map<F>(
    layout: &JobLayout,
    task: &MapTask,
    map_fn: F,
) -> Result<MapSummary, TaskError>
where
    F: Fn(&str, &str) -> anyhow::Result<Vec<KeyValue>>,
{
    let mut progress = Progress::new(format!("map task {}", task.map_task));
    let result = run(layout, task, map_fn, &mut progress);
    progress.finish(result)
}

fn run<F>(
    layout: &JobLayout,
    task: &MapTask,
    map_fn: F,
    progress: &mut Progress,
) -> Result<MapSummary, TaskError>
where
    F: Fn(&str, &str) -> anyhow::Result<Vec<KeyValue>>,
{
    if task.n_reduce == 0 {
        return Err(TaskError::InvalidTask("n_reduce must be at least 1".into()));
    }

    progress.enter(TaskState::ReadingInputs);
    let unit = InputUnit::load(&task.input).map_err(|source| TaskError::ReadInput {
        path: task.input.clone(),
        source,
    })?;
    info!(
        "map task {}: mapping {} ({} bytes) into {} partitions",
        task.map_task,
        unit.name,
        unit.contents.len(),
        task.n_reduce
    );

    progress.enter(TaskState::Processing);
    let records = map_fn(&unit.name, &unit.contents).map_err(|source| TaskError::MapFunction {
        name: unit.name.clone(),
        source,
    })?;
    let emitted = records.len();

    progress.enter(TaskState::WritingOutput);
    let mut writers = (0..task.n_reduce)
        .map(|reduce_task| {
            let path = layout.intermediate_path(task.map_task, reduce_task);
            StagedFile::create(&path)
                .map(RecordWriter::new)
                .map_err(|source| TaskError::CreateOutput { path, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for kv in records {
        let bucket = partition(&kv.key, task.n_reduce);
        writers[bucket].write(&kv).map_err(|e| {
            TaskError::write_output(layout.intermediate_path(task.map_task, bucket), e)
        })?;
    }

    // Flush everything before moving any file into place.
    let mut staged = Vec::with_capacity(writers.len());
    for (reduce_task, writer) in writers.into_iter().enumerate() {
        let count = writer.written();
        let file = writer.into_inner().map_err(|e| {
            TaskError::write_output(layout.intermediate_path(task.map_task, reduce_task), e)
        })?;
        debug!(
            "map task {}: {} records for {}",
            task.map_task,
            count,
            file.dest().display()
        );
        staged.push(file);
    }

    let mut partitions = Vec::with_capacity(staged.len());
    for file in staged {
        let dest = file.dest().to_path_buf();
        partitions.push(file.commit().map_err(|e| TaskError::write_output(dest, e))?);
    }

    info!("map task {}: wrote {} records", task.map_task, emitted);
    Ok(MapSummary {
        records: emitted,
        partitions,
    })
}
