use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use mrshuffle::cmd::task::{Args, TaskSpec};
use mrshuffle::*;

fn run(args: &Args) -> Result<()> {
    let engine = workload::named(&args.workload)?;
    let layout = args.layout();
    info!(
        "job {} ({}) in {}",
        layout.job(),
        args.workload,
        layout.dir().display()
    );
    match args.task() {
        TaskSpec::Map(task) => {
            let summary = perform_map(&layout, &task, engine.map_fn)
                .with_context(|| format!("map task {} of job {}", task.map_task, layout.job()))?;
            info!(
                "{} records into {} partitions",
                summary.records,
                summary.partitions.len()
            );
        }
        TaskSpec::Reduce(task) => {
            let summary = perform_reduce(&layout, &task, engine.reduce_fn).with_context(|| {
                format!("reduce task {} of job {}", task.reduce_task, layout.job())
            })?;
            info!("{} keys into {}", summary.keys, summary.output.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // The task is dead; whoever launched it decides whether to run it again.
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
