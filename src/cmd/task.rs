use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{JobLayout, MapTask, ReduceTask};

#[derive(Parser, Debug)]
#[command(version, about = "Runs a single map or reduce task", long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Commands,

    /// Directory holding the job's intermediate and output files
    #[clap(short, long, default_value = ".", global = true)]
    pub dir: PathBuf,

    /// Name of the job, used to address its files
    #[clap(short, long, global = true, default_value = "mr")]
    pub job: String,

    /// Name of the built-in application to run (`wc` or `ii`)
    #[clap(short, long, global = true, default_value = "wc")]
    pub workload: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Map one input file into intermediate partitions
    Map {
        /// Index of this map task
        #[arg(short, long)]
        task: usize,

        /// Input file to map
        #[arg(short, long)]
        input: PathBuf,

        /// Number of reduce tasks in the job
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        n_reduce: u32,
    },
    /// Reduce one partition from every map task into an output file
    Reduce {
        /// Index of this reduce task
        #[arg(short, long)]
        task: usize,

        /// Number of map tasks that ran in the job
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        n_map: u32,
    },
}

/// The single task an invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSpec {
    Map(MapTask),
    Reduce(ReduceTask),
}

impl Args {
    pub fn layout(&self) -> JobLayout {
        JobLayout::new(&self.dir, &self.job)
    }

    pub fn task(&self) -> TaskSpec {
        match &self.command {
            Commands::Map {
                task,
                input,
                n_reduce,
            } => TaskSpec::Map(MapTask {
                map_task: *task,
                input: input.clone(),
                n_reduce: *n_reduce as usize,
            }),
            Commands::Reduce { task, n_map } => TaskSpec::Reduce(ReduceTask {
                reduce_task: *task,
                n_map: *n_map as usize,
            }),
        }
    }
}
