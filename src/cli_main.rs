use clap::{Parser, Subcommand};
use hicorder::config::OptimizerConfig;
use hicorder::error::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hicorder", version, about = "Order and orient contigs from Hi-C contact links", long_about = None)]
pub struct Cli {
    /// Log debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Optimize the order and orientation of one contig group
    Optimize {
        /// Contact file (.clm or .clm.gz)
        clm: PathBuf,

        /// Contig catalog, defaults to the .ids next to the contact file
        #[arg(long)]
        ids: Option<PathBuf>,

        /// Trace file, defaults to the .tour next to the contact file
        #[arg(long)]
        tour: Option<PathBuf>,

        /// Write a JSON run summary to this path
        #[arg(long)]
        summary: Option<PathBuf>,

        /// JSON file overriding the default settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// GA population size
        #[arg(long)]
        npop: Option<usize>,

        /// Generations without improvement before a GA phase stops
        #[arg(long)]
        ngen: Option<usize>,

        /// Mutation probability
        #[arg(long)]
        mutpb: Option<f64>,

        /// Only optimize orientations, keep the initial order
        #[arg(long)]
        skip_ga: bool,

        /// Hot start from the last snapshot of the trace file
        #[arg(long)]
        resume: bool,

        /// Number of threads
        #[arg(long)]
        threads: Option<usize>,
    },
}

/// Defaults, then the JSON config, then explicit flags
pub fn build_config(command: &Commands) -> Result<OptimizerConfig> {
    let Commands::Optimize {
        tour,
        config,
        seed,
        npop,
        ngen,
        mutpb,
        skip_ga,
        resume,
        threads,
        ..
    } = command;

    let mut cfg = match config {
        Some(path) => OptimizerConfig::from_json_file(path)?,
        None => OptimizerConfig::default(),
    };
    if let Some(tour) = tour {
        cfg.tour_file = Some(tour.clone());
    }
    if let Some(seed) = seed {
        cfg.seed = *seed;
    }
    if let Some(npop) = npop {
        cfg.npop = *npop;
    }
    if let Some(ngen) = ngen {
        cfg.ngen = *ngen;
    }
    if let Some(mutpb) = mutpb {
        cfg.mutation_rate = *mutpb;
    }
    if let Some(threads) = threads {
        cfg.threads = *threads;
    }
    if *skip_ga {
        cfg.run_ga = false;
    }
    if *resume {
        cfg.resume = true;
    }
    cfg.validate()?;
    Ok(cfg)
}
