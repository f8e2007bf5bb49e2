//! Hi-C guided ordering and orientation of contigs within a linkage group.

pub mod config;
pub mod dist;
pub mod error;
pub mod graph;
pub mod io;
pub mod pipeline;
pub mod stats;

pub use config::OptimizerConfig;
pub use error::{Result, ScaffoldError};
pub use pipeline::{OptimizeSummary, Optimizer};
