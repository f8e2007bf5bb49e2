pub mod optimize;

pub use optimize::{OptimizeSummary, Optimizer};
