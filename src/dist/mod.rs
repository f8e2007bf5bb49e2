pub mod runner;

pub use runner::ParallelRunner;
