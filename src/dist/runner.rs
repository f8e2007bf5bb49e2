use crate::error::{Result, ScaffoldError};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use tracing::debug;

/// Fan-out/fan-in evaluator over a bounded rayon pool.
///
/// Each task writes only its own result slot, and [`ParallelRunner::run`]
/// returns after every task has finished, so callers never observe a
/// partially filled result vector.
#[derive(Clone)]
pub struct ParallelRunner {
    pool: Arc<ThreadPool>,
}

impl ParallelRunner {
    pub fn new(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("hicorder-worker-{}", i))
            .build()
            .map_err(|e| ScaffoldError::Config(format!("cannot build thread pool: {}", e)))?;
        debug!("Worker pool ready with {} threads", threads);
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Evaluate `f(task_id, task)` for every task in parallel. Result `i`
    /// belongs to `tasks[i]`.
    pub fn run<T, R, F>(&self, tasks: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send + Default,
        F: Fn(usize, &T) -> R + Sync + Send,
    {
        let mut results: Vec<R> = std::iter::repeat_with(R::default).take(tasks.len()).collect();
        self.pool.install(|| {
            results
                .par_iter_mut()
                .zip(tasks.par_iter())
                .enumerate()
                .for_each(|(i, (slot, task))| *slot = f(i, task));
        });
        results
    }
}

impl std::fmt::Debug for ParallelRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelRunner")
            .field("threads", &self.threads())
            .finish()
    }
}
