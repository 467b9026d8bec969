use rayon::prelude::*;

use crate::config::ExecutionMode;
use crate::error::{Result, RfeError};

/// Runs independent tasks either on the calling thread or on a rayon pool.
/// Results always come back in task-index order.
pub enum Executor {
    Inline,
    Pool(rayon::ThreadPool),
}

impl Executor {
    pub fn from_mode(mode: &ExecutionMode) -> Result<Self> {
        match mode {
            ExecutionMode::Sequential => Ok(Executor::Inline),
            ExecutionMode::Parallel { n_threads } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(*n_threads)
                    .thread_name(|i| format!("omigami-outer-{}", i))
                    .build()
                    .map_err(|e| RfeError::ThreadPool(e.to_string()))?;
                Ok(Executor::Pool(pool))
            }
        }
    }

    pub fn n_threads(&self) -> usize {
        match self {
            Executor::Inline => 1,
            Executor::Pool(pool) => pool.current_num_threads(),
        }
    }

    /// Run `task(0)`, ..., `task(n_tasks - 1)` and collect the results by index.
    pub fn map_ordered<T, F>(&self, n_tasks: usize, task: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync,
    {
        match self {
            Executor::Inline => (0..n_tasks).map(task).collect(),
            Executor::Pool(pool) => pool.install(|| (0..n_tasks).into_par_iter().map(&task).collect()),
        }
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Executor::Inline => write!(f, "Executor::Inline"),
            Executor::Pool(pool) => write!(f, "Executor::Pool({} threads)", pool.current_num_threads()),
        }
    }
}
