//! Worker pool for configuration-level parallelism

use rayon::prelude::*;
use stkfold_core::{Error, Result};

/// Processing mode for a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// One configuration at a time
    Sequential,
    /// Parallel over configurations using the global pool
    #[default]
    Parallel,
    /// Parallel with a dedicated pool of the given size
    ParallelWith(usize),
}

impl ProcessingMode {
    /// `0` means "all cores", `1` sequential, anything else a sized pool.
    pub fn from_threads(threads: usize) -> Self {
        match threads {
            0 => ProcessingMode::Parallel,
            1 => ProcessingMode::Sequential,
            n => ProcessingMode::ParallelWith(n),
        }
    }
}

/// Process-wide worker pool.
///
/// Created once at start-up and dropped at shutdown; dropping a dedicated
/// pool waits for its queued work to drain.
pub struct WorkerPool {
    mode: ProcessingMode,
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    pub fn new(mode: ProcessingMode) -> Result<Self> {
        let pool = match mode {
            ProcessingMode::ParallelWith(0) => {
                return Err(Error::invalid("threads", 0, "thread count must be positive"));
            }
            ProcessingMode::ParallelWith(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("stkfold-worker-{i}"))
                    .build()
                    .map_err(|e| Error::Configuration(format!("failed to build thread pool: {e}")))?,
            ),
            _ => None,
        };
        Ok(Self { mode, pool })
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    /// Number of threads work is spread over.
    pub fn threads(&self) -> usize {
        match (&self.mode, &self.pool) {
            (ProcessingMode::Sequential, _) => 1,
            (_, Some(pool)) => pool.current_num_threads(),
            _ => num_cpus(),
        }
    }

    /// Map `f` over `items`, keeping input order in the output.
    pub fn map<T, U, F>(&self, items: &[T], f: F) -> Vec<U>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        match (&self.mode, &self.pool) {
            (ProcessingMode::Sequential, _) => items.iter().map(f).collect(),
            (_, Some(pool)) => pool.install(|| items.par_iter().map(f).collect()),
            _ => items.par_iter().map(f).collect(),
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self {
            mode: ProcessingMode::Parallel,
            pool: None,
        }
    }
}

/// Get the number of available CPU cores
pub fn num_cpus() -> usize {
    rayon::current_num_threads()
}
