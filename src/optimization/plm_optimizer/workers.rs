//! plm_optimizer::workers — run-scoped worker pool for objective evaluation.
//!
//! With the `parallel` feature, [`WorkerPool`] owns a dedicated rayon pool
//! of exactly `num_threads` workers; every rayon call made inside
//! [`WorkerPool::install`] runs on that pool and not on the global one.
//! Without the feature the pool is a plain inline executor that only exists
//! for single-worker runs.
use std::thread;

use tracing::warn;

use crate::optimization::{
    errors::{OptError, OptResult},
    plm_optimizer::validation::validate_num_threads,
};

#[derive(Debug)]
pub struct WorkerPool {
    num_threads: usize,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Build a pool of `num_threads` workers.
    ///
    /// # Errors
    /// - Thread-count errors from [`validate_num_threads`].
    /// - [`OptError::ThreadPool`] if rayon cannot spawn the workers.
    ///
    /// A count above the host's available parallelism is kept as is and
    /// logged once here.
    pub fn new(num_threads: usize) -> OptResult<Self> {
        validate_num_threads(num_threads)?;
        if let Ok(available) = thread::available_parallelism() {
            if num_threads > available.get() {
                warn!(
                    num_threads,
                    available = available.get(),
                    "requested more worker threads than the host provides"
                );
            }
        }
        #[cfg(feature = "parallel")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .thread_name(|index| format!("plmdca-worker-{index}"))
                .build()
                .map_err(|err| OptError::ThreadPool { text: err.to_string() })?;
            Ok(Self { num_threads, pool })
        }
        #[cfg(not(feature = "parallel"))]
        {
            if num_threads != 1 {
                return Err(OptError::MultithreadingUnsupported { num_threads });
            }
            Ok(Self { num_threads })
        }
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Run `op` with this pool as the ambient rayon pool.
    pub fn install<R, OP>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        #[cfg(feature = "parallel")]
        {
            self.pool.install(op)
        }
        #[cfg(not(feature = "parallel"))]
        {
            op()
        }
    }
}
