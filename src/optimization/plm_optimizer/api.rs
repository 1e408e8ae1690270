//! High-level entry points for fitting fields and couplings.
//!
//! [`PlmRun`] is the run-scoped driver: it owns the validated
//! configuration and the worker pool and borrows the model. Construction
//! performs every check that can fail before optimization starts, in a
//! fixed order:
//!
//! 1. configuration (worker count first, then iteration ceiling and solver
//!    settings),
//! 2. worker-pool construction,
//! 3. the model's own dimension check.
//!
//! [`PlmRun::run`] then sizes and allocates the parameter vector, lets the
//! model initialize it, and hands it to the L-BFGS runner. Runs share no
//! state, so independent runs may proceed concurrently.
use tracing::debug;

use crate::optimization::{
    errors::{OptError, OptResult},
    plm_optimizer::{
        adapter::PlmAdapter,
        builders::build_optimizer,
        layout::checked_total_num_params,
        run::run_lbfgs,
        traits::{AlignmentModel, PlmConfig, PlmOutcome},
        types::Theta,
        workers::WorkerPool,
    },
};

pub struct PlmRun<'a, M: AlignmentModel> {
    model: &'a M,
    config: PlmConfig,
    workers: WorkerPool,
}

impl<'a, M: AlignmentModel> PlmRun<'a, M> {
    /// Validate `config`, build the worker pool, and let the model check the
    /// problem dimensions.
    ///
    /// # Errors
    /// - Configuration errors (`InvalidThreadCount`,
    ///   `MultithreadingUnsupported`, `InvalidMaxIter`, solver settings).
    /// - `ThreadPool` if the workers cannot be spawned.
    /// - Whatever the model's `check` rejects.
    pub fn new(model: &'a M, config: &PlmConfig) -> OptResult<Self> {
        config.validate()?;
        let workers = WorkerPool::new(config.num_threads)?;
        model.check(&config.dims)?;
        Ok(Self { model, config: *config, workers })
    }

    pub fn config(&self) -> &PlmConfig {
        &self.config
    }

    /// Allocate, initialize, and optimize the parameter vector.
    ///
    /// # Errors
    /// - `ParameterCountOverflow` / `AllocationFailed` while sizing the
    ///   buffer; the optimizer is never started.
    /// - `ParamLengthMismatch` if the model resized the buffer.
    /// - Model and backend errors raised during optimization.
    pub fn run(&self) -> OptResult<PlmOutcome> {
        let dims = self.config.dims;
        let num_params = checked_total_num_params(dims.sequence_length, dims.num_site_states)
            .ok_or(OptError::ParameterCountOverflow {
                sequence_length: dims.sequence_length,
                num_site_states: dims.num_site_states,
            })?;

        let mut storage: Vec<f64> = Vec::new();
        storage
            .try_reserve_exact(num_params)
            .map_err(|_| OptError::AllocationFailed { num_params })?;
        storage.resize(num_params, 0.0);
        let mut theta0 = Theta::from_vec(storage);

        self.model.initialize(&mut theta0)?;
        if theta0.len() != num_params {
            return Err(OptError::ParamLengthMismatch { expected: num_params, found: theta0.len() });
        }
        debug!(
            sequence_length = dims.sequence_length,
            num_site_states = dims.num_site_states,
            num_params,
            num_threads = self.workers.num_threads(),
            "starting plmDCA optimization"
        );

        let problem = PlmAdapter::new(self.model, &self.workers);
        let solver = build_optimizer(&self.config.lbfgs)?;
        run_lbfgs(theta0, dims, self.config.max_iterations, self.config.verbose, problem, solver)
    }
}

/// Fit fields and couplings for `model` under `config`.
///
/// Shorthand for `PlmRun::new(model, config)?.run()`.
pub fn plmdca<M: AlignmentModel>(model: &M, config: &PlmConfig) -> OptResult<PlmOutcome> {
    PlmRun::new(model, config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::plm_optimizer::{
        layout::ProblemDims,
        traits::Termination,
        types::{Cost, Grad},
    };
    use approx::assert_abs_diff_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The driver's check order and allocation contract.
    // - Convergence on a separable quadratic.
    // - Recovery of the starting point when the first line search fails.
    // - The verbose terminal log line for converged and failed runs.
    //
    // Real alignment models are exercised in the integration tests.
    // -------------------------------------------------------------------------

    /// `f(x) = Σ (x_k − 1)²`, counting `initialize` calls.
    struct Bowl {
        initialized: AtomicUsize,
    }

    impl Bowl {
        fn new() -> Self {
            Self { initialized: AtomicUsize::new(0) }
        }
    }

    impl AlignmentModel for Bowl {
        fn check(&self, _dims: &ProblemDims) -> OptResult<()> {
            Ok(())
        }

        fn initialize(&self, buffer: &mut Theta) -> OptResult<()> {
            self.initialized.fetch_add(1, Ordering::SeqCst);
            buffer.fill(0.0);
            Ok(())
        }

        fn gradient(&self, x: &Theta, grad: &mut Grad) -> OptResult<Cost> {
            grad.assign(&x.mapv(|v| 2.0 * (v - 1.0)));
            Ok(x.mapv(|v| (v - 1.0).powi(2)).sum())
        }
    }

    /// Flat at the origin and one unit higher everywhere else, with a
    /// gradient that keeps promising descent. No step is ever accepted.
    struct Cliff;

    impl AlignmentModel for Cliff {
        fn check(&self, _dims: &ProblemDims) -> OptResult<()> {
            Ok(())
        }

        fn initialize(&self, buffer: &mut Theta) -> OptResult<()> {
            buffer.fill(0.0);
            Ok(())
        }

        fn gradient(&self, x: &Theta, grad: &mut Grad) -> OptResult<Cost> {
            grad.fill(1.0);
            Ok(if x.iter().all(|&v| v == 0.0) { 0.0 } else { 1.0 })
        }
    }

    struct Picky;

    impl AlignmentModel for Picky {
        fn check(&self, dims: &ProblemDims) -> OptResult<()> {
            Err(OptError::InvalidDimensions {
                sequence_length: dims.sequence_length,
                num_site_states: dims.num_site_states,
                reason: "Unsupported alphabet.",
            })
        }

        fn initialize(&self, _buffer: &mut Theta) -> OptResult<()> {
            Ok(())
        }

        fn gradient(&self, _x: &Theta, _grad: &mut Grad) -> OptResult<Cost> {
            Ok(0.0)
        }
    }

    fn config(max_iterations: usize) -> PlmConfig {
        PlmConfig::new(ProblemDims::new(2, 5).unwrap(), max_iterations, 1, false).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // A well-posed quadratic converges to its minimizer.
    //
    // Given
    // -----
    // - L = 2, Q = 5 (35 parameters), `f(x) = Σ (x_k − 1)²`, zero start.
    //
    // Expect
    // ------
    // - `Termination::Converged`, every entry ≈ 1, value ≈ 0, one
    //   `initialize` call, and a non-empty history.
    fn quadratic_converges() {
        // Arrange
        let model = Bowl::new();

        // Act
        let outcome = plmdca(&model, &config(100)).unwrap();

        // Assert
        assert_eq!(outcome.termination, Termination::Converged);
        assert_eq!(outcome.termination_code(), 0);
        assert_eq!(outcome.fields_and_couplings.len(), 35);
        for &v in outcome.fields_and_couplings.params().unwrap() {
            assert_abs_diff_eq!(v, 1.0, epsilon = 1e-4);
        }
        assert_abs_diff_eq!(outcome.value, 0.0, epsilon = 1e-8);
        assert_eq!(model.initialized.load(Ordering::SeqCst), 1);
        assert!(!outcome.history.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // A first line search that never finds an acceptable step yields the
    // starting vector, not an error.
    //
    // Given
    // -----
    // - The `Cliff` model from a zero start.
    //
    // Expect
    // ------
    // - `Termination::LineSearchFailed` (code -996), 35 zeros, value 0.
    fn failed_line_search_returns_start() {
        // Act
        let outcome = plmdca(&Cliff, &config(10)).unwrap();

        // Assert
        assert_eq!(outcome.termination, Termination::LineSearchFailed);
        assert_eq!(outcome.termination_code(), -996);
        assert_eq!(outcome.value, 0.0);
        assert!(outcome.fields_and_couplings.params().unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    // Purpose
    // -------
    // Verbose runs log one terminal line with the status code, whatever
    // the outcome.
    //
    // Given
    // -----
    // - Verbose configs; the `Bowl` model (converges) and the `Cliff`
    //   model (first line search fails), under a subscriber that collects
    //   the `code` field of "L-BFGS optimization terminated" events.
    //
    // Expect
    // ------
    // - Exactly one terminal line per run, carrying 0 and -996.
    fn verbose_runs_log_terminal_status() {
        use std::{
            fmt,
            sync::{Arc, Mutex},
        };
        use tracing::{
            Event, Subscriber,
            field::{Field, Visit},
        };
        use tracing_subscriber::{
            layer::{Context, Layer},
            prelude::*,
        };

        #[derive(Default)]
        struct Fields {
            message: String,
            code: Option<i64>,
        }

        impl Visit for Fields {
            fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
                if field.name() == "message" {
                    self.message = format!("{value:?}");
                }
            }

            fn record_i64(&mut self, field: &Field, value: i64) {
                if field.name() == "code" {
                    self.code = Some(value);
                }
            }
        }

        struct TerminalCodes(Arc<Mutex<Vec<i64>>>);

        impl<S: Subscriber> Layer<S> for TerminalCodes {
            fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
                let mut fields = Fields::default();
                event.record(&mut fields);
                if fields.message == "L-BFGS optimization terminated" {
                    if let Some(code) = fields.code {
                        self.0.lock().unwrap().push(code);
                    }
                }
            }
        }

        // Arrange
        let codes = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(TerminalCodes(codes.clone()));
        let verbose = PlmConfig { verbose: true, ..config(100) };

        // Act
        tracing::subscriber::with_default(subscriber, || {
            plmdca(&Bowl::new(), &verbose).unwrap();
            plmdca(&Cliff, &verbose).unwrap();
        });

        // Assert
        assert_eq!(*codes.lock().unwrap(), vec![0, -996]);
    }

    #[test]
    // Purpose
    // -------
    // A model rejecting the dimensions stops the run before allocation.
    //
    // Expect
    // ------
    // - `PlmRun::new` returns the model's `InvalidDimensions` error.
    fn model_check_failure_is_fatal() {
        // Act
        let err = PlmRun::new(&Picky, &config(10)).err().unwrap();

        // Assert
        assert!(matches!(err, OptError::InvalidDimensions { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Hand-built configurations are validated before the model is touched.
    //
    // Given
    // -----
    // - A config literal with `num_threads = 0`.
    //
    // Expect
    // ------
    // - `InvalidThreadCount`; `initialize` never called.
    fn invalid_config_never_initializes() {
        // Arrange
        let model = Bowl::new();
        let bad = PlmConfig { num_threads: 0, ..config(10) };

        // Act
        let err = plmdca(&model, &bad).unwrap_err();

        // Assert
        assert!(matches!(err, OptError::InvalidThreadCount { .. }));
        assert_eq!(model.initialized.load(Ordering::SeqCst), 0);
    }
}
