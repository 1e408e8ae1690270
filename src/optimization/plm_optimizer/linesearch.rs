//! plm_optimizer::linesearch — a line search with a hard cap on trials.
//!
//! argmin's line searches run until their own acceptance test passes. A
//! plmDCA iteration may spend at most [`DEFAULT_MAX_LINESEARCH`] objective
//! evaluations looking for a step; [`BoundedLineSearch`] wraps any argmin
//! line search and fails with [`OptError::LineSearchExhausted`] when the
//! wrapped search asks for one trial too many.
//!
//! L-BFGS clones its line search at the start of every outer iteration, so
//! the trial counter starts from zero for each search.
//!
//! [`DEFAULT_MAX_LINESEARCH`]: crate::optimization::plm_optimizer::types::DEFAULT_MAX_LINESEARCH
use argmin::core::{Error, KV, LineSearch, Problem, Solver, State, TerminationStatus};

use crate::optimization::errors::OptError;

#[derive(Debug, Clone)]
pub struct BoundedLineSearch<L> {
    inner: L,
    max_trials: usize,
    trials: usize,
}

impl<L> BoundedLineSearch<L> {
    pub fn new(inner: L, max_trials: usize) -> Self {
        Self { inner, max_trials, trials: 0 }
    }

    pub fn max_trials(&self) -> usize {
        self.max_trials
    }

    /// Trials spent by the current search.
    pub fn trials(&self) -> usize {
        self.trials
    }
}

impl<P, F, L> LineSearch<P, F> for BoundedLineSearch<L>
where
    L: LineSearch<P, F>,
{
    fn search_direction(&mut self, direction: P) {
        self.inner.search_direction(direction);
    }

    fn initial_step_length(&mut self, step_length: F) -> Result<(), Error> {
        self.inner.initial_step_length(step_length)
    }
}

impl<O, I, L> Solver<O, I> for BoundedLineSearch<L>
where
    I: State,
    L: Solver<O, I>,
{
    const NAME: &'static str = "Bounded line search";

    fn init(&mut self, problem: &mut Problem<O>, state: I) -> Result<(I, Option<KV>), Error> {
        self.trials = 0;
        self.inner.init(problem, state)
    }

    fn next_iter(&mut self, problem: &mut Problem<O>, state: I) -> Result<(I, Option<KV>), Error> {
        if self.trials >= self.max_trials {
            return Err(OptError::LineSearchExhausted { max_trials: self.max_trials }.into());
        }
        self.trials += 1;
        self.inner.next_iter(problem, state)
    }

    fn terminate_internal(&mut self, state: &I) -> TerminationStatus {
        self.inner.terminate_internal(state)
    }

    fn terminate(&mut self, state: &I) -> TerminationStatus {
        self.inner.terminate(state)
    }
}
