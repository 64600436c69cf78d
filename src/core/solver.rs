// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{Error, Manifold, Objective, OptimError, Problem, State};

/// An optimization algorithm operating on a [`Problem`] and a [`State`].
///
/// Unlike `argmin`'s `Solver`, which checks `get_max_iters`/`get_target_cost` itself in
/// `terminate_internal`, termination is entirely the job of the [`State`]'s own
/// [`StoppingCriterion`](crate::core::StoppingCriterion) — a solver only ever decides how to
/// produce the next iterate, never whether to stop.
pub trait Solver<M, O, S>
where
    M: Manifold,
    O: Objective<M>,
    S: State<Point = M::Point, Tangent = M::TangentVector, Float = M::Float> + 'static,
{
    /// Name of the solver, used in diagnostics.
    const NAME: &'static str = "UNDEFINED";

    /// Prepares `state` before the first call to [`next_iter`](Self::next_iter), e.g. by
    /// computing the initial cost and gradient. The default implementation does nothing.
    fn initialize(&mut self, _problem: &mut Problem<M, O>, _state: &mut S) -> Result<(), Error> {
        Ok(())
    }

    /// Computes iteration `i`, updating `state` in place.
    fn next_iter(&mut self, problem: &mut Problem<M, O>, state: &mut S, i: u64) -> Result<(), Error>;
}

/// Drives `solver` to completion: `initialize`, then alternate evaluating `state`'s stopping
/// criterion against the current iterate and calling [`Solver::next_iter`] until it triggers.
///
/// The criterion is evaluated *before* the first call to `next_iter` (so e.g.
/// `StopAfterIteration::new(0)` returns the initial state untouched), matching the loop
/// `while !C(P, S, i) { i += 1; step_solver(P, S, i) }`.
pub fn run<M, O, S, Sv>(mut problem: Problem<M, O>, mut solver: Sv, mut state: S) -> Result<S, Error>
where
    M: Manifold,
    O: Objective<M>,
    S: State<Point = M::Point, Tangent = M::TangentVector, Float = M::Float> + 'static,
    Sv: Solver<M, O, S>,
{
    solver.initialize(&mut problem, &mut state)?;
    state.on_start();

    let mut i: u64 = state.get_iter();
    loop {
        let mut criterion = state.get_stopping_criterion().cloned().ok_or_else(|| {
            OptimError::NotInitialized {
                text: "no stopping criterion configured on this state".to_string(),
            }
        })?;
        let stop = criterion.evaluate(&mut problem, &state, i);
        let reason = criterion.reason().to_string();
        state.set_stopping_criterion(criterion);
        if stop {
            state.set_termination_reason(reason);
            state.on_stop();
            return Ok(state);
        }
        i += 1;
        solver.next_iter(&mut problem, &mut state, i)?;
        state.increment_iter();
        state.on_iteration();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::QuadraticObjective;
    use crate::core::{ManifoldState, StopAfterIteration, StoppingCriterion};
    use crate::manifold::Euclidean;

    struct GradientStep {
        rate: f64,
    }

    type Fx = ManifoldState<Vec<f64>, Vec<f64>, f64>;

    impl Solver<Euclidean<f64>, QuadraticObjective, Fx> for GradientStep {
        const NAME: &'static str = "test-gradient-step";

        fn initialize(
            &mut self,
            problem: &mut Problem<Euclidean<f64>, QuadraticObjective>,
            state: &mut Fx,
        ) -> Result<(), Error> {
            let cost = problem.cost(state.get_iterate())?;
            state.set_cost(cost);
            Ok(())
        }

        fn next_iter(
            &mut self,
            problem: &mut Problem<Euclidean<f64>, QuadraticObjective>,
            state: &mut Fx,
            _i: u64,
        ) -> Result<(), Error> {
            let grad = problem.gradient(state.get_iterate())?;
            let next = problem
                .manifold
                .retract(state.get_iterate(), &grad, -self.rate);
            state.set_gradient(grad);
            state.set_iterate(next);
            let cost = problem.cost(state.get_iterate())?;
            state.set_cost(cost);
            state.set_stepsize(self.rate);
            Ok(())
        }
    }

    #[test]
    fn driver_loop_respects_iteration_bound() {
        let problem = Problem::new(Euclidean::new(1), QuadraticObjective);
        let mut state: Fx = State::new(vec![1.0]);
        state.set_stopping_criterion(StoppingCriterion::new(StopAfterIteration::new(5)));
        let solver = GradientStep { rate: 0.1 };
        let result = run(problem, solver, state).unwrap();
        assert_eq!(result.get_iter(), 5);
        assert!(result.terminated());
    }

    #[test]
    fn max_iterations_zero_returns_initial_state_untouched() {
        let problem = Problem::new(Euclidean::new(1), QuadraticObjective);
        let mut state: Fx = State::new(vec![1.0]);
        state.set_stopping_criterion(StoppingCriterion::new(StopAfterIteration::new(0)));
        let solver = GradientStep { rate: 0.1 };
        let result = run(problem, solver, state).unwrap();
        assert_eq!(result.get_iter(), 0);
        assert_eq!(result.get_iterate(), &vec![1.0]);
    }
}
