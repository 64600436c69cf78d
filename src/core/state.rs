// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{OptimFloat, Storage, StoppingCriterion};
use instant::Duration;

/// Tracks a solver's progress.
///
/// Unlike `argmin`'s `IterState`, which hard-codes `max_iters` and `target_cost` fields checked
/// by `Solver::terminate_internal`, termination here is entirely delegated to an owned
/// [`StoppingCriterion`] — `max_iters` is just `StopAfterIteration` wrapped in a
/// `StoppingCriterion`, constructed the same way a user-supplied criterion would be.
pub trait State: Sized {
    /// Type of a point on the manifold.
    type Point: Clone;
    /// Type of a tangent vector.
    type Tangent: Clone;
    /// Floating point precision.
    type Float: OptimFloat;

    /// Constructs a new, empty state at the given starting point.
    fn new(point: Self::Point) -> Self;

    /// Returns the current iterate.
    fn get_iterate(&self) -> &Self::Point;
    /// Sets the current iterate, moving the previous one into `get_previous_iterate`.
    fn set_iterate(&mut self, point: Self::Point);
    /// Returns the iterate before the last [`set_iterate`](Self::set_iterate) call, if any.
    fn get_previous_iterate(&self) -> Option<&Self::Point>;

    /// Returns the cost at the current iterate.
    fn get_cost(&self) -> Self::Float;
    /// Sets the cost at the current iterate.
    fn set_cost(&mut self, cost: Self::Float);

    /// Returns the Riemannian gradient at the current iterate, if computed this iteration.
    fn get_gradient(&self) -> Option<&Self::Tangent>;
    /// Sets the Riemannian gradient at the current iterate.
    fn set_gradient(&mut self, gradient: Self::Tangent);
    /// Returns the norm of the last gradient set via [`set_gradient_norm`](Self::set_gradient_norm).
    fn get_gradient_norm(&self) -> Option<Self::Float>;
    /// Records the norm of the current gradient, for `StopWhenGradientNormLess`.
    fn set_gradient_norm(&mut self, norm: Self::Float);

    /// Returns the size of the last step taken, for `StopWhenChangeLess`.
    fn get_change(&self) -> Option<Self::Float>;
    /// Records the size of the last step taken.
    fn set_change(&mut self, change: Self::Float);

    /// Returns the step size used to produce the current iterate.
    fn get_stepsize(&self) -> Self::Float;
    /// Records the step size used to produce the current iterate.
    fn set_stepsize(&mut self, stepsize: Self::Float);

    /// Returns the current iteration count.
    fn get_iter(&self) -> u64;
    /// Increments the iteration count by one.
    fn increment_iter(&mut self);

    /// Returns the wall-clock time elapsed so far, if timing is enabled.
    fn get_time(&self) -> Option<Duration>;
    /// Records the wall-clock time elapsed so far.
    fn set_time(&mut self, time: Option<Duration>);

    /// Returns `true` if the stopping criterion has fired.
    fn terminated(&self) -> bool {
        self.get_termination_reason().is_some()
    }
    /// Records why the solver stopped.
    fn set_termination_reason(&mut self, reason: String);
    /// Returns why the solver stopped, if it has.
    fn get_termination_reason(&self) -> Option<&str>;

    /// Borrows the stopping criterion owned by this state, if one was configured.
    fn get_stopping_criterion(&self) -> Option<&StoppingCriterion<Self>>;
    /// Mutably borrows the stopping criterion owned by this state.
    fn get_stopping_criterion_mut(&mut self) -> Option<&mut StoppingCriterion<Self>>;
    /// Installs a stopping criterion, replacing any previous one.
    fn set_stopping_criterion(&mut self, criterion: StoppingCriterion<Self>);

    /// Called by the driver once, before the first stopping-criterion check.
    ///
    /// [`crate::decorator::StateDebug`]/[`crate::decorator::StateRecord`] override this to fire
    /// their `:Start` actions; plain [`ManifoldState`] has nothing to do here.
    fn on_start(&mut self) {}
    /// Called by the driver after every completed [`crate::core::Solver::next_iter`] call.
    fn on_iteration(&mut self) {}
    /// Called by the driver once, after the stopping criterion has triggered.
    fn on_stop(&mut self) {}
}

/// The concrete [`State`] implementation used by every solver in this crate.
#[derive(Clone, Debug)]
pub struct ManifoldState<P, T, F> {
    iterate: P,
    previous_iterate: Option<P>,
    cost: F,
    gradient: Option<T>,
    gradient_norm: Option<F>,
    change: Option<F>,
    stepsize: F,
    iter: u64,
    time: Option<Duration>,
    termination_reason: Option<String>,
    stopping_criterion: Option<StoppingCriterion<ManifoldState<P, T, F>>>,
    /// Scratch storage available to solvers that need to carry state between iterations beyond
    /// what the fields above provide (e.g. which coordinate is active in a cyclic method).
    pub storage: Storage<P, T, F>,
}

impl<P: Clone, T: Clone, F: OptimFloat> State for ManifoldState<P, T, F> {
    type Point = P;
    type Tangent = T;
    type Float = F;

    fn new(point: P) -> Self {
        ManifoldState {
            iterate: point,
            previous_iterate: None,
            cost: F::infinity(),
            gradient: None,
            gradient_norm: None,
            change: None,
            stepsize: F::zero(),
            iter: 0,
            time: None,
            termination_reason: None,
            stopping_criterion: None,
            storage: Storage::new(),
        }
    }

    fn get_iterate(&self) -> &P {
        &self.iterate
    }

    fn set_iterate(&mut self, point: P) {
        let old = std::mem::replace(&mut self.iterate, point);
        self.previous_iterate = Some(old);
    }

    fn get_previous_iterate(&self) -> Option<&P> {
        self.previous_iterate.as_ref()
    }

    fn get_cost(&self) -> F {
        self.cost
    }

    fn set_cost(&mut self, cost: F) {
        self.cost = cost;
    }

    fn get_gradient(&self) -> Option<&T> {
        self.gradient.as_ref()
    }

    fn set_gradient(&mut self, gradient: T) {
        self.gradient = Some(gradient);
    }

    fn get_gradient_norm(&self) -> Option<F> {
        self.gradient_norm
    }

    fn set_gradient_norm(&mut self, norm: F) {
        self.gradient_norm = Some(norm);
    }

    fn get_change(&self) -> Option<F> {
        self.change
    }

    fn set_change(&mut self, change: F) {
        self.change = Some(change);
    }

    fn get_stepsize(&self) -> F {
        self.stepsize
    }

    fn set_stepsize(&mut self, stepsize: F) {
        self.stepsize = stepsize;
    }

    fn get_iter(&self) -> u64 {
        self.iter
    }

    fn increment_iter(&mut self) {
        self.iter += 1;
    }

    fn get_time(&self) -> Option<Duration> {
        self.time
    }

    fn set_time(&mut self, time: Option<Duration>) {
        self.time = time;
    }

    fn set_termination_reason(&mut self, reason: String) {
        self.termination_reason = Some(reason);
    }

    fn get_termination_reason(&self) -> Option<&str> {
        self.termination_reason.as_deref()
    }

    fn get_stopping_criterion(&self) -> Option<&StoppingCriterion<Self>> {
        self.stopping_criterion.as_ref()
    }

    fn get_stopping_criterion_mut(&mut self) -> Option<&mut StoppingCriterion<Self>> {
        self.stopping_criterion.as_mut()
    }

    fn set_stopping_criterion(&mut self, criterion: StoppingCriterion<Self>) {
        self.stopping_criterion = Some(criterion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_iterate_remembers_previous() {
        let mut state: ManifoldState<Vec<f64>, Vec<f64>, f64> = ManifoldState::new(vec![0.0]);
        assert_eq!(state.get_previous_iterate(), None);
        state.set_iterate(vec![1.0]);
        assert_eq!(state.get_previous_iterate(), Some(&vec![0.0]));
        assert_eq!(state.get_iterate(), &vec![1.0]);
    }

    #[test]
    fn fresh_state_has_infinite_cost_and_is_not_terminated() {
        let state: ManifoldState<Vec<f64>, Vec<f64>, f64> = ManifoldState::new(vec![0.0]);
        assert!(state.get_cost().is_infinite());
        assert!(!state.terminated());
    }
}
