// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{State, StoppingCriterion};
use instant::Duration;

/// Transparent wrapper marking that the whole state, not just the minimizer, should be handed
/// back from a solve.
///
/// Every [`State`] method forwards to `inner` unchanged; `return_state` is read by the
/// solver-level builder that decides what the top-level
/// `gradient_descent(...)` entry point ultimately returns.
#[derive(Clone)]
pub struct StateReturn<S: State> {
    inner: S,
    /// Whether the whole state should be part of the solver's return value.
    pub return_state: bool,
    stopping_criterion: Option<StoppingCriterion<StateReturn<S>>>,
}

impl<S: State> StateReturn<S> {
    /// Wrap `inner`, marked to be returned in full.
    pub fn new(inner: S) -> Self {
        StateReturn {
            inner,
            return_state: true,
            stopping_criterion: None,
        }
    }

    /// Borrow the wrapped state.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consume the decorator, discarding the marker.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: State> State for StateReturn<S> {
    type Point = S::Point;
    type Tangent = S::Tangent;
    type Float = S::Float;

    fn new(point: Self::Point) -> Self {
        StateReturn {
            inner: S::new(point),
            return_state: true,
            stopping_criterion: None,
        }
    }

    fn get_iterate(&self) -> &Self::Point {
        self.inner.get_iterate()
    }

    fn set_iterate(&mut self, point: Self::Point) {
        self.inner.set_iterate(point)
    }

    fn get_previous_iterate(&self) -> Option<&Self::Point> {
        self.inner.get_previous_iterate()
    }

    fn get_cost(&self) -> Self::Float {
        self.inner.get_cost()
    }

    fn set_cost(&mut self, cost: Self::Float) {
        self.inner.set_cost(cost)
    }

    fn get_gradient(&self) -> Option<&Self::Tangent> {
        self.inner.get_gradient()
    }

    fn set_gradient(&mut self, gradient: Self::Tangent) {
        self.inner.set_gradient(gradient)
    }

    fn get_gradient_norm(&self) -> Option<Self::Float> {
        self.inner.get_gradient_norm()
    }

    fn set_gradient_norm(&mut self, norm: Self::Float) {
        self.inner.set_gradient_norm(norm)
    }

    fn get_change(&self) -> Option<Self::Float> {
        self.inner.get_change()
    }

    fn set_change(&mut self, change: Self::Float) {
        self.inner.set_change(change)
    }

    fn get_stepsize(&self) -> Self::Float {
        self.inner.get_stepsize()
    }

    fn set_stepsize(&mut self, stepsize: Self::Float) {
        self.inner.set_stepsize(stepsize)
    }

    fn get_iter(&self) -> u64 {
        self.inner.get_iter()
    }

    fn increment_iter(&mut self) {
        self.inner.increment_iter()
    }

    fn get_time(&self) -> Option<Duration> {
        self.inner.get_time()
    }

    fn set_time(&mut self, time: Option<Duration>) {
        self.inner.set_time(time)
    }

    fn set_termination_reason(&mut self, reason: String) {
        self.inner.set_termination_reason(reason)
    }

    fn get_termination_reason(&self) -> Option<&str> {
        self.inner.get_termination_reason()
    }

    fn get_stopping_criterion(&self) -> Option<&StoppingCriterion<Self>> {
        // Leaf criteria (`StopAfterIteration<F>` etc.) are generic over any `S: State`, so the
        // criterion configured on the outermost decorator in a stack works unmodified; it is
        // never borrowed from `inner`, whose own slot (if any) stays unused once wrapped.
        self.stopping_criterion.as_ref()
    }

    fn get_stopping_criterion_mut(&mut self) -> Option<&mut StoppingCriterion<Self>> {
        self.stopping_criterion.as_mut()
    }

    fn set_stopping_criterion(&mut self, criterion: StoppingCriterion<Self>) {
        self.stopping_criterion = Some(criterion);
    }

    fn on_start(&mut self) {
        self.inner.on_start()
    }

    fn on_iteration(&mut self) {
        self.inner.on_iteration()
    }

    fn on_stop(&mut self) {
        self.inner.on_stop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManifoldState;

    type Fx = ManifoldState<Vec<f64>, Vec<f64>, f64>;

    #[test]
    fn forwards_iterate_and_cost() {
        let mut s: StateReturn<Fx> = StateReturn::new(Fx::new(vec![1.0]));
        s.set_cost(0.5);
        assert_eq!(s.get_iterate(), &vec![1.0]);
        assert_eq!(s.get_cost(), 0.5);
        assert!(s.return_state);
    }
}
