// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{State, StoppingCriterion, KV};
use crate::decorator::sink::{DebugSink, StdoutSink};
use instant::Duration;

/// A single debug action: formats a [`KV`] snapshot of `state` and fires only every `every`-th
/// iteration.
pub struct DebugAction<S> {
    every: u64,
    build: Box<dyn FnMut(&S) -> KV>,
}

impl<S> DebugAction<S> {
    /// Construct an action that runs `build` on every firing of its hook.
    pub fn new(build: impl FnMut(&S) -> KV + 'static) -> Self {
        DebugAction {
            every: 1,
            build: Box::new(build),
        }
    }

    /// Only run this action every `k`-th time its hook fires (`k == 0` is treated as `1`).
    #[must_use]
    pub fn every(mut self, k: u64) -> Self {
        self.every = k.max(1);
        self
    }

    fn fire(&mut self, state: &S, i: u64) -> Option<KV> {
        if self.every > 1 && i % self.every != 0 {
            return None;
        }
        Some((self.build)(state))
    }
}

/// Common field extractors, for building [`DebugAction`]s without repeating `KV` plumbing.
pub mod field {
    use super::DebugAction;
    use crate::core::{State, KV};

    /// Formats the current iteration count.
    pub fn iteration<S: State>() -> DebugAction<S> {
        DebugAction::new(|s: &S| {
            let mut kv = KV::new();
            kv.push("iter", s.get_iter());
            kv
        })
    }

    /// Formats the current cost.
    pub fn cost<S: State>() -> DebugAction<S> {
        DebugAction::new(|s: &S| {
            let mut kv = KV::new();
            kv.push("cost", s.get_cost());
            kv
        })
    }

    /// Formats the current gradient norm, if recorded.
    pub fn gradient_norm<S: State>() -> DebugAction<S> {
        DebugAction::new(|s: &S| {
            let mut kv = KV::new();
            match s.get_gradient_norm() {
                Some(n) => kv.push("gradient_norm", n),
                None => kv.push("gradient_norm", "n/a"),
            };
            kv
        })
    }

    /// Formats the size of the last step, if recorded.
    pub fn change<S: State>() -> DebugAction<S> {
        DebugAction::new(|s: &S| {
            let mut kv = KV::new();
            match s.get_change() {
                Some(c) => kv.push("change", c),
                None => kv.push("change", "n/a"),
            };
            kv
        })
    }
}

/// Wraps a [`State`], writing formatted diagnostics to a [`DebugSink`] at `:Start`, `:Iteration`
/// and `:Stop`.
///
/// Every [`State`] method forwards to `inner` unchanged: wrapping a state with `StateDebug` never
/// changes what `get_iterate`/`get_cost`/etc. report, it only adds side effects at the three hook
/// points.
pub struct StateDebug<S: State> {
    inner: S,
    sink: Box<dyn DebugSink>,
    on_start: Vec<DebugAction<S>>,
    on_iteration: Vec<DebugAction<S>>,
    on_stop: Vec<DebugAction<S>>,
    stopping_criterion: Option<StoppingCriterion<StateDebug<S>>>,
}

impl<S: State> StateDebug<S> {
    /// Wrap `inner`, writing to stdout and with no actions configured.
    pub fn new(inner: S) -> Self {
        StateDebug {
            inner,
            sink: Box::new(StdoutSink),
            on_start: Vec::new(),
            on_iteration: Vec::new(),
            on_stop: Vec::new(),
            stopping_criterion: None,
        }
    }

    /// Replace the sink actions are written to.
    #[must_use]
    pub fn sink(mut self, sink: impl DebugSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Add an action run once, before the first stopping-criterion check.
    #[must_use]
    pub fn on_start(mut self, action: DebugAction<S>) -> Self {
        self.on_start.push(action);
        self
    }

    /// Add an action run after every completed iteration.
    #[must_use]
    pub fn on_iteration(mut self, action: DebugAction<S>) -> Self {
        self.on_iteration.push(action);
        self
    }

    /// Add an action run once, after the stopping criterion has triggered.
    #[must_use]
    pub fn on_stop(mut self, action: DebugAction<S>) -> Self {
        self.on_stop.push(action);
        self
    }

    /// Borrow the wrapped state.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consume the decorator, discarding configured actions and the sink.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn fire(label: &str, actions: &mut [DebugAction<S>], inner: &S, i: u64, sink: &mut dyn DebugSink) {
        for action in actions {
            if let Some(kv) = action.fire(inner, i) {
                sink.write_line(&format!("{label} | iter {i} | {kv}"));
            }
        }
    }
}

impl<S: State> State for StateDebug<S> {
    type Point = S::Point;
    type Tangent = S::Tangent;
    type Float = S::Float;

    fn new(point: Self::Point) -> Self {
        StateDebug::new(S::new(point))
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
        self.stopping_criterion.as_ref()
    }

    fn get_stopping_criterion_mut(&mut self) -> Option<&mut StoppingCriterion<Self>> {
        self.stopping_criterion.as_mut()
    }

    fn set_stopping_criterion(&mut self, criterion: StoppingCriterion<Self>) {
        self.stopping_criterion = Some(criterion);
    }

    fn on_start(&mut self) {
        self.inner.on_start();
        let i = self.inner.get_iter();
        Self::fire(":Start", &mut self.on_start, &self.inner, i, &mut *self.sink);
    }

    fn on_iteration(&mut self) {
        self.inner.on_iteration();
        let i = self.inner.get_iter();
        Self::fire(":Iteration", &mut self.on_iteration, &self.inner, i, &mut *self.sink);
    }

    fn on_stop(&mut self) {
        self.inner.on_stop();
        let i = self.inner.get_iter();
        Self::fire(":Stop", &mut self.on_stop, &self.inner, i, &mut *self.sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManifoldState;

    type Fx = ManifoldState<Vec<f64>, Vec<f64>, f64>;

    #[derive(Clone)]
    struct SharedVecSink {
        lines: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
    }

    impl DebugSink for SharedVecSink {
        fn write_line(&mut self, line: &str) {
            self.lines.borrow_mut().push(line.to_string());
        }
    }

    #[test]
    fn writes_a_line_per_iteration() {
        let lines = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut s = StateDebug::new(Fx::new(vec![1.0]))
            .sink(SharedVecSink {
                lines: lines.clone(),
            })
            .on_iteration(field::iteration());
        s.set_cost(1.0);
        for _ in 0..3 {
            s.increment_iter();
            s.on_iteration();
        }
        assert_eq!(lines.borrow().len(), 3);
        assert!(lines.borrow()[0].contains("iter: 1"));
    }

    #[test]
    fn subsampled_action_only_fires_every_kth_iteration() {
        let lines = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut s = StateDebug::new(Fx::new(vec![1.0]))
            .sink(SharedVecSink {
                lines: lines.clone(),
            })
            .on_iteration(field::iteration().every(2));
        for _ in 0..6 {
            s.increment_iter();
            s.on_iteration();
        }
        assert_eq!(lines.borrow().len(), 3);
    }

    #[test]
    fn forwards_iterate_transparently() {
        let s = StateDebug::new(Fx::new(vec![2.0]));
        assert_eq!(s.get_iterate(), &vec![2.0]);
    }
}
