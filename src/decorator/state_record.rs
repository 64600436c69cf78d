// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{State, StoppingCriterion, KV};
use instant::Duration;

/// Which of the three driver hooks a [`RecordAction`] or [`DebugAction`](super::DebugAction) is
/// attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Fires once, before the first stopping-criterion check.
    Start,
    /// Fires after every completed iteration.
    Iteration,
    /// Fires once, after the stopping criterion has triggered.
    Stop,
}

/// A single record action: appends a [`KV`] snapshot of `state` to its own buffer every time its
/// hook fires, subject to a `RecordEvery`-style subsampling rate.
///
/// Calling [`fire`](Self::fire) with a negative `i` resets the buffer instead of appending —
/// composite solvers that restart an inner driver use this to clear a child's records.
pub struct RecordAction<S> {
    every: u64,
    build: Box<dyn FnMut(&S) -> KV>,
    buffer: Vec<KV>,
}

impl<S> RecordAction<S> {
    /// Construct an action appending the result of `build` on every firing of its hook.
    pub fn new(build: impl FnMut(&S) -> KV + 'static) -> Self {
        RecordAction {
            every: 1,
            build: Box::new(build),
            buffer: Vec::new(),
        }
    }

    /// Only append every `k`-th time this action's hook fires (`k == 0` is treated as `1`);
    /// implements `RecordEvery(a, k)`.
    #[must_use]
    pub fn every(mut self, k: u64) -> Self {
        self.every = k.max(1);
        self
    }

    /// Append (or reset, for `i < 0`) this action's buffer for driver position `i`.
    pub fn fire(&mut self, state: &S, i: i64) {
        if i < 0 {
            self.buffer.clear();
            return;
        }
        if self.every > 1 && (i as u64) % self.every != 0 {
            return;
        }
        self.buffer.push((self.build)(state));
    }

    /// The sequence recorded so far.
    pub fn records(&self) -> &[KV] {
        &self.buffer
    }
}

/// Groups several [`RecordAction`]s' field extractors into a single tuple snapshot per firing,
/// implementing `RecordGroup`.
pub fn group<S: 'static>(
    fields: Vec<(&'static str, Box<dyn FnMut(&S) -> String>)>,
) -> RecordAction<S> {
    let mut fields = fields;
    RecordAction::new(move |s: &S| {
        let mut kv = KV::new();
        for (name, extract) in &mut fields {
            kv.push(name, extract(s));
        }
        kv
    })
}

/// Common field extractors, mirroring [`crate::decorator::state_debug::field`] but producing the
/// boxed string closures [`group`] expects.
pub mod field {
    use crate::core::State;

    /// Extracts the current iteration count.
    pub fn iteration<S: State>() -> (&'static str, Box<dyn FnMut(&S) -> String>) {
        ("iteration", Box::new(|s: &S| s.get_iter().to_string()))
    }

    /// Extracts the current cost.
    pub fn cost<S: State>() -> (&'static str, Box<dyn FnMut(&S) -> String>) {
        ("cost", Box::new(|s: &S| s.get_cost().to_string()))
    }

    /// Extracts the current gradient norm, if recorded.
    pub fn gradient_norm<S: State>() -> (&'static str, Box<dyn FnMut(&S) -> String>) {
        (
            "gradient_norm",
            Box::new(|s: &S| match s.get_gradient_norm() {
                Some(n) => n.to_string(),
                None => "n/a".to_string(),
            }),
        )
    }
}

/// Wraps a [`State`], appending to named, typed sequences at `:Start`, `:Iteration` and `:Stop`,
/// retrievable via [`get_record`](Self::get_record).
///
/// Every [`State`] method forwards to `inner` unchanged.
pub struct StateRecord<S: State> {
    inner: S,
    start: Vec<(&'static str, RecordAction<S>)>,
    iteration: Vec<(&'static str, RecordAction<S>)>,
    stop: Vec<(&'static str, RecordAction<S>)>,
    stopping_criterion: Option<StoppingCriterion<StateRecord<S>>>,
}

impl<S: State> StateRecord<S> {
    /// Wrap `inner` with no actions configured.
    pub fn new(inner: S) -> Self {
        StateRecord {
            inner,
            start: Vec::new(),
            iteration: Vec::new(),
            stop: Vec::new(),
            stopping_criterion: None,
        }
    }

    /// Register `action` under `name`, to run once before the first stopping-criterion check.
    #[must_use]
    pub fn on_start(mut self, name: &'static str, action: RecordAction<S>) -> Self {
        self.start.push((name, action));
        self
    }

    /// Register `action` under `name`, to run after every completed iteration.
    #[must_use]
    pub fn on_iteration(mut self, name: &'static str, action: RecordAction<S>) -> Self {
        self.iteration.push((name, action));
        self
    }

    /// Register `action` under `name`, to run once after the stopping criterion has triggered.
    #[must_use]
    pub fn on_stop(mut self, name: &'static str, action: RecordAction<S>) -> Self {
        self.stop.push((name, action));
        self
    }

    /// The recorded sequence for `name` at `hook`, if such an action was registered.
    pub fn get_record(&self, hook: Hook, name: &str) -> Option<&[KV]> {
        let actions = match hook {
            Hook::Start => &self.start,
            Hook::Iteration => &self.iteration,
            Hook::Stop => &self.stop,
        };
        actions
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, a)| a.records())
    }

    /// Borrow the wrapped state.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Consume the decorator, discarding every recorded sequence.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn fire(actions: &mut [(&'static str, RecordAction<S>)], inner: &S, i: i64) {
        for (_, action) in actions {
            action.fire(inner, i);
        }
    }
}

impl<S: State> State for StateRecord<S> {
    type Point = S::Point;
    type Tangent = S::Tangent;
    type Float = S::Float;

    fn new(point: Self::Point) -> Self {
        StateRecord::new(S::new(point))
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
        let i = self.inner.get_iter() as i64;
        Self::fire(&mut self.start, &self.inner, i);
    }

    fn on_iteration(&mut self) {
        self.inner.on_iteration();
        let i = self.inner.get_iter() as i64;
        Self::fire(&mut self.iteration, &self.inner, i);
    }

    fn on_stop(&mut self) {
        self.inner.on_stop();
        let i = self.inner.get_iter() as i64;
        Self::fire(&mut self.stop, &self.inner, i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManifoldState;

    type Fx = ManifoldState<Vec<f64>, Vec<f64>, f64>;

    #[test]
    fn record_group_every_six_over_forty_two_iterations() {
        let mut s = StateRecord::new(Fx::new(vec![1.0]))
            .on_iteration(
                "snapshot",
                group(vec![field::iteration(), field::cost(), field::gradient_norm()])
                    .every(6),
            )
            .on_stop("final", RecordAction::new(|s: &Fx| {
                let mut kv = KV::new();
                kv.push("iteration", s.get_iter());
                kv
            }));
        for _ in 0..42 {
            s.increment_iter();
            s.on_iteration();
        }
        s.on_stop();
        assert_eq!(s.get_record(Hook::Iteration, "snapshot").unwrap().len(), 7);
        let final_record = s.get_record(Hook::Stop, "final").unwrap();
        assert_eq!(final_record.len(), 1);
        assert_eq!(final_record[0].get("iteration"), Some("42"));
    }

    #[test]
    fn negative_i_resets_the_buffer() {
        let mut action = RecordAction::new(|s: &Fx| {
            let mut kv = KV::new();
            kv.push("iteration", s.get_iter());
            kv
        });
        let s = Fx::new(vec![1.0]);
        action.fire(&s, 1);
        action.fire(&s, 2);
        assert_eq!(action.records().len(), 2);
        action.fire(&s, -1);
        assert_eq!(action.records().len(), 0);
    }

    #[test]
    fn forwards_iterate_transparently() {
        let s = StateRecord::new(Fx::new(vec![3.0]));
        assert_eq!(s.get_iterate(), &vec![3.0]);
    }
}
