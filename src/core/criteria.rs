// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Composable stopping criteria.
//!
//! A [`StoppingCriterion`] is a boxed, owned predicate `(probe, state, i) -> bool`, carrying a
//! `reason` string and an `at_iteration` that persist once it has triggered. Leaves are combined
//! with [`StoppingCriterion::and`]/[`StoppingCriterion::or`] into [`StopWhenAll`]/[`StopWhenAny`]
//! trees; both evaluate every child on every call so that stateful leaves (timers,
//! change-trackers) stay live even once short-circuiting would otherwise skip them.

use crate::core::{Error, Manifold, Objective, Problem, State};
use instant::Duration;
use std::any::Any;
use std::fmt;

/// The narrow interface a stopping criterion needs from the outside world: the ability to
/// re-evaluate the cost at a point, and the handful of manifold operations criteria compare
/// iterates and gradients with. Implemented for any [`Problem`] whose point/tangent/float types
/// line up with the [`State`] being checked, so a criterion never needs to know the concrete
/// manifold or objective type it is running against.
pub trait Probe<S: State + 'static> {
    /// Evaluate the cost at `point`.
    fn cost(&mut self, point: &S::Point) -> Result<S::Float, Error>;
    /// The Riemannian distance between two points.
    fn distance(&self, a: &S::Point, b: &S::Point) -> S::Float;
    /// The norm of a tangent vector at `point`.
    fn norm(&self, point: &S::Point, vector: &S::Tangent) -> S::Float;
    /// Transport a tangent vector from one point to another.
    fn transport(&self, from: &S::Point, to: &S::Point, vector: &S::Tangent) -> S::Tangent;
    /// Subtract two tangent vectors at `point`.
    fn subtract(&self, point: &S::Point, a: &S::Tangent, b: &S::Tangent) -> S::Tangent;
}

impl<M, O, S> Probe<S> for Problem<M, O>
where
    M: Manifold,
    O: Objective<M>,
    S: State<Point = M::Point, Tangent = M::TangentVector, Float = M::Float> + 'static,
{
    fn cost(&mut self, point: &S::Point) -> Result<S::Float, Error> {
        Problem::cost(self, point)
    }

    fn distance(&self, a: &S::Point, b: &S::Point) -> S::Float {
        self.manifold.distance(a, b)
    }

    fn norm(&self, point: &S::Point, vector: &S::Tangent) -> S::Float {
        self.manifold.norm(point, vector)
    }

    fn transport(&self, from: &S::Point, to: &S::Point, vector: &S::Tangent) -> S::Tangent {
        self.manifold.transport(from, to, vector)
    }

    fn subtract(&self, point: &S::Point, a: &S::Tangent, b: &S::Tangent) -> S::Tangent {
        self.manifold.subtract_tangent(point, a, b)
    }
}

/// A value passed to [`Criterion::update`]/[`StoppingCriterion::update`] for a recognized key.
///
/// Covers the handful of tunables a caller can update on a live criterion without rebuilding it:
/// an iteration bound, a floating point tolerance, or a wall-clock bound.
#[derive(Clone, Copy, Debug)]
pub enum CriterionUpdate<F> {
    /// A new iteration count bound.
    Iterations(u64),
    /// A new floating point tolerance.
    Tolerance(F),
    /// A new wall-clock time bound.
    Time(Duration),
}

/// A single stopping predicate, evaluated once per driver iteration.
///
/// Implementors track their own `reason`/`at_iteration`, reset them at `i == 0`, and may hold
/// further private state (a [`crate::core::Storage`] snapshot, a start time, ...). Required to be
/// [`Any`] so combinators can downcast when flattening (see [`StoppingCriterion::and`]).
pub trait Criterion<S: State + 'static>: CriterionClone<S> + Any {
    /// Evaluate this criterion for driver iteration `i`. Must reset `reason`/`at_iteration` when
    /// `i == 0` before deciding whether to trigger.
    fn call(&mut self, probe: &mut dyn Probe<S>, state: &S, i: u64) -> bool;
    /// The human-readable reason this criterion triggered, empty if it has not.
    fn reason(&self) -> &str;
    /// The iteration at which this criterion last triggered (meaningless while `reason()` is
    /// empty).
    fn at_iteration(&self) -> u64;
    /// Whether this criterion, by its nature, signals proximity to a stationary point.
    fn indicates_convergence(&self) -> bool {
        false
    }
    /// Apply `key`/`value` to this criterion if it recognizes `key`; otherwise do nothing.
    /// Combinators forward to every child; unrecognized keys are silently ignored at the leaf.
    fn update(&mut self, key: &str, value: CriterionUpdate<S::Float>);
    /// Append `self` to `out` if it is currently triggered (non-empty reason). Combinators
    /// recurse into their children instead of appending themselves.
    fn collect_active<'a>(&'a self, out: &mut Vec<&'a dyn Criterion<S>>) {
        if !self.reason().is_empty() {
            out.push(self);
        }
    }
    /// Upcast to `&dyn Any` for combinator flattening.
    fn as_any(&self) -> &dyn Any;
}

/// Object-safe cloning for `Box<dyn Criterion<S>>`.
pub trait CriterionClone<S: State + 'static> {
    /// Clone `self` into a fresh box.
    fn clone_box(&self) -> Box<dyn Criterion<S>>;
}

impl<S, T> CriterionClone<S> for T
where
    S: State + 'static,
    T: 'static + Criterion<S> + Clone,
{
    fn clone_box(&self) -> Box<dyn Criterion<S>> {
        Box::new(self.clone())
    }
}

/// Boilerplate every leaf criterion needs: `as_any`/`as_any_mut`.
macro_rules! impl_any {
    ($ty:ident) => {
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    };
}

/// A composable, owned stopping predicate. The thing [`State::set_stopping_criterion`] holds.
pub struct StoppingCriterion<S: State + 'static> {
    inner: Box<dyn Criterion<S>>,
}

impl<S: State + 'static> StoppingCriterion<S> {
    /// Wrap a concrete criterion.
    pub fn new<C: Criterion<S> + 'static>(criterion: C) -> Self {
        StoppingCriterion {
            inner: Box::new(criterion),
        }
    }

    /// Evaluate the wrapped criterion tree.
    pub fn evaluate(&mut self, probe: &mut dyn Probe<S>, state: &S, i: u64) -> bool {
        self.inner.call(probe, state, i)
    }

    /// The most recent trigger reason, empty if not triggered.
    pub fn reason(&self) -> &str {
        self.inner.reason()
    }

    /// The iteration the criterion last triggered at.
    pub fn at_iteration(&self) -> u64 {
        self.inner.at_iteration()
    }

    /// Whether the (possibly composite) criterion indicates convergence: `any` for an AND tree
    /// (one convergence witness among the triggered children suffices), `any over active
    /// children` for an OR tree.
    pub fn indicates_convergence(&self) -> bool {
        self.inner.indicates_convergence()
    }

    /// The flat list of leaf criteria currently triggered (non-empty `reason`).
    pub fn active_criteria(&self) -> Vec<&dyn Criterion<S>> {
        let mut out = Vec::new();
        self.inner.collect_active(&mut out);
        out
    }

    /// Recursively apply `key`/`value` to every leaf recognizing `key`; a combinator forwards to
    /// all of its children, a leaf ignores unrecognized keys.
    pub fn update(&mut self, key: &str, value: CriterionUpdate<S::Float>) {
        self.inner.update(key, value);
    }

    /// Combine with `other` under AND, flattening into a single [`StopWhenAll`] if either side
    /// already is one.
    #[must_use]
    pub fn and(self, other: StoppingCriterion<S>) -> StoppingCriterion<S> {
        let mut children = Self::into_children::<StopWhenAll<S>>(self);
        children.extend(Self::into_children::<StopWhenAll<S>>(other));
        StoppingCriterion::new(StopWhenAll::from_children(children))
    }

    /// Combine with `other` under OR, flattening into a single [`StopWhenAny`] if either side
    /// already is one.
    #[must_use]
    pub fn or(self, other: StoppingCriterion<S>) -> StoppingCriterion<S> {
        let mut children = Self::into_children::<StopWhenAny<S>>(self);
        children.extend(Self::into_children::<StopWhenAny<S>>(other));
        StoppingCriterion::new(StopWhenAny::from_children(children))
    }

    fn into_children<Combinator>(self) -> Vec<Box<dyn Criterion<S>>>
    where
        Combinator: Combine<S> + 'static,
    {
        match self.inner.as_any().downcast_ref::<Combinator>() {
            Some(combinator) => combinator.children_cloned(),
            None => vec![self.inner],
        }
    }
}

impl<S: State + 'static> Clone for StoppingCriterion<S> {
    fn clone(&self) -> Self {
        StoppingCriterion {
            inner: self.inner.clone_box(),
        }
    }
}

impl<S: State + 'static> fmt::Debug for StoppingCriterion<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoppingCriterion")
            .field("reason", &self.reason())
            .field("at_iteration", &self.at_iteration())
            .finish()
    }
}

/// Helper trait so `into_children` can be generic over which combinator it unwraps.
trait Combine<S: State + 'static>: Criterion<S> {
    /// A deep-cloned copy of this combinator's children, used when flattening `.and()`/`.or()`
    /// chains (the combinator itself is only borrowed, since `StoppingCriterion::and`/`or`
    /// consume `self` by value but the downcast can only check by reference).
    fn children_cloned(&self) -> Vec<Box<dyn Criterion<S>>>;
}

// --- leaf criteria -----------------------------------------------------------------------

/// Triggers once the iteration count reaches `max_iterations`.
#[derive(Clone)]
pub struct StopAfterIteration<F> {
    max_iterations: u64,
    reason: String,
    at_iteration: u64,
    _float: std::marker::PhantomData<F>,
}

impl<F> StopAfterIteration<F> {
    /// Construct a criterion triggering once `i >= max_iterations`.
    pub fn new(max_iterations: u64) -> Self {
        StopAfterIteration {
            max_iterations,
            reason: String::new(),
            at_iteration: 0,
            _float: std::marker::PhantomData,
        }
    }
}

impl<S> Criterion<S> for StopAfterIteration<S::Float>
where
    S: State + 'static,
{
    fn call(&mut self, _probe: &mut dyn Probe<S>, _state: &S, i: u64) -> bool {
        if i == 0 {
            self.reason.clear();
            self.at_iteration = 0;
        }
        if i >= self.max_iterations {
            self.reason = format!(
                "Maximum number of iterations ({}) reached",
                self.max_iterations
            );
            self.at_iteration = i;
            true
        } else {
            false
        }
    }

    fn reason(&self) -> &str {
        &self.reason
    }

    fn at_iteration(&self) -> u64 {
        self.at_iteration
    }

    fn update(&mut self, key: &str, value: CriterionUpdate<S::Float>) {
        if key == "MaxIteration" {
            if let CriterionUpdate::Iterations(n) = value {
                self.max_iterations = n;
            }
        }
    }

    impl_any!(StopAfterIteration);
}

/// Triggers once the wall-clock time since the first call reaches `max_duration`.
#[derive(Clone)]
pub struct StopAfter<S: State + 'static> {
    max_duration: Duration,
    start: Option<instant::Instant>,
    clock: std::rc::Rc<dyn crate::core::Clock>,
    reason: String,
    at_iteration: u64,
    _state: std::marker::PhantomData<S>,
}

impl<S: State + 'static> StopAfter<S> {
    /// Construct a criterion triggering once `max_duration` has elapsed, timed by the system
    /// clock.
    pub fn new(max_duration: Duration) -> Self {
        Self::with_clock(max_duration, crate::core::SystemClock)
    }

    /// Construct a criterion timed by a caller-supplied [`Clock`](crate::core::Clock), for
    /// deterministic tests.
    pub fn with_clock(max_duration: Duration, clock: impl crate::core::Clock + 'static) -> Self {
        StopAfter {
            max_duration,
            start: None,
            clock: std::rc::Rc::new(clock),
            reason: String::new(),
            at_iteration: 0,
            _state: std::marker::PhantomData,
        }
    }
}

impl<S: State + 'static> Criterion<S> for StopAfter<S> {
    fn call(&mut self, _probe: &mut dyn Probe<S>, _state: &S, i: u64) -> bool {
        if i == 0 {
            self.reason.clear();
            self.at_iteration = 0;
            self.start = None;
        }
        let now = self.clock.now();
        let start = *self.start.get_or_insert(now);
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= self.max_duration {
            self.reason = format!(
                "Maximum time ({:?}) reached, elapsed {:?}",
                self.max_duration, elapsed
            );
            self.at_iteration = i;
            true
        } else {
            false
        }
    }

    fn reason(&self) -> &str {
        &self.reason
    }

    fn at_iteration(&self) -> u64 {
        self.at_iteration
    }

    fn update(&mut self, key: &str, value: CriterionUpdate<S::Float>) {
        if key == "MaxTime" {
            if let CriterionUpdate::Time(d) = value {
                self.max_duration = d;
            }
        }
    }

    impl_any!(StopAfter);
}

/// Triggers once `get_cost(P, get_iterate(S)) < threshold`, for `i > 0`.
#[derive(Clone)]
pub struct StopWhenCostLess<F> {
    threshold: F,
    reason: String,
    at_iteration: u64,
}

impl<F> StopWhenCostLess<F> {
    /// Construct a criterion triggering once the cost drops below `threshold`.
    pub fn new(threshold: F) -> Self {
        StopWhenCostLess {
            threshold,
            reason: String::new(),
            at_iteration: 0,
        }
    }
}

impl<S> Criterion<S> for StopWhenCostLess<S::Float>
where
    S: State + 'static,
{
    fn call(&mut self, probe: &mut dyn Probe<S>, state: &S, i: u64) -> bool {
        if i == 0 {
            self.reason.clear();
            self.at_iteration = 0;
            return false;
        }
        let cost = match probe.cost(state.get_iterate()) {
            Ok(c) => c,
            Err(_) => return false,
        };
        if cost < self.threshold {
            self.reason = format!(
                "Cost ({cost}) less than threshold ({})",
                self.threshold
            );
            self.at_iteration = i;
            true
        } else {
            false
        }
    }

    fn reason(&self) -> &str {
        &self.reason
    }

    fn at_iteration(&self) -> u64 {
        self.at_iteration
    }

    // A cost below a threshold does not by itself imply proximity to a stationary point, so this
    // leaves `indicates_convergence` at its default `false` (unlike the gradient-norm / iterate-
    // change / gradient-change criteria below).

    fn update(&mut self, key: &str, value: CriterionUpdate<S::Float>) {
        if key == "MinCost" {
            if let CriterionUpdate::Tolerance(t) = value {
                self.threshold = t;
            }
        }
    }

    impl_any!(StopWhenCostLess);
}

/// Triggers once `norm(M, p, grad) < threshold`, for `i > 0`.
#[derive(Clone)]
pub struct StopWhenGradientNormLess<F> {
    threshold: F,
    reason: String,
    at_iteration: u64,
}

impl<F> StopWhenGradientNormLess<F> {
    /// Construct a criterion triggering once the gradient norm drops below `threshold`.
    pub fn new(threshold: F) -> Self {
        StopWhenGradientNormLess {
            threshold,
            reason: String::new(),
            at_iteration: 0,
        }
    }
}

impl<S> Criterion<S> for StopWhenGradientNormLess<S::Float>
where
    S: State + 'static,
{
    fn call(&mut self, probe: &mut dyn Probe<S>, state: &S, i: u64) -> bool {
        if i == 0 {
            self.reason.clear();
            self.at_iteration = 0;
            return false;
        }
        let Some(grad) = state.get_gradient() else {
            return false;
        };
        let norm = probe.norm(state.get_iterate(), grad);
        if norm < self.threshold {
            self.reason = format!(
                "Gradient norm ({norm}) less than threshold ({})",
                self.threshold
            );
            self.at_iteration = i;
            true
        } else {
            false
        }
    }

    fn reason(&self) -> &str {
        &self.reason
    }

    fn at_iteration(&self) -> u64 {
        self.at_iteration
    }

    fn indicates_convergence(&self) -> bool {
        true
    }

    fn update(&mut self, key: &str, value: CriterionUpdate<S::Float>) {
        if key == "MinGradNorm" {
            if let CriterionUpdate::Tolerance(t) = value {
                self.threshold = t;
            }
        }
    }

    impl_any!(StopWhenGradientNormLess);
}

/// Triggers once `distance(M, p_old, p) < threshold`, for `i > 0`. Owns a one-slot snapshot of
/// the previous iterate, read before the comparison and updated after — so the first call after
/// a reset never has a prior value to compare against.
#[derive(Clone)]
pub struct StopWhenChangeLess<S: State + 'static> {
    threshold: S::Float,
    previous: Option<S::Point>,
    reason: String,
    at_iteration: u64,
}

impl<S: State + 'static> StopWhenChangeLess<S> {
    /// Construct a criterion triggering once the step size (in manifold distance) drops below
    /// `threshold`.
    pub fn new(threshold: S::Float) -> Self {
        StopWhenChangeLess {
            threshold,
            previous: None,
            reason: String::new(),
            at_iteration: 0,
        }
    }
}

impl<S: State + 'static> Criterion<S> for StopWhenChangeLess<S> {
    fn call(&mut self, probe: &mut dyn Probe<S>, state: &S, i: u64) -> bool {
        if i == 0 {
            self.reason.clear();
            self.at_iteration = 0;
            self.previous = None;
        }
        let triggered = if i > 0 {
            if let Some(previous) = &self.previous {
                let change = probe.distance(previous, state.get_iterate());
                if change < self.threshold {
                    self.reason = format!(
                        "Change in iterate ({change}) less than threshold ({})",
                        self.threshold
                    );
                    self.at_iteration = i;
                    true
                } else {
                    false
                }
            } else {
                false
            }
        } else {
            false
        };
        // The snapshot updates after the comparison, never before, and only once there is an
        // iterate that actually followed a step (i.e. never on the i==0 reset call).
        if i > 0 {
            self.previous = Some(state.get_iterate().clone());
        }
        triggered
    }

    fn reason(&self) -> &str {
        &self.reason
    }

    fn at_iteration(&self) -> u64 {
        self.at_iteration
    }

    fn indicates_convergence(&self) -> bool {
        true
    }

    fn update(&mut self, key: &str, value: CriterionUpdate<S::Float>) {
        if key == "MinIterateChange" {
            if let CriterionUpdate::Tolerance(t) = value {
                self.threshold = t;
            }
        }
    }

    impl_any!(StopWhenChangeLess);
}

/// Triggers once `norm(M, p, transport(p_old, X_old, p) - X) < threshold`, for `i > 0`.
#[derive(Clone)]
pub struct StopWhenGradientChangeLess<S: State + 'static> {
    threshold: S::Float,
    previous: Option<(S::Point, S::Tangent)>,
    reason: String,
    at_iteration: u64,
}

impl<S: State + 'static> StopWhenGradientChangeLess<S> {
    /// Construct a criterion triggering once the transported gradient change drops below
    /// `threshold`.
    pub fn new(threshold: S::Float) -> Self {
        StopWhenGradientChangeLess {
            threshold,
            previous: None,
            reason: String::new(),
            at_iteration: 0,
        }
    }
}

impl<S: State + 'static> Criterion<S> for StopWhenGradientChangeLess<S> {
    fn call(&mut self, probe: &mut dyn Probe<S>, state: &S, i: u64) -> bool {
        if i == 0 {
            self.reason.clear();
            self.at_iteration = 0;
            self.previous = None;
        }
        let current_point = state.get_iterate().clone();
        let current_grad = state.get_gradient().cloned();
        let triggered = if i > 0 {
            match (&self.previous, &current_grad) {
                (Some((old_point, old_grad)), Some(new_grad)) => {
                    let transported = probe.transport(old_point, &current_point, old_grad);
                    let diff = probe.subtract(&current_point, &transported, new_grad);
                    let change = probe.norm(&current_point, &diff);
                    if change < self.threshold {
                        self.reason = format!(
                            "Gradient change ({change}) less than threshold ({})",
                            self.threshold
                        );
                        self.at_iteration = i;
                        true
                    } else {
                        false
                    }
                }
                _ => false,
            }
        } else {
            false
        };
        if i > 0 {
            if let Some(grad) = current_grad {
                self.previous = Some((current_point, grad));
            }
        }
        triggered
    }

    fn reason(&self) -> &str {
        &self.reason
    }

    fn at_iteration(&self) -> u64 {
        self.at_iteration
    }

    fn indicates_convergence(&self) -> bool {
        true
    }

    fn update(&mut self, key: &str, value: CriterionUpdate<S::Float>) {
        if key == "MinGradientChange" {
            if let CriterionUpdate::Tolerance(t) = value {
                self.threshold = t;
            }
        }
    }

    impl_any!(StopWhenGradientChangeLess);
}

/// Triggers once `get_stepsize(S) < threshold`, for `i > 0`.
#[derive(Clone)]
pub struct StopWhenStepsizeLess<F> {
    threshold: F,
    reason: String,
    at_iteration: u64,
}

impl<F> StopWhenStepsizeLess<F> {
    /// Construct a criterion triggering once the last step size drops below `threshold`.
    pub fn new(threshold: F) -> Self {
        StopWhenStepsizeLess {
            threshold,
            reason: String::new(),
            at_iteration: 0,
        }
    }
}

impl<S> Criterion<S> for StopWhenStepsizeLess<S::Float>
where
    S: State + 'static,
{
    fn call(&mut self, _probe: &mut dyn Probe<S>, state: &S, i: u64) -> bool {
        if i == 0 {
            self.reason.clear();
            self.at_iteration = 0;
            return false;
        }
        let stepsize = state.get_stepsize();
        if stepsize < self.threshold {
            self.reason = format!(
                "Step size ({stepsize}) less than threshold ({})",
                self.threshold
            );
            self.at_iteration = i;
            true
        } else {
            false
        }
    }

    fn reason(&self) -> &str {
        &self.reason
    }

    fn at_iteration(&self) -> u64 {
        self.at_iteration
    }

    fn update(&mut self, key: &str, value: CriterionUpdate<S::Float>) {
        if key == "MinStepsize" {
            if let CriterionUpdate::Tolerance(t) = value {
                self.threshold = t;
            }
        }
    }

    impl_any!(StopWhenStepsizeLess);
}

/// Triggers once a caller-chosen numeric field of `S` is `<= threshold`, for `i > 0`.
///
/// Rust has no runtime field-by-symbol dispatch, so the field is selected at construction time by
/// an accessor closure rather than a `:field` keyword; `name` is only used to build `reason()`.
/// Covers fields with no dedicated criterion of their own (e.g. a solver-specific scratch value
/// read out of [`crate::core::Storage`]).
pub struct StopWhenSmallerOrEqual<S: State + 'static> {
    name: &'static str,
    threshold: S::Float,
    accessor: std::rc::Rc<dyn Fn(&S) -> Option<S::Float>>,
    reason: String,
    at_iteration: u64,
}

impl<S: State + 'static> StopWhenSmallerOrEqual<S> {
    /// Construct a criterion triggering once `accessor(state) <= threshold`. `name` is used only
    /// to build a readable `reason()`.
    pub fn new(
        name: &'static str,
        threshold: S::Float,
        accessor: impl Fn(&S) -> Option<S::Float> + 'static,
    ) -> Self {
        StopWhenSmallerOrEqual {
            name,
            threshold,
            accessor: std::rc::Rc::new(accessor),
            reason: String::new(),
            at_iteration: 0,
        }
    }
}

impl<S: State + 'static> Clone for StopWhenSmallerOrEqual<S> {
    fn clone(&self) -> Self {
        StopWhenSmallerOrEqual {
            name: self.name,
            threshold: self.threshold,
            accessor: self.accessor.clone(),
            reason: self.reason.clone(),
            at_iteration: self.at_iteration,
        }
    }
}

impl<S: State + 'static> Criterion<S> for StopWhenSmallerOrEqual<S> {
    fn call(&mut self, _probe: &mut dyn Probe<S>, state: &S, i: u64) -> bool {
        if i == 0 {
            self.reason.clear();
            self.at_iteration = 0;
            return false;
        }
        let Some(value) = (self.accessor)(state) else {
            return false;
        };
        if value <= self.threshold {
            self.reason = format!(
                "Field '{}' ({value}) smaller than or equal to threshold ({})",
                self.name, self.threshold
            );
            self.at_iteration = i;
            true
        } else {
            false
        }
    }

    fn reason(&self) -> &str {
        &self.reason
    }

    fn at_iteration(&self) -> u64 {
        self.at_iteration
    }

    fn update(&mut self, _key: &str, _value: CriterionUpdate<S::Float>) {
        // No recognized keys: the field and its accessor are fixed at construction time.
    }

    impl_any!(StopWhenSmallerOrEqual);
}

// --- combinators ---------------------------------------------------------------------------

/// Triggers iff every child triggers. All children are evaluated on every call, even after one
/// has already decided the outcome, so stateful children stay live.
pub struct StopWhenAll<S: State + 'static> {
    children: Vec<Box<dyn Criterion<S>>>,
    reason: String,
    at_iteration: u64,
}

impl<S: State + 'static> StopWhenAll<S> {
    /// Combine a list of criteria under AND.
    pub fn new(children: Vec<Box<dyn Criterion<S>>>) -> Self {
        Self::from_children(children)
    }

    fn from_children(children: Vec<Box<dyn Criterion<S>>>) -> Self {
        StopWhenAll {
            children,
            reason: String::new(),
            at_iteration: 0,
        }
    }
}

impl<S: State + 'static> Clone for StopWhenAll<S> {
    fn clone(&self) -> Self {
        StopWhenAll {
            children: self.children.iter().map(|c| c.clone_box()).collect(),
            reason: self.reason.clone(),
            at_iteration: self.at_iteration,
        }
    }
}

impl<S: State + 'static> Criterion<S> for StopWhenAll<S> {
    fn call(&mut self, probe: &mut dyn Probe<S>, state: &S, i: u64) -> bool {
        if i == 0 {
            self.reason.clear();
            self.at_iteration = 0;
        }
        // Evaluate every child, unconditionally, before combining.
        let results: Vec<bool> = self
            .children
            .iter_mut()
            .map(|c| c.call(probe, state, i))
            .collect();
        let all = results.iter().all(|&r| r);
        if all {
            self.reason = self
                .children
                .iter()
                .map(|c| c.reason())
                .collect::<Vec<_>>()
                .join("; ");
            self.at_iteration = i;
        }
        all
    }

    fn reason(&self) -> &str {
        &self.reason
    }

    fn at_iteration(&self) -> u64 {
        self.at_iteration
    }

    fn indicates_convergence(&self) -> bool {
        self.children.iter().any(|c| c.indicates_convergence())
    }

    fn update(&mut self, key: &str, value: CriterionUpdate<S::Float>) {
        for child in &mut self.children {
            child.update(key, value);
        }
    }

    fn collect_active<'a>(&'a self, out: &mut Vec<&'a dyn Criterion<S>>) {
        for child in &self.children {
            child.collect_active(out);
        }
    }

    impl_any!(StopWhenAll);
}

impl<S: State + 'static> Combine<S> for StopWhenAll<S> {
    fn children_cloned(&self) -> Vec<Box<dyn Criterion<S>>> {
        self.children.iter().map(|c| c.clone_box()).collect()
    }
}

/// Triggers iff any child triggers. All children are evaluated on every call, even after one
/// has already decided the outcome, so stateful children stay live.
pub struct StopWhenAny<S: State + 'static> {
    children: Vec<Box<dyn Criterion<S>>>,
    reason: String,
    at_iteration: u64,
}

impl<S: State + 'static> StopWhenAny<S> {
    /// Combine a list of criteria under OR.
    pub fn new(children: Vec<Box<dyn Criterion<S>>>) -> Self {
        Self::from_children(children)
    }

    fn from_children(children: Vec<Box<dyn Criterion<S>>>) -> Self {
        StopWhenAny {
            children,
            reason: String::new(),
            at_iteration: 0,
        }
    }
}

impl<S: State + 'static> Clone for StopWhenAny<S> {
    fn clone(&self) -> Self {
        StopWhenAny {
            children: self.children.iter().map(|c| c.clone_box()).collect(),
            reason: self.reason.clone(),
            at_iteration: self.at_iteration,
        }
    }
}

impl<S: State + 'static> Criterion<S> for StopWhenAny<S> {
    fn call(&mut self, probe: &mut dyn Probe<S>, state: &S, i: u64) -> bool {
        if i == 0 {
            self.reason.clear();
            self.at_iteration = 0;
        }
        let results: Vec<bool> = self
            .children
            .iter_mut()
            .map(|c| c.call(probe, state, i))
            .collect();
        let any = results.iter().any(|&r| r);
        if any {
            self.reason = self
                .children
                .iter()
                .zip(results.iter())
                .filter(|(_, &r)| r)
                .map(|(c, _)| c.reason())
                .collect::<Vec<_>>()
                .join("; ");
            self.at_iteration = i;
        }
        any
    }

    fn reason(&self) -> &str {
        &self.reason
    }

    fn at_iteration(&self) -> u64 {
        self.at_iteration
    }

    fn indicates_convergence(&self) -> bool {
        self.children
            .iter()
            .filter(|c| !c.reason().is_empty())
            .any(|c| c.indicates_convergence())
    }

    fn update(&mut self, key: &str, value: CriterionUpdate<S::Float>) {
        for child in &mut self.children {
            child.update(key, value);
        }
    }

    fn collect_active<'a>(&'a self, out: &mut Vec<&'a dyn Criterion<S>>) {
        for child in &self.children {
            child.collect_active(out);
        }
    }

    impl_any!(StopWhenAny);
}

impl<S: State + 'static> Combine<S> for StopWhenAny<S> {
    fn children_cloned(&self) -> Vec<Box<dyn Criterion<S>>> {
        self.children.iter().map(|c| c.clone_box()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::{QuadraticObjective, StepCounter};
    use crate::manifold::Euclidean;

    type Fx = crate::core::ManifoldState<Vec<f64>, Vec<f64>, f64>;

    fn probe() -> Problem<Euclidean<f64>, QuadraticObjective> {
        Problem::new(Euclidean::new(1), QuadraticObjective)
    }

    fn state_at(x: f64) -> Fx {
        let mut s: Fx = State::new(vec![x]);
        s.set_gradient(vec![2.0 * x]);
        s
    }

    #[test]
    fn stop_after_iteration_triggers_at_bound() {
        let mut c: StopAfterIteration<f64> = StopAfterIteration::new(3);
        let mut p = probe();
        let s = state_at(1.0);
        assert!(!Criterion::<Fx>::call(&mut c, &mut p, &s, 0));
        assert!(!Criterion::<Fx>::call(&mut c, &mut p, &s, 2));
        assert!(Criterion::<Fx>::call(&mut c, &mut p, &s, 3));
        assert_eq!(c.at_iteration(), 3);
    }

    #[test]
    fn stop_after_iteration_zero_triggers_immediately() {
        let mut c: StopAfterIteration<f64> = StopAfterIteration::new(0);
        let mut p = probe();
        let s = state_at(1.0);
        assert!(Criterion::<Fx>::call(&mut c, &mut p, &s, 0));
        assert_eq!(c.at_iteration(), 0);
    }

    #[test]
    fn resetting_at_zero_clears_reason() {
        let mut c: StopAfterIteration<f64> = StopAfterIteration::new(2);
        let mut p = probe();
        let s = state_at(1.0);
        assert!(Criterion::<Fx>::call(&mut c, &mut p, &s, 2));
        assert!(!c.reason().is_empty());
        assert!(!Criterion::<Fx>::call(&mut c, &mut p, &s, 0));
        assert_eq!(c.reason(), "");
        assert_eq!(c.at_iteration(), 0);
    }

    #[test]
    fn and_or_duality() {
        let mut p = probe();
        let s = state_at(1.0);
        for i in [0u64, 1, 3, 5] {
            let mut a: StopAfterIteration<f64> = StopAfterIteration::new(3);
            let mut b: StopWhenGradientNormLess<f64> = StopWhenGradientNormLess::new(1e-9);
            let ra = Criterion::<Fx>::call(&mut a, &mut p, &s, i);
            let rb = Criterion::<Fx>::call(&mut b, &mut p, &s, i);

            let mut a2: StopAfterIteration<f64> = StopAfterIteration::new(3);
            let mut b2: StopWhenGradientNormLess<f64> = StopWhenGradientNormLess::new(1e-9);
            let mut and: StopWhenAll<Fx> =
                StopWhenAll::new(vec![Box::new(a2.clone()), Box::new(b2.clone())]);
            let mut or: StopWhenAny<Fx> = StopWhenAny::new(vec![Box::new(a2), Box::new(b2)]);
            assert_eq!(and.call(&mut p, &s, i), ra && rb);
            assert_eq!(or.call(&mut p, &s, i), ra || rb);
        }
    }

    #[test]
    fn and_flattens_nested_all() {
        let a: StoppingCriterion<Fx> = StoppingCriterion::new(StopAfterIteration::<f64>::new(1));
        let b: StoppingCriterion<Fx> = StoppingCriterion::new(StopAfterIteration::<f64>::new(2));
        let c: StoppingCriterion<Fx> = StoppingCriterion::new(StopAfterIteration::<f64>::new(3));
        let combined = a.and(b).and(c);
        assert_eq!(combined.inner.as_any().downcast_ref::<StopWhenAll<Fx>>().unwrap().children.len(), 3);
    }

    #[test]
    fn change_less_cannot_trigger_on_first_iteration() {
        let mut c: StopWhenChangeLess<Fx> = StopWhenChangeLess::new(1e-3);
        let mut p = probe();
        let s0 = state_at(1.0);
        assert!(!c.call(&mut p, &s0, 0));
        let s1 = state_at(1.0);
        // First post-reset evaluation: no prior snapshot yet, cannot trigger even though the
        // iterate hasn't moved.
        assert!(!c.call(&mut p, &s1, 1));
        let s2 = state_at(1.0);
        assert!(c.call(&mut p, &s2, 2));
    }

    #[test]
    fn update_stopping_criterion_propagates_into_combinator() {
        let mut combined: StoppingCriterion<Fx> =
            StoppingCriterion::new(StopAfterIteration::<f64>::new(50))
                .or(StoppingCriterion::new(StopWhenGradientNormLess::<f64>::new(1e-6)));
        combined.update("MaxIteration", CriterionUpdate::Iterations(200));
        let mut p = probe();
        let s = state_at(1.0);
        assert!(!combined.evaluate(&mut p, &s, 100));
        assert!(combined.evaluate(&mut p, &s, 200));
    }

    #[test]
    fn smaller_or_equal_reads_an_arbitrary_field() {
        let mut c: StopWhenSmallerOrEqual<Fx> =
            StopWhenSmallerOrEqual::new("Stepsize", 0.1, |s: &Fx| Some(s.get_stepsize()));
        let mut p = probe();
        let mut s = state_at(1.0);
        s.set_stepsize(0.5);
        assert!(!c.call(&mut p, &s, 1));
        s.set_stepsize(0.05);
        assert!(c.call(&mut p, &s, 2));
        assert!(c.reason().contains("Stepsize"));
    }

    #[allow(dead_code)]
    fn _use(_: StepCounter) {}
}
