// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! manifold-optim is a small optimization toolbox for objectives defined on Riemannian
//! manifolds.
//!
//! Instead of a linear-algebra backend abstraction, the crate is built around a narrow
//! [`Manifold`](crate::core::Manifold) capability bundle (retraction, inverse retraction,
//! Riemannian inner product, vector transport). Any type that implements it can be optimized
//! over with the solvers in [`solver`].
//!
//! Termination is a first-class, composable value: a
//! [`StoppingCriterion`](crate::core::StoppingCriterion) is built out of individual
//! [`criteria`](crate::core::criteria) combined with `.and()`/`.or()`, rather than a fixed
//! `max_iters`/`target_cost` pair baked into the state.
//!
//! Counting, caching and diagnostics are implemented as transparent decorators
//! ([`decorator`]) around an [`Objective`](crate::core::Objective) or a
//! [`State`](crate::core::State), not as built-in solver features.
//!
//! # Algorithms
//!
//! - [Riemannian gradient descent](`crate::solver::GradientDescent`), with
//!   [constant](`crate::stepsize::ConstantStepsize`) and
//!   [Armijo backtracking](`crate::stepsize::ArmijoBacktracking`) step size rules.
//! - [Cyclic proximal point](`crate::solver::CyclicProximalPoint`), sketched to exercise the
//!   same `Solver`/`State` contract for a non-smooth objective.
//!
//! # Modeling-layer adapters
//!
//! This crate has no algebraic-modeling front end of its own (no variable bookkeeping, no
//! `optimize!`-style entry point) — that is a narrow external collaborator. An adapter binding
//! one to this engine declares a vectorized variable set of size
//! [`Manifold::representation_size`](crate::core::Manifold::representation_size), reshapes the
//! vectorized primal start into a manifold [`Point`](crate::core::Manifold::Point), converts a
//! Euclidean gradient over the flat array into a Riemannian one via
//! [`Manifold::riemannian_gradient`](crate::core::Manifold::riemannian_gradient), inverts the
//! sign on maximization, runs [`core::run`], and reports a status of `OPTIMIZE_NOT_CALLED` /
//! `LOCALLY_SOLVED` / `NO_SOLUTION` (primal status `FEASIBLE_POINT` iff a result exists; dual
//! status always `NO_SOLUTION`, since this engine has no dual). No such adapter ships in this
//! crate.
//!
//! # License
//!
//! Licensed under either of
//!
//!   * Apache License, Version 2.0
//!   * MIT License
//!
//! at your option.

#![warn(missing_docs)]
#![allow(unused_attributes)]
// Explicitly disallow EQ comparison of floats. (This clippy lint is denied by default; however,
// this is just to make sure that it will always stay this way.)
#![deny(clippy::float_cmp)]

#[macro_use]
pub mod core;

/// Objective and state decorators (counting, caching, debugging, recording).
pub mod decorator;
/// Concrete manifolds used to drive the engine's own tests.
pub mod manifold;
/// Optimization algorithms.
pub mod solver;
/// Step size rules used by the solvers.
pub mod stepsize;

pub use crate::core::{
    Clock, Error, Manifold, ManifoldState, Objective, OptimError, OptimFloat, Problem, Solver,
    State, StoppingCriterion, KV,
};

/// Convenience constructor mirroring [`crate::solver::GradientDescent::new`].
///
/// Builds a [`solver::GradientDescent`] solver using the given step size rule; further
/// configuration (stopping criterion, decorators) happens via the builder methods on the
/// returned value.
pub fn gradient_descent<St>(stepsize: St) -> solver::GradientDescent<St> {
    solver::GradientDescent::new(stepsize)
}
