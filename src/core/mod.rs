// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Core abstractions of the engine.
//!
//! This module contains the traits and types every solver, manifold and decorator in this crate
//! is built from: the [`Manifold`] capability bundle, the [`Objective`]/[`Problem`] pairing of an
//! objective with the manifold it is defined on, the [`State`] a solver carries between
//! iterations, the composable stopping criteria a [`StoppingCriterion`] is assembled from, and
//! the [`Solver`] trait every algorithm in [`crate::solver`] implements.

/// Macros
#[macro_use]
pub mod macros;
/// Injectable time source for wall-clock stopping criteria.
mod clock;
/// Composable stopping criteria.
mod criteria;
/// Error handling
mod errors;
/// Trait alias for float types
mod float;
/// Key value datastructure
mod kv;
/// The Riemannian manifold capability bundle.
mod manifold;
/// The function being minimized.
mod objective;
/// Binds an objective to the manifold it is defined on.
mod problem;
/// `Solver` trait and the driver loop.
mod solver;
/// Per-iteration state carried between solver steps.
mod state;
/// Small deep-copy scratch storage attached to a [`State`].
mod storage;
/// Fixtures shared by this crate's own tests.
#[cfg(test)]
pub(crate) mod test_utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use criteria::{
    Criterion, CriterionClone, CriterionUpdate, Probe, StopAfter, StopAfterIteration,
    StopWhenAll, StopWhenAny, StopWhenChangeLess, StopWhenCostLess, StopWhenGradientChangeLess,
    StopWhenGradientNormLess, StopWhenSmallerOrEqual, StopWhenStepsizeLess, StoppingCriterion,
};
pub use errors::OptimError;
pub use float::OptimFloat;
pub use kv::KV;
pub use manifold::Manifold;
pub use objective::Objective;
pub use problem::Problem;
pub use solver::{run, Solver};
pub use state::{ManifoldState, State};
pub use storage::{Storage, StorageKind, StorageValue};

/// The catch-all error type returned throughout this crate.
///
/// Concrete failures raised by this crate's own code are [`OptimError`] values converted via
/// `.into()`; user-supplied manifolds and objectives may return any error implementing
/// `std::error::Error`.
pub use anyhow::Error;
