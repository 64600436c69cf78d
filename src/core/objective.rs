// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{Error, Manifold, OptimError};

/// A function to be minimized over a [`Manifold`].
///
/// Mirrors the way `argmin`'s core splits `CostFunction`/`Gradient`/`Hessian` into separate
/// traits, but collapsed into one trait with optional capabilities: most objectives implement
/// only `cost` and `gradient`; `proximal_map` defaults to [`OptimError::NotImplemented`] the
/// same way `LinearProgram::A`/`b`/`c` do in `argmin`, and is only needed by solvers such as
/// [`CyclicProximalPoint`](crate::solver::CyclicProximalPoint).
///
/// Methods take `&mut self` so that decorators ([`crate::decorator`]) can record counts, cache
/// hits or running bests without interior mutability.
pub trait Objective<M: Manifold> {
    /// Evaluate the objective at `point`.
    fn cost(&mut self, manifold: &M, point: &M::Point) -> Result<M::Float, Error>;

    /// Evaluate the Riemannian gradient at `point`.
    fn gradient(&mut self, _manifold: &M, _point: &M::Point) -> Result<M::TangentVector, Error> {
        Err(OptimError::NotImplemented {
            text: "Objective::gradient not implemented".to_string(),
        }
        .into())
    }

    /// Evaluate the proximal map of `self` scaled by `lambda` at `point`.
    fn proximal_map(
        &mut self,
        _manifold: &M,
        _point: &M::Point,
        _lambda: M::Float,
    ) -> Result<M::Point, Error> {
        Err(OptimError::NotImplemented {
            text: "Objective::proximal_map not implemented".to_string(),
        }
        .into())
    }
}
