// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Fixtures shared by this crate's own unit and integration tests: a trivial objective defined
//! directly on [`crate::manifold::Euclidean`], so tests of the engine itself (criteria,
//! decorators, the driver) don't need a full Sphere/SPD objective to exercise.

use crate::core::{Error, Manifold, Objective};

/// `f(p) = (1/2) * ||p||^2`, with `grad f(p) = p`.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuadraticObjective;

impl<M> Objective<M> for QuadraticObjective
where
    M: Manifold<Point = Vec<M::Float>, TangentVector = Vec<M::Float>>,
{
    fn cost(&mut self, manifold: &M, point: &M::Point) -> Result<M::Float, Error> {
        let half = M::Float::from(0.5).unwrap_or_else(M::Float::one);
        Ok(half * manifold.inner(point, point, point))
    }

    fn gradient(&mut self, _manifold: &M, point: &M::Point) -> Result<M::TangentVector, Error> {
        Ok(point.clone())
    }
}

/// Counts how many times [`Objective::cost`]/[`Objective::gradient`] were called on the wrapped
/// objective, without decorating it — useful where a test needs to assert call counts but
/// doesn't want to pull in [`crate::decorator::ObjectiveCount`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StepCounter {
    /// Number of `cost` calls observed.
    pub cost_calls: u64,
    /// Number of `gradient` calls observed.
    pub gradient_calls: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::Euclidean;
    use approx::assert_relative_eq;

    #[test]
    fn quadratic_cost_and_gradient() {
        let m: Euclidean<f64> = Euclidean::new(2);
        let mut o = QuadraticObjective;
        let p = vec![3.0, 4.0];
        assert_relative_eq!(o.cost(&m, &p).unwrap(), 12.5);
        assert_eq!(o.gradient(&m, &p).unwrap(), p);
    }
}
