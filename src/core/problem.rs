// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{Error, Manifold, Objective};

/// Binds a [`Manifold`] to an [`Objective`] defined on it.
///
/// This is the thing solvers actually hold: counting is a separate, optional
/// [`ObjectiveCount`](crate::decorator::ObjectiveCount) decorator around the objective — a
/// `Problem` is just a binder that forwards calls, so that wrapping order between counting,
/// caching and the bare objective is visible and composable (see
/// [`SimpleObjectiveCache`](crate::decorator::SimpleObjectiveCache) and
/// [`LruObjectiveCache`](crate::decorator::LruObjectiveCache)).
#[derive(Clone, Debug)]
pub struct Problem<M, O> {
    /// The manifold the objective is defined on.
    pub manifold: M,
    objective: O,
}

impl<M: Manifold, O: Objective<M>> Problem<M, O> {
    /// Bind `objective` to `manifold`.
    pub fn new(manifold: M, objective: O) -> Self {
        Problem { manifold, objective }
    }

    /// Evaluate the objective's cost at `point`.
    pub fn cost(&mut self, point: &M::Point) -> Result<M::Float, Error> {
        self.objective.cost(&self.manifold, point)
    }

    /// Evaluate the objective's Riemannian gradient at `point`.
    pub fn gradient(&mut self, point: &M::Point) -> Result<M::TangentVector, Error> {
        self.objective.gradient(&self.manifold, point)
    }

    /// Evaluate the objective's proximal map at `point`.
    pub fn proximal_map(&mut self, point: &M::Point, lambda: M::Float) -> Result<M::Point, Error> {
        self.objective.proximal_map(&self.manifold, point, lambda)
    }

    /// Borrow the wrapped objective, e.g. to read a decorator's counts.
    pub fn objective(&self) -> &O {
        &self.objective
    }

    /// Mutably borrow the wrapped objective.
    pub fn objective_mut(&mut self) -> &mut O {
        &mut self.objective
    }

    /// Consume the problem, returning its manifold and objective.
    pub fn into_parts(self) -> (M, O) {
        (self.manifold, self.objective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::Euclidean;

    struct Quadratic;

    impl Objective<Euclidean<f64>> for Quadratic {
        fn cost(&mut self, _m: &Euclidean<f64>, p: &Vec<f64>) -> Result<f64, Error> {
            Ok(p.iter().map(|x| x * x).sum())
        }

        fn gradient(&mut self, _m: &Euclidean<f64>, p: &Vec<f64>) -> Result<Vec<f64>, Error> {
            Ok(p.iter().map(|x| 2.0 * x).collect())
        }
    }

    #[test]
    fn forwards_to_objective() {
        let mut problem = Problem::new(Euclidean::new(2), Quadratic);
        let cost = problem.cost(&vec![1.0, 2.0]).unwrap();
        assert_eq!(cost, 5.0);
        let grad = problem.gradient(&vec![1.0, 2.0]).unwrap();
        assert_eq!(grad, vec![2.0, 4.0]);
    }

    #[test]
    fn proximal_map_defaults_to_not_implemented() {
        let mut problem = Problem::new(Euclidean::new(2), Quadratic);
        assert!(problem.proximal_map(&vec![0.0, 0.0], 1.0).is_err());
    }
}
