// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{Error, Manifold, Objective, OptimError, OptimFloat, Problem, Solver, State};
use crate::optim_error;
use num_traits::FromPrimitive;

/// Cyclic proximal point, sketched only to exercise the [`Solver`]/[`State`] contract for a
/// non-smooth objective.
///
/// Each iteration evaluates `get_proximal_map(O, M, lambda_k, p)` with a decaying step size
/// `lambda_k = lambda / k` and retracts the iterate onto the result. Which coordinate of a
/// product-manifold point actually moves on a given call is entirely the objective's concern —
/// `Objective::proximal_map` takes `&mut self`, so an objective defined over a
/// [`crate::manifold::ProductManifold`] cycles through its blocks by tracking its own call count
/// and only updating one factor per call, the same way the smooth objective in
/// [`crate::solver::GradientDescent`] is free to memoize or count calls. This solver does not
/// know or care that it is cycling; it only shrinks `lambda`.
///
/// No stepsize schedule options, no convergence tuning beyond what a [`crate::core::StoppingCriterion`]
/// already gives for free — this is a minimal second solver, not a competitor to dedicated convex
/// optimization packages.
#[derive(Clone, Copy, Debug)]
pub struct CyclicProximalPoint<F> {
    lambda: F,
}

impl<F: OptimFloat> CyclicProximalPoint<F> {
    /// Construct a cyclic proximal point solver with initial step size `lambda > 0`.
    pub fn new(lambda: F) -> Result<Self, Error> {
        if lambda <= F::zero() {
            return Err(optim_error!(
                InvalidParameter,
                "CyclicProximalPoint: lambda must be > 0"
            ));
        }
        Ok(CyclicProximalPoint { lambda })
    }
}

impl<M, O, S> Solver<M, O, S> for CyclicProximalPoint<M::Float>
where
    M: Manifold,
    O: Objective<M>,
    S: State<Point = M::Point, Tangent = M::TangentVector, Float = M::Float> + 'static,
{
    const NAME: &'static str = "CyclicProximalPoint";

    fn initialize(&mut self, problem: &mut Problem<M, O>, state: &mut S) -> Result<(), Error> {
        let cost = problem.cost(state.get_iterate())?;
        state.set_cost(cost);
        Ok(())
    }

    fn next_iter(&mut self, problem: &mut Problem<M, O>, state: &mut S, i: u64) -> Result<(), Error> {
        let k = M::Float::from_u64(i).ok_or_else(|| {
            OptimError::PotentialBug {
                text: "CyclicProximalPoint: iteration count does not fit into the float type"
                    .to_string(),
            }
        })?;
        let lambda_k = self.lambda / k;

        let p = state.get_iterate().clone();
        let next = problem.proximal_map(&p, lambda_k)?;
        let change = problem.manifold.distance(&p, &next);

        state.set_iterate(next);
        let cost = problem.cost(state.get_iterate())?;
        state.set_cost(cost);
        state.set_stepsize(lambda_k);
        state.set_change(change);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{run, ManifoldState, StopAfterIteration, StoppingCriterion};
    use crate::manifold::{Euclidean, ProductManifold};

    type M2 = ProductManifold<Euclidean<f64>, Euclidean<f64>>;
    type Fx = ManifoldState<(Vec<f64>, Vec<f64>), (Vec<f64>, Vec<f64>), f64>;

    /// The proximal map of `f(x, y) = 1/2 ||x||^2 + 1/2 ||y||^2` w.r.t. one block at a time,
    /// alternating which block moves on every call — a minimal stand-in for "cycling through the
    /// coordinates of a product manifold", driven entirely by the objective's own call count
    /// rather than anything the solver tracks.
    #[derive(Default)]
    struct AlternatingProxObjective {
        calls: u64,
    }

    impl Objective<M2> for AlternatingProxObjective {
        fn cost(&mut self, _m: &M2, p: &(Vec<f64>, Vec<f64>)) -> Result<f64, Error> {
            let sq = |v: &[f64]| v.iter().map(|x| x * x).sum::<f64>();
            Ok(0.5 * sq(&p.0) + 0.5 * sq(&p.1))
        }

        fn proximal_map(
            &mut self,
            _m: &M2,
            p: &(Vec<f64>, Vec<f64>),
            lambda: f64,
        ) -> Result<(Vec<f64>, Vec<f64>), Error> {
            self.calls += 1;
            // The proximal map of 1/2||.||^2 scaled by lambda shrinks a block towards zero by a
            // factor of 1 / (1 + lambda); only the active block (chosen by parity) moves.
            let shrink = |v: &[f64]| v.iter().map(|x| x / (1.0 + lambda)).collect();
            if self.calls % 2 == 1 {
                Ok((shrink(&p.0), p.1.clone()))
            } else {
                Ok((p.0.clone(), shrink(&p.1)))
            }
        }
    }

    #[test]
    fn alternates_blocks_and_shrinks_the_cost() {
        let problem = Problem::new(
            ProductManifold::new(Euclidean::new(2), Euclidean::new(2)),
            AlternatingProxObjective::default(),
        );
        let mut state: Fx = State::new((vec![1.0, 1.0], vec![1.0, 1.0]));
        state.set_stopping_criterion(StoppingCriterion::new(StopAfterIteration::new(20)));
        let solver = CyclicProximalPoint::new(1.0).unwrap();

        let initial_cost = 2.0; // 1/2*2 + 1/2*2
        let result = run(problem, solver, state).unwrap();
        assert!(result.get_cost() < initial_cost);
        // Both blocks should have shrunk from their start, not just one.
        assert!(result.get_iterate().0[0] < 1.0);
        assert!(result.get_iterate().1[0] < 1.0);
    }

    #[test]
    fn rejects_non_positive_lambda() {
        assert!(CyclicProximalPoint::<f64>::new(0.0).is_err());
        assert!(CyclicProximalPoint::<f64>::new(-1.0).is_err());
    }
}
