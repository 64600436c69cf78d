// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{Error, Manifold, Objective, Problem, Solver, State};
use crate::stepsize::Stepsize;
use num_traits::One;

/// Riemannian gradient descent.
///
/// Each iteration computes the Riemannian gradient at the current iterate, takes the negative
/// gradient as the descent direction, asks `St` (e.g.
/// [`ConstantStepsize`](crate::stepsize::ConstantStepsize) or
/// [`ArmijoBacktracking`](crate::stepsize::ArmijoBacktracking)) how far to move along it, then
/// retracts.
///
/// The stopping criterion is configured directly on the `State` passed to [`crate::core::run`]
/// before the solve starts (`state.set_stopping_criterion(...)`), and counting/caching/debug/record
/// are separate decorators composed onto the objective/state beforehand rather than builder flags
/// on the solver itself — a plain stepsize rule is the only thing specific to this algorithm.
#[derive(Clone, Copy, Debug)]
pub struct GradientDescent<St> {
    stepsize: St,
}

impl<St> GradientDescent<St> {
    /// Construct a gradient-descent solver using `stepsize` to choose how far to move along the
    /// negative gradient at each iteration.
    pub fn new(stepsize: St) -> Self {
        GradientDescent { stepsize }
    }
}

impl<M, O, S, St> Solver<M, O, S> for GradientDescent<St>
where
    M: Manifold,
    O: Objective<M>,
    S: State<Point = M::Point, Tangent = M::TangentVector, Float = M::Float> + 'static,
    St: Stepsize<M, O, S>,
{
    const NAME: &'static str = "GradientDescent";

    fn initialize(&mut self, problem: &mut Problem<M, O>, state: &mut S) -> Result<(), Error> {
        let p = state.get_iterate().clone();
        let cost = problem.cost(&p)?;
        state.set_cost(cost);
        let grad = problem.gradient(&p)?;
        let norm = problem.manifold.norm(&p, &grad);
        state.set_gradient_norm(norm);
        state.set_gradient(grad);
        Ok(())
    }

    fn next_iter(&mut self, problem: &mut Problem<M, O>, state: &mut S, i: u64) -> Result<(), Error> {
        let p = state.get_iterate().clone();
        let grad = problem.gradient(&p)?;
        // Default direction update: `d = -X`.
        let mut direction = problem.manifold.scale_tangent(&p, &grad, -M::Float::one());
        let norm = problem.manifold.norm(&p, &grad);
        state.set_gradient(grad);
        state.set_gradient_norm(norm);

        let t = self.stepsize.compute(problem, state, i, &mut direction)?;
        let next = problem.manifold.retract(&p, &direction, t);
        let change = problem.manifold.distance(&p, &next);

        state.set_iterate(next);
        let cost = problem.cost(state.get_iterate())?;
        state.set_cost(cost);
        state.set_stepsize(t);
        state.set_change(change);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::QuadraticObjective;
    use crate::core::{run, ManifoldState, StopWhenGradientNormLess, StoppingCriterion};
    use crate::manifold::Euclidean;
    use crate::stepsize::ConstantStepsize;

    type Fx = ManifoldState<Vec<f64>, Vec<f64>, f64>;

    #[test]
    fn converges_on_euclidean_quadratic() {
        // S1: f(x) = 1/2 x^2, grad = x, x0 = 1, constant step 0.5.
        let problem = Problem::new(Euclidean::new(1), QuadraticObjective);
        let mut state: Fx = State::new(vec![1.0]);
        state.set_stopping_criterion(StoppingCriterion::new(
            StopWhenGradientNormLess::<f64>::new(1e-10),
        ));
        let solver = GradientDescent::new(ConstantStepsize::new(0.5));
        let result = run(problem, solver, state).unwrap();
        assert!(result.get_iterate()[0].abs() < 1e-10);
        assert!(result.get_iter() <= 60);
    }
}

/// S2: the sphere Karcher mean, minimized with Armijo backtracking.
#[cfg(test)]
mod sphere_karcher_mean {
    use super::*;
    use crate::core::{run, StopAfterIteration, StopWhenGradientNormLess, StoppingCriterion};
    use crate::manifold::Sphere;
    use crate::stepsize::ArmijoBacktracking;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};
    use rand_xoshiro::Xoshiro256PlusPlus;

    type SphereState = ManifoldState<Vec<f64>, Vec<f64>, f64>;

    /// `f(p) = (1/2n) sum_i distance(p, x_i)^2`, `grad f(p) = -(1/n) sum_i log_p(x_i)`: the
    /// Riemannian center of mass of a fixed sample.
    #[derive(Clone)]
    struct KarcherMeanObjective {
        samples: Vec<Vec<f64>>,
    }

    impl Objective<Sphere<f64>> for KarcherMeanObjective {
        fn cost(&mut self, m: &Sphere<f64>, p: &Vec<f64>) -> Result<f64, Error> {
            let n = self.samples.len() as f64;
            let sum_sq: f64 = self
                .samples
                .iter()
                .map(|x| {
                    let d = m.distance(p, x);
                    d * d
                })
                .sum();
            Ok(sum_sq / (2.0 * n))
        }

        fn gradient(&mut self, m: &Sphere<f64>, p: &Vec<f64>) -> Result<Vec<f64>, Error> {
            let n = self.samples.len() as f64;
            let mut grad = vec![0.0; p.len()];
            for x in &self.samples {
                let log = m.inverse_retract(p, x);
                for (g, l) in grad.iter_mut().zip(log.iter()) {
                    *g -= l / n;
                }
            }
            Ok(grad)
        }
    }

    /// Draws `n` points on the sphere by perturbing `base` with iid `Normal(0, sigma)` tangent
    /// components and retracting, seeded for reproducibility.
    fn sample_points(base: &[f64], sigma: f64, n: usize, seed: u64) -> Vec<Vec<f64>> {
        let manifold: Sphere<f64> = Sphere::new(base.len());
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let normal = Normal::new(0.0, sigma).unwrap();
        let base = base.to_vec();
        (0..n)
            .map(|_| {
                let ambient: Vec<f64> = (0..base.len()).map(|_| normal.sample(&mut rng)).collect();
                let tangent = manifold.project(&base, &ambient);
                manifold.retract(&base, &tangent, 1.0)
            })
            .collect()
    }

    #[test]
    fn converges_near_a_long_run_reference() {
        let base = vec![1.0 / 2.0_f64.sqrt(), 0.0, 1.0 / 2.0_f64.sqrt()];
        let sigma = std::f64::consts::PI / 8.0;
        let samples = sample_points(&base, sigma, 100, 42);
        let manifold: Sphere<f64> = Sphere::new(3);

        let reference = {
            let problem = Problem::new(
                manifold,
                KarcherMeanObjective {
                    samples: samples.clone(),
                },
            );
            let mut state: SphereState = State::new(base.clone());
            state.set_stopping_criterion(StoppingCriterion::new(StopAfterIteration::new(10_000)));
            let solver = GradientDescent::new(ArmijoBacktracking::new(1.0, 0.5, 1e-4).unwrap());
            run(problem, solver, state).unwrap().get_iterate().clone()
        };

        let problem = Problem::new(manifold, KarcherMeanObjective { samples });
        let mut state: SphereState = State::new(base);
        state.set_stopping_criterion(
            StoppingCriterion::new(StopWhenGradientNormLess::<f64>::new(1e-9))
                .or(StoppingCriterion::new(StopAfterIteration::new(500))),
        );
        let solver = GradientDescent::new(ArmijoBacktracking::new(1.0, 0.5, 1e-4).unwrap());
        let result = run(problem, solver, state).unwrap();

        // Converged well before the 500-iteration backstop, to (near) the same fixed point a much
        // longer run settles on.
        assert!(result.get_iter() < 500);
        assert!(manifold.distance(result.get_iterate(), &reference) < 1e-4);
    }
}
