// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{Error, Manifold, Objective, OptimError, OptimFloat, Problem, State};
use crate::stepsize::Stepsize;
use crate::{float, optim_error};
use num_traits::{One, Zero};

/// Backtracking line search along a retraction, accepting the first trial `t` satisfying the
/// Armijo sufficient-decrease condition.
///
/// Starting from `t0`, shrinks `t` by a factor `beta` while `f(retract(p, d, t)) > f(p) + sigma *
/// t * inner(p, grad, d)` and `t > t_min`. If `d` turns out not to be a descent direction
/// (`inner(p, grad, d) > 0`), it is replaced in place by `-grad` before backtracking begins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmijoBacktracking<F> {
    t0: F,
    beta: F,
    sigma: F,
    t_min: Option<F>,
}

impl<F: OptimFloat> ArmijoBacktracking<F> {
    /// Construct an Armijo backtracking rule.
    ///
    /// `t0` must be positive, `beta` and `sigma` must lie in `(0, 1)`; an error is returned
    /// otherwise (a configuration error per the error taxonomy, not a numeric failure).
    pub fn new(t0: F, beta: F, sigma: F) -> Result<Self, Error> {
        if t0 <= float!(F, 0.0) {
            return Err(optim_error!(
                InvalidParameter,
                "ArmijoBacktracking: t0 must be > 0"
            ));
        }
        if beta <= float!(F, 0.0) || beta >= float!(F, 1.0) {
            return Err(optim_error!(
                InvalidParameter,
                "ArmijoBacktracking: beta must be in (0, 1)"
            ));
        }
        if sigma <= float!(F, 0.0) || sigma >= float!(F, 1.0) {
            return Err(optim_error!(
                InvalidParameter,
                "ArmijoBacktracking: sigma must be in (0, 1)"
            ));
        }
        Ok(ArmijoBacktracking {
            t0,
            beta,
            sigma,
            t_min: None,
        })
    }

    /// Set a minimum step size below which backtracking stops even if the Armijo condition is
    /// still violated.
    pub fn with_min_stepsize(mut self, t_min: F) -> Result<Self, Error> {
        if t_min <= float!(F, 0.0) {
            return Err(optim_error!(
                InvalidParameter,
                "ArmijoBacktracking: t_min must be > 0"
            ));
        }
        self.t_min = Some(t_min);
        Ok(self)
    }
}

impl<M, O, S> Stepsize<M, O, S> for ArmijoBacktracking<M::Float>
where
    M: Manifold,
    O: Objective<M>,
    S: State<Point = M::Point, Tangent = M::TangentVector, Float = M::Float>,
{
    const NAME: &'static str = "ArmijoBacktracking";

    fn compute(
        &mut self,
        problem: &mut Problem<M, O>,
        state: &S,
        _i: u64,
        direction: &mut S::Tangent,
    ) -> Result<S::Float, Error> {
        let p = state.get_iterate().clone();
        let grad = state.get_gradient().ok_or_else(|| {
            OptimError::NotInitialized {
                text: "ArmijoBacktracking requires a gradient on the state".to_string(),
            }
        })?;

        let mut m = problem.manifold.inner(&p, grad, direction);
        if m > M::Float::zero() {
            *direction = problem.manifold.scale_tangent(&p, grad, -M::Float::one());
            m = problem.manifold.inner(&p, grad, direction);
        }

        let f_p = problem.cost(&p)?;
        let t_min = self.t_min.unwrap_or_else(M::Float::zero);
        let mut t = self.t0;
        loop {
            let trial = problem.manifold.retract(&p, direction, t);
            let phi = problem.cost(&trial)?;
            let rhs = f_p + self.sigma * t * m;
            if phi <= rhs || t <= t_min {
                return Ok(t);
            }
            t = t * self.beta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::QuadraticObjective;
    use crate::core::ManifoldState;
    use crate::manifold::Euclidean;

    type Fx = ManifoldState<Vec<f64>, Vec<f64>, f64>;

    #[test]
    fn rejects_invalid_parameters() {
        assert!(ArmijoBacktracking::new(0.0, 0.5, 0.1).is_err());
        assert!(ArmijoBacktracking::new(1.0, 0.0, 0.1).is_err());
        assert!(ArmijoBacktracking::new(1.0, 1.0, 0.1).is_err());
        assert!(ArmijoBacktracking::new(1.0, 0.5, 0.0).is_err());
        assert!(ArmijoBacktracking::new(1.0, 0.5, 1.0).is_err());
    }

    #[test]
    fn satisfies_the_armijo_inequality() {
        let mut problem = Problem::new(Euclidean::<f64>::new(1), QuadraticObjective);
        let mut state: Fx = State::new(vec![2.0]);
        let grad = problem.gradient(state.get_iterate()).unwrap();
        state.set_gradient(grad.clone());
        let mut direction = vec![-grad[0]];
        let mut rule = ArmijoBacktracking::new(1.0, 0.5, 0.1).unwrap();

        let t = Stepsize::<Euclidean<f64>, QuadraticObjective, Fx>::compute(
            &mut rule, &mut problem, &state, 1, &mut direction,
        )
        .unwrap();

        let p = state.get_iterate();
        let f_p = problem.cost(p).unwrap();
        let m = problem.manifold.inner(p, &grad, &direction);
        let trial = problem.manifold.retract(p, &direction, t);
        let phi = problem.cost(&trial).unwrap();
        assert!(phi <= f_p + 0.1 * t * m + 1e-12);
    }

    #[test]
    fn flips_an_ascent_direction() {
        let mut problem = Problem::new(Euclidean::<f64>::new(1), QuadraticObjective);
        let mut state: Fx = State::new(vec![2.0]);
        let grad = problem.gradient(state.get_iterate()).unwrap();
        state.set_gradient(grad.clone());
        // An ascent direction: same sign as the gradient.
        let mut direction = grad.clone();
        let mut rule = ArmijoBacktracking::new(1.0, 0.5, 0.1).unwrap();

        Stepsize::<Euclidean<f64>, QuadraticObjective, Fx>::compute(
            &mut rule, &mut problem, &state, 1, &mut direction,
        )
        .unwrap();

        assert_eq!(direction, vec![-grad[0]]);
    }
}
