// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{Error, Manifold, Objective, OptimFloat, Problem, State};
use crate::stepsize::Stepsize;

/// Always returns the same step size, regardless of iterate, gradient or iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConstantStepsize<F> {
    alpha: F,
}

impl<F: OptimFloat> ConstantStepsize<F> {
    /// Construct a rule returning `alpha` every time.
    pub fn new(alpha: F) -> Self {
        ConstantStepsize { alpha }
    }
}

impl<M, O, S> Stepsize<M, O, S> for ConstantStepsize<M::Float>
where
    M: Manifold,
    O: Objective<M>,
    S: State<Point = M::Point, Tangent = M::TangentVector, Float = M::Float>,
{
    const NAME: &'static str = "ConstantStepsize";

    fn compute(
        &mut self,
        _problem: &mut Problem<M, O>,
        _state: &S,
        _i: u64,
        _direction: &mut S::Tangent,
    ) -> Result<S::Float, Error> {
        Ok(self.alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::QuadraticObjective;
    use crate::core::ManifoldState;
    use crate::manifold::Euclidean;

    #[test]
    fn always_returns_alpha() {
        let mut rule = ConstantStepsize::new(0.5);
        let mut problem = Problem::new(Euclidean::<f64>::new(1), QuadraticObjective);
        let state: ManifoldState<Vec<f64>, Vec<f64>, f64> = State::new(vec![1.0]);
        let mut direction = vec![-1.0];
        for i in 0..5 {
            assert_eq!(
                rule.compute(&mut problem, &state, i, &mut direction).unwrap(),
                0.5
            );
        }
    }
}
