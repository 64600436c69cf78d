// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Step size rules used by [`crate::solver::GradientDescent`].

mod armijo;
mod constant;

pub use armijo::ArmijoBacktracking;
pub use constant::ConstantStepsize;

use crate::core::{Error, Manifold, Objective, Problem, State};

/// Picks how far to move along a descent direction.
///
/// `direction` is passed by mutable reference: a rule that discovers `direction` is not a
/// descent direction (`inner(p, grad, direction) > 0`) is expected to flip it to `-grad` in
/// place, the same correction the enclosing gradient-descent step would otherwise have to
/// special-case.
pub trait Stepsize<M, O, S>
where
    M: Manifold,
    O: Objective<M>,
    S: State<Point = M::Point, Tangent = M::TangentVector, Float = M::Float>,
{
    /// Name of the rule, used in diagnostics.
    const NAME: &'static str = "UNDEFINED";

    /// Determine the step size `t` for iteration `i`, possibly correcting `direction` in place.
    fn compute(
        &mut self,
        problem: &mut Problem<M, O>,
        state: &S,
        i: u64,
        direction: &mut S::Tangent,
    ) -> Result<S::Float, Error>;
}
