// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{Manifold, OptimFloat};
use argmin_math::{ArgminDot, ArgminL2Norm, ArgminScaledAdd, ArgminSub};

/// The unit sphere `{x in R^n : ||x|| = 1}`, embedded in `R^n`.
///
/// Points and tangent vectors are both represented as `Vec<F>`; a tangent vector at `p` is any
/// ambient vector orthogonal to `p`. The retraction projects `p + t*v` back onto the sphere by
/// normalizing, which is first-order accurate but (unlike the true exponential map, which moves
/// along a great circle) not exact for large `t` — adequate for testing stepsize rules and
/// stopping criteria, which is all this manifold is used for.
#[derive(Clone, Copy, Debug)]
pub struct Sphere<F> {
    ambient_dim: usize,
    _float: std::marker::PhantomData<F>,
}

impl<F> Sphere<F> {
    /// Construct the unit sphere embedded in `R^ambient_dim`, i.e. `S^{ambient_dim - 1}`.
    pub fn new(ambient_dim: usize) -> Self {
        Sphere {
            ambient_dim,
            _float: std::marker::PhantomData,
        }
    }
}

impl<F> Manifold for Sphere<F>
where
    F: OptimFloat,
    Vec<F>: ArgminSub<Vec<F>, Vec<F>> + ArgminDot<Vec<F>, F> + ArgminL2Norm<F>,
    Vec<F>: ArgminScaledAdd<Vec<F>, F, Vec<F>>,
{
    type Point = Vec<F>;
    type TangentVector = Vec<F>;
    type Float = F;

    fn representation_size(&self) -> usize {
        self.ambient_dim
    }

    fn retract(&self, point: &Vec<F>, vector: &Vec<F>, t: F) -> Vec<F> {
        let moved = point.scaled_add(&t, vector);
        let norm = moved.l2_norm();
        if norm > F::epsilon() {
            moved.into_iter().map(|x| x / norm).collect()
        } else {
            moved
        }
    }

    fn inverse_retract(&self, from: &Vec<F>, to: &Vec<F>) -> Vec<F> {
        self.project(from, &to.sub(from))
    }

    fn inner(&self, _point: &Vec<F>, a: &Vec<F>, b: &Vec<F>) -> F {
        a.dot(b)
    }

    fn norm(&self, _point: &Vec<F>, vector: &Vec<F>) -> F {
        vector.l2_norm()
    }

    fn transport(&self, _from: &Vec<F>, to: &Vec<F>, vector: &Vec<F>) -> Vec<F> {
        self.project(to, vector)
    }

    fn project(&self, point: &Vec<F>, vector: &Vec<F>) -> Vec<F> {
        let coeff = point.dot(vector);
        point
            .iter()
            .zip(vector.iter())
            .map(|(p, v)| *v - coeff * *p)
            .collect()
    }

    fn subtract_tangent(&self, _point: &Vec<F>, a: &Vec<F>, b: &Vec<F>) -> Vec<F> {
        a.sub(b)
    }

    fn scale_tangent(&self, _point: &Vec<F>, vector: &Vec<F>, factor: F) -> Vec<F> {
        vector.iter().map(|x| *x * factor).collect()
    }
}
