// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{Manifold, OptimFloat};
use argmin_math::{ArgminDot, ArgminL2Norm, ArgminScaledAdd, ArgminSub};

/// `R^n` under the standard Euclidean metric, represented as `Vec<F>`.
///
/// The flattest possible manifold: retraction is vector addition, the inverse retraction is
/// subtraction, and the Riemannian inner product is the ordinary dot product. Built on the
/// `argmin-math` traits (`ArgminDot`, `ArgminSub`, `ArgminScaledAdd`, `ArgminL2Norm`), so any
/// `Vec<F>`-based objective written against those traits directly needs no arithmetic changes to
/// run here.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean<F> {
    dim: usize,
    _float: std::marker::PhantomData<F>,
}

impl<F> Euclidean<F> {
    /// Construct the `dim`-dimensional Euclidean manifold.
    pub fn new(dim: usize) -> Self {
        Euclidean {
            dim,
            _float: std::marker::PhantomData,
        }
    }

    /// The dimension of this space.
    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl<F> Manifold for Euclidean<F>
where
    F: OptimFloat,
    Vec<F>: ArgminSub<Vec<F>, Vec<F>> + ArgminDot<Vec<F>, F> + ArgminL2Norm<F>,
    Vec<F>: ArgminScaledAdd<Vec<F>, F, Vec<F>>,
{
    type Point = Vec<F>;
    type TangentVector = Vec<F>;
    type Float = F;

    fn representation_size(&self) -> usize {
        self.dim
    }

    fn retract(&self, point: &Vec<F>, vector: &Vec<F>, t: F) -> Vec<F> {
        point.scaled_add(&t, vector)
    }

    fn inverse_retract(&self, from: &Vec<F>, to: &Vec<F>) -> Vec<F> {
        to.sub(from)
    }

    fn inner(&self, _point: &Vec<F>, a: &Vec<F>, b: &Vec<F>) -> F {
        a.dot(b)
    }

    fn norm(&self, _point: &Vec<F>, vector: &Vec<F>) -> F {
        vector.l2_norm()
    }

    fn transport(&self, _from: &Vec<F>, _to: &Vec<F>, vector: &Vec<F>) -> Vec<F> {
        vector.clone()
    }

    fn subtract_tangent(&self, _point: &Vec<F>, a: &Vec<F>, b: &Vec<F>) -> Vec<F> {
        a.sub(b)
    }

    fn scale_tangent(&self, _point: &Vec<F>, vector: &Vec<F>, factor: F) -> Vec<F> {
        vector.iter().map(|x| *x * factor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn retract_is_vector_addition() {
        let m: Euclidean<f64> = Euclidean::new(2);
        let p = vec![1.0, 2.0];
        let v = vec![1.0, -1.0];
        assert_eq!(m.retract(&p, &v, 1.0), vec![2.0, 1.0]);
        assert_eq!(m.retract(&p, &v, 0.0), p);
    }

    #[test]
    fn inverse_retract_undoes_retract() {
        let m: Euclidean<f64> = Euclidean::new(2);
        let p = vec![1.0, 2.0];
        let v = vec![0.5, -0.5];
        let q = m.retract(&p, &v, 1.0);
        assert_eq!(m.inverse_retract(&p, &q), v);
    }

    #[test]
    fn inner_is_dot_product() {
        let m: Euclidean<f64> = Euclidean::new(2);
        let p = vec![0.0, 0.0];
        let a = vec![1.0, 2.0];
        let b = vec![3.0, 4.0];
        assert_relative_eq!(m.inner(&p, &a, &b), 11.0);
        assert_relative_eq!(m.norm(&p, &a), (5.0_f64).sqrt());
    }
}
