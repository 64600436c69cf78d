// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::Manifold;

/// The Cartesian product of two manifolds, `M x N`, with the product metric.
///
/// Points and tangent vectors are pairs; every operation factors componentwise, and the inner
/// product of two tangent pairs is the sum of the two factors' inner products. Useful for
/// problems whose variable naturally splits into independent blocks with different geometry,
/// e.g. a point on a sphere paired with an unconstrained offset in `R^n`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProductManifold<A, B> {
    /// The first factor.
    pub first: A,
    /// The second factor.
    pub second: B,
}

impl<A, B> ProductManifold<A, B> {
    /// Combine `first` and `second` into their product.
    pub fn new(first: A, second: B) -> Self {
        ProductManifold { first, second }
    }
}

impl<A, B> Manifold for ProductManifold<A, B>
where
    A: Manifold,
    B: Manifold<Float = A::Float>,
{
    type Point = (A::Point, B::Point);
    type TangentVector = (A::TangentVector, B::TangentVector);
    type Float = A::Float;

    fn representation_size(&self) -> usize {
        self.first.representation_size() + self.second.representation_size()
    }

    fn retract(&self, point: &Self::Point, vector: &Self::TangentVector, t: Self::Float) -> Self::Point {
        (
            self.first.retract(&point.0, &vector.0, t),
            self.second.retract(&point.1, &vector.1, t),
        )
    }

    fn inverse_retract(&self, from: &Self::Point, to: &Self::Point) -> Self::TangentVector {
        (
            self.first.inverse_retract(&from.0, &to.0),
            self.second.inverse_retract(&from.1, &to.1),
        )
    }

    fn inner(&self, point: &Self::Point, a: &Self::TangentVector, b: &Self::TangentVector) -> Self::Float {
        self.first.inner(&point.0, &a.0, &b.0) + self.second.inner(&point.1, &a.1, &b.1)
    }

    fn transport(&self, from: &Self::Point, to: &Self::Point, vector: &Self::TangentVector) -> Self::TangentVector {
        (
            self.first.transport(&from.0, &to.0, &vector.0),
            self.second.transport(&from.1, &to.1, &vector.1),
        )
    }

    fn project(&self, point: &Self::Point, vector: &Self::TangentVector) -> Self::TangentVector {
        (
            self.first.project(&point.0, &vector.0),
            self.second.project(&point.1, &vector.1),
        )
    }

    fn subtract_tangent(
        &self,
        point: &Self::Point,
        a: &Self::TangentVector,
        b: &Self::TangentVector,
    ) -> Self::TangentVector {
        (
            self.first.subtract_tangent(&point.0, &a.0, &b.0),
            self.second.subtract_tangent(&point.1, &a.1, &b.1),
        )
    }

    fn scale_tangent(
        &self,
        point: &Self::Point,
        vector: &Self::TangentVector,
        factor: Self::Float,
    ) -> Self::TangentVector {
        (
            self.first.scale_tangent(&point.0, &vector.0, factor),
            self.second.scale_tangent(&point.1, &vector.1, factor),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::{Euclidean, Sphere};

    #[test]
    fn inner_sums_factor_inner_products() {
        let m = ProductManifold::new(Euclidean::<f64>::new(2), Sphere::<f64>::new(2));
        let p = (vec![0.0, 0.0], vec![1.0, 0.0]);
        let a = (vec![1.0, 0.0], vec![0.0, 1.0]);
        let b = (vec![2.0, 0.0], vec![0.0, 3.0]);
        assert_eq!(m.inner(&p, &a, &b), 2.0 + 3.0);
    }

    #[test]
    fn retract_factors_componentwise() {
        let m = ProductManifold::new(Euclidean::<f64>::new(1), Euclidean::<f64>::new(1));
        let p = (vec![0.0], vec![0.0]);
        let v = (vec![1.0], vec![2.0]);
        let q = m.retract(&p, &v, 1.0);
        assert_eq!(q, (vec![1.0], vec![2.0]));
    }
}
