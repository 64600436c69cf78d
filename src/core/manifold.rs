// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::OptimFloat;

/// The capability bundle a solver needs from a Riemannian manifold.
///
/// This is deliberately narrow: it does not attempt to describe a manifold as a linear-algebra
/// backend (the way `argmin-math`'s traits describe `Vec`/`ndarray`/`nalgebra` types). It only
/// exposes the handful of operations every solver in this crate actually calls.
pub trait Manifold {
    /// A point on the manifold.
    type Point: Clone;
    /// An element of a tangent space of the manifold.
    type TangentVector: Clone;
    /// Floating point precision.
    type Float: OptimFloat;

    /// The size of the flat array needed to represent one point, e.g. `n` for a manifold whose
    /// points are length-`n` vectors. Used by the modeling-layer adapter to size the vectorized
    /// primal start before reshaping it into a manifold point.
    fn representation_size(&self) -> usize;

    /// Moves `point` in the direction `vector`, scaled by `t`.
    ///
    /// A retraction is a first-order approximation of the exponential map: `retract(p, X, 0) ==
    /// p` and the derivative of `t -> retract(p, X, t)` at `t = 0` is `X`. It need not be the
    /// true exponential map (geodesic) — manifolds for which the exponential map is expensive to
    /// evaluate typically use a cheaper retraction instead.
    fn retract(
        &self,
        point: &Self::Point,
        vector: &Self::TangentVector,
        t: Self::Float,
    ) -> Self::Point;

    /// Returns a tangent vector at `from` that approximately points towards `to`.
    ///
    /// The inverse of [`retract`](Self::retract): for a true exponential map this is the
    /// logarithmic map.
    fn inverse_retract(&self, from: &Self::Point, to: &Self::Point) -> Self::TangentVector;

    /// The Riemannian inner product of two tangent vectors at `point`.
    fn inner(
        &self,
        point: &Self::Point,
        a: &Self::TangentVector,
        b: &Self::TangentVector,
    ) -> Self::Float;

    /// The norm induced by [`inner`](Self::inner). Solvers and stopping criteria use this to
    /// turn a Riemannian gradient into a scalar they can compare against a tolerance.
    fn norm(&self, point: &Self::Point, vector: &Self::TangentVector) -> Self::Float {
        self.inner(point, vector, vector).sqrt()
    }

    /// Transports a tangent vector at `from` to the tangent space at `to`.
    ///
    /// Used by solvers that need to compare or combine tangent vectors taken at different
    /// points, such as momentum or conjugate-direction updates.
    fn transport(
        &self,
        from: &Self::Point,
        to: &Self::Point,
        vector: &Self::TangentVector,
    ) -> Self::TangentVector;

    /// Projects an ambient-space vector at `point` onto the tangent space, turning a Euclidean
    /// gradient into a Riemannian one.
    ///
    /// The default implementation assumes `vector` is already tangent (true for manifolds
    /// without an embedding, such as a product of already-tangent factors) and returns it
    /// unchanged.
    fn project(&self, _point: &Self::Point, vector: &Self::TangentVector) -> Self::TangentVector {
        vector.clone()
    }

    /// Converts a Euclidean gradient at `point` into the Riemannian gradient: the metric-dual of
    /// the ambient gradient, projected onto the tangent space at `point`.
    ///
    /// This is the operation a modeling-layer adapter calls after reshaping a vectorized
    /// gradient into a manifold tangent vector, before it is handed to a solver. On manifolds
    /// without an embedding (e.g. [`Self::project`] being the identity) the two coincide.
    fn riemannian_gradient(
        &self,
        point: &Self::Point,
        euclidean_grad: &Self::TangentVector,
    ) -> Self::TangentVector {
        self.project(point, euclidean_grad)
    }

    /// The zero tangent vector at `point`.
    fn zero_vector(&self, point: &Self::Point) -> Self::TangentVector {
        self.project(point, &self.inverse_retract(point, point))
    }

    /// `a - b`, both tangent vectors at `point`.
    ///
    /// Needed by criteria such as `StopWhenGradientChangeLess`, which compares a transported old
    /// gradient against the current one.
    fn subtract_tangent(
        &self,
        point: &Self::Point,
        a: &Self::TangentVector,
        b: &Self::TangentVector,
    ) -> Self::TangentVector;

    /// `vector` scaled by `factor`, still a tangent vector at `point`.
    fn scale_tangent(
        &self,
        point: &Self::Point,
        vector: &Self::TangentVector,
        factor: Self::Float,
    ) -> Self::TangentVector;

    /// The Riemannian distance between two points, via `norm(inverse_retract(from, to))`.
    ///
    /// Not exact unless `inverse_retract` is the true logarithmic map, but consistent with the
    /// manifold's own retraction/inverse-retraction pair — the same approximation every other
    /// capability in this trait makes.
    fn distance(&self, from: &Self::Point, to: &Self::Point) -> Self::Float {
        self.norm(from, &self.inverse_retract(from, to))
    }
}
