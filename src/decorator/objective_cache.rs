// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::core::{Error, Manifold, Objective};
use std::num::NonZeroUsize;

/// Memoizes cost and gradient, keeping only the single most recently queried point.
///
/// A query at the same point (`==`) as the last one returns the stored value without calling the
/// wrapped objective; a query at any other point evicts both entries and recomputes.
#[derive(Clone, Debug)]
pub struct SimpleObjectiveCache<O, P, F, T> {
    inner: O,
    cost_entry: Option<(P, F)>,
    gradient_entry: Option<(P, T)>,
}

impl<O, P, F, T> SimpleObjectiveCache<O, P, F, T> {
    /// Wrap `inner` with an empty single-entry cache.
    pub fn new(inner: O) -> Self {
        SimpleObjectiveCache {
            inner,
            cost_entry: None,
            gradient_entry: None,
        }
    }

    /// Consume the decorator, discarding the cache.
    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<M, O> Objective<M> for SimpleObjectiveCache<O, M::Point, M::Float, M::TangentVector>
where
    M: Manifold,
    M::Point: PartialEq,
    O: Objective<M>,
{
    fn cost(&mut self, manifold: &M, point: &M::Point) -> Result<M::Float, Error> {
        if let Some((cached_point, cached_cost)) = &self.cost_entry {
            if cached_point == point {
                return Ok(*cached_cost);
            }
        }
        let cost = self.inner.cost(manifold, point)?;
        self.cost_entry = Some((point.clone(), cost));
        Ok(cost)
    }

    fn gradient(&mut self, manifold: &M, point: &M::Point) -> Result<M::TangentVector, Error> {
        if let Some((cached_point, cached_gradient)) = &self.gradient_entry {
            if cached_point == point {
                return Ok(cached_gradient.clone());
            }
        }
        let gradient = self.inner.gradient(manifold, point)?;
        self.gradient_entry = Some((point.clone(), gradient.clone()));
        Ok(gradient)
    }

    fn proximal_map(
        &mut self,
        manifold: &M,
        point: &M::Point,
        lambda: M::Float,
    ) -> Result<M::Point, Error> {
        self.inner.proximal_map(manifold, point, lambda)
    }
}

/// Memoizes cost and gradient for up to `capacity` distinct points, evicting least-recently-used
/// entries, keyed by a caller-supplied content-based key rather than the point type itself (most
/// manifold points, being made of floats, cannot be used directly as a hash map key).
pub struct LruObjectiveCache<O, M: Manifold, K> {
    inner: O,
    key_of: fn(&M::Point) -> K,
    cost_cache: lru::LruCache<K, M::Float>,
    gradient_cache: lru::LruCache<K, M::TangentVector>,
}

impl<O, M: Manifold, K: std::hash::Hash + Eq> LruObjectiveCache<O, M, K> {
    /// Wrap `inner` with an LRU cache of `capacity` entries, deriving a lookup key from each
    /// point via `key_of`.
    pub fn new(inner: O, capacity: NonZeroUsize, key_of: fn(&M::Point) -> K) -> Self {
        LruObjectiveCache {
            inner,
            key_of,
            cost_cache: lru::LruCache::new(capacity),
            gradient_cache: lru::LruCache::new(capacity),
        }
    }

    /// Consume the decorator, discarding the cache.
    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<M, O, K> Objective<M> for LruObjectiveCache<O, M, K>
where
    M: Manifold,
    O: Objective<M>,
    K: std::hash::Hash + Eq + Clone,
{
    fn cost(&mut self, manifold: &M, point: &M::Point) -> Result<M::Float, Error> {
        let key = (self.key_of)(point);
        if let Some(cost) = self.cost_cache.get(&key) {
            return Ok(*cost);
        }
        let cost = self.inner.cost(manifold, point)?;
        self.cost_cache.put(key, cost);
        Ok(cost)
    }

    fn gradient(&mut self, manifold: &M, point: &M::Point) -> Result<M::TangentVector, Error> {
        let key = (self.key_of)(point);
        if let Some(gradient) = self.gradient_cache.get(&key) {
            return Ok(gradient.clone());
        }
        let gradient = self.inner.gradient(manifold, point)?;
        self.gradient_cache.put(key, gradient.clone());
        Ok(gradient)
    }

    fn proximal_map(
        &mut self,
        manifold: &M,
        point: &M::Point,
        lambda: M::Float,
    ) -> Result<M::Point, Error> {
        self.inner.proximal_map(manifold, point, lambda)
    }
}

/// A content-based key for `Vec<f64>` points, built from the exact IEEE-754 bit pattern of each
/// component. Two points compare equal under this key iff they are bitwise identical — the same
/// "same point as last time" notion [`SimpleObjectiveCache`] uses via `PartialEq`, just hashable.
pub fn bitwise_key(point: &[f64]) -> Vec<u64> {
    point.iter().map(|x| x.to_bits()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_utils::QuadraticObjective;
    use crate::decorator::ObjectiveCount;
    use crate::manifold::Euclidean;

    #[test]
    fn simple_cache_hits_on_repeated_point() {
        let m: Euclidean<f64> = Euclidean::new(1);
        let mut o = SimpleObjectiveCache::new(ObjectiveCount::new(QuadraticObjective));
        for _ in 0..5 {
            o.cost(&m, &vec![2.0]).unwrap();
        }
        assert_eq!(o.inner.cost_count, 1);
    }

    #[test]
    fn simple_cache_misses_on_new_point() {
        let m: Euclidean<f64> = Euclidean::new(1);
        let mut o = SimpleObjectiveCache::new(ObjectiveCount::new(QuadraticObjective));
        o.cost(&m, &vec![1.0]).unwrap();
        o.cost(&m, &vec![2.0]).unwrap();
        o.cost(&m, &vec![1.0]).unwrap();
        assert_eq!(o.inner.cost_count, 3);
    }

    #[test]
    fn lru_cache_hits_on_repeated_point() {
        let m: Euclidean<f64> = Euclidean::new(1);
        let mut o = LruObjectiveCache::<_, Euclidean<f64>, Vec<u64>>::new(
            ObjectiveCount::new(QuadraticObjective),
            NonZeroUsize::new(4).unwrap(),
            |p| bitwise_key(p),
        );
        for _ in 0..5 {
            o.cost(&m, &vec![2.0]).unwrap();
        }
        assert_eq!(o.inner.cost_count, 1);
    }

    #[test]
    fn lru_cache_evicts_past_capacity() {
        let m: Euclidean<f64> = Euclidean::new(1);
        let mut o = LruObjectiveCache::<_, Euclidean<f64>, Vec<u64>>::new(
            ObjectiveCount::new(QuadraticObjective),
            NonZeroUsize::new(2).unwrap(),
            |p| bitwise_key(p),
        );
        o.cost(&m, &vec![1.0]).unwrap();
        o.cost(&m, &vec![2.0]).unwrap();
        o.cost(&m, &vec![3.0]).unwrap(); // evicts `1.0`
        o.cost(&m, &vec![1.0]).unwrap(); // miss again
        assert_eq!(o.inner.cost_count, 4);
    }
}
