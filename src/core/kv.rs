// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Key value storage
//!
//! A small ordered key-value bag used by debug and record decorators to pass structured
//! per-iteration data around without hand-rolling formatting at every call site.

/// A simple key-value storage.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct KV {
    /// The actual key value storage
    pub kv: Vec<(&'static str, String)>,
}

impl std::fmt::Display for KV {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for (key, val) in &self.kv {
            write!(f, "{key}: {val}  ")?;
        }
        Ok(())
    }
}

impl KV {
    /// Constructor
    pub fn new() -> Self {
        KV { kv: vec![] }
    }

    /// Push a key-value pair to the `kv` vector.
    ///
    /// This formats `val` using `format!`, so `T` has to implement `Display`.
    pub fn push<T: std::fmt::Display>(&mut self, key: &'static str, val: T) -> &mut Self {
        self.kv.push((key, format!("{val}")));
        self
    }

    /// Look up the formatted value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.kv
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Merge another `kv` into `self.kv`.
    #[must_use]
    pub fn merge(mut self, mut other: KV) -> Self {
        self.kv.append(&mut other.kv);
        self
    }
}

impl std::iter::FromIterator<(&'static str, String)> for KV {
    fn from_iter<I: IntoIterator<Item = (&'static str, String)>>(iter: I) -> Self {
        let mut c = KV::new();
        for i in iter {
            c.push(i.0, i.1);
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    test_trait_impl!(kv, KV);

    #[test]
    fn push_and_get() {
        let mut kv = KV::new();
        kv.push("iter", 3).push("cost", 1.5);
        assert_eq!(kv.get("iter"), Some("3"));
        assert_eq!(kv.get("cost"), Some("1.5"));
        assert_eq!(kv.get("missing"), None);
    }

    #[test]
    fn merge_appends() {
        let a = kv!("a" => 1;);
        let b = kv!("b" => 2;);
        let merged = a.merge(b);
        assert_eq!(merged.kv.len(), 2);
    }
}
