// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Macros

/// Creates a `KV` at compile time.
///
/// # Example
///
/// ```
/// use manifold_optim::kv;
///
/// let kv = kv!(
///     "key1" => "value1";
///     "key2" => 1234;
/// );
/// # assert_eq!(kv.kv.len(), 2);
/// ```
#[macro_export]
macro_rules! kv {
    ($($k:expr =>  $v:expr;)*) => {
        $crate::core::KV { kv: vec![ $(($k, format!("{}", $v))),* ] }
    };
}

/// Release a `T` from an `Option<T>` if it is not `None`. If it is `None`, return an
/// `OptimError` with a provided message.
#[macro_export]
macro_rules! check_param {
    ($param:expr, $msg:expr, $error:ident) => {
        match $param {
            None => {
                return Err($crate::core::OptimError::$error {
                    text: $msg.to_string(),
                }
                .into());
            }
            Some(ref x) => x.clone(),
        }
    };
    ($param:expr, $msg:expr) => {
        check_param!($param, $msg, NotInitialized)
    };
}

/// Create an `OptimError` with a provided message.
#[macro_export]
macro_rules! optim_error {
    ($error_type:ident, $msg:expr) => {
        $crate::core::OptimError::$error_type {
            text: $msg.to_string(),
        }
        .into()
    };
}

/// Create an `OptimError` with a provided message wrapped in a closure for use in
/// `.ok_or_else(...)` methods on `Option`s.
#[macro_export]
macro_rules! optim_error_closure {
    ($error_type:ident, $msg:expr) => {
        || -> $crate::core::Error { $crate::optim_error!($error_type, $msg) }
    };
}

/// Convert a constant to a float of the precision currently in scope as `F`.
#[macro_export]
macro_rules! float {
    ($t:ident, $val:expr) => {
        $t::from_f64($val).unwrap()
    };
    ($val:expr) => {
        F::from_f64($val).unwrap()
    };
}

/// Creates tests asserting that a type implements `Send`, `Sync` and `Clone`.
#[cfg(test)]
#[macro_export]
macro_rules! test_trait_impl {
    ($n:ident, $t:ty) => {
        mod $n {
            use super::*;

            #[test]
            fn send() {
                fn assert_send<T: Send>() {}
                assert_send::<$t>();
            }

            #[test]
            fn sync() {
                fn assert_sync<T: Sync>() {}
                assert_sync::<$t>();
            }

            #[test]
            fn clone() {
                fn assert_clone<T: Clone>() {}
                assert_clone::<$t>();
            }
        }
    };
}

/// Asserts that expression `$n` leads to an error of type `$t` and text `$s`.
#[cfg(test)]
#[macro_export]
macro_rules! assert_error {
    ($n:expr, $t:ty, $s:expr) => {
        assert_eq!(
            $n.err().unwrap().downcast_ref::<$t>().unwrap().to_string(),
            $s
        );
    };
}
