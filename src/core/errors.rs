// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Errors

use thiserror::Error;

/// Error type returned by manifolds, objectives, solvers and stopping criteria.
#[derive(Debug, Clone, Error)]
pub enum OptimError {
    /// Indicates an invalid parameter (e.g. a step size rule constructed with a coefficient
    /// outside of its valid range).
    #[error("Invalid parameter: {text:?}")]
    InvalidParameter {
        /// Text
        text: String,
    },

    /// Indicates that an optional capability was not implemented by a manifold or objective.
    #[error("Not implemented: {text:?}")]
    NotImplemented {
        /// Text
        text: String,
    },

    /// Indicates that a value required before use has not been initialized.
    #[error("Not initialized: {text:?}")]
    NotInitialized {
        /// Text
        text: String,
    },

    /// Indicates that a condition (e.g. a line search descent condition) is violated.
    #[error("Condition violated: {text:?}")]
    ConditionViolated {
        /// Text
        text: String,
    },

    /// For errors which are likely bugs in this crate rather than misuse.
    #[error("Potential bug: {text:?}. Please file a report on https://github.com/argmin-rs/argmin/issues")]
    PotentialBug {
        /// Text
        text: String,
    },
}
