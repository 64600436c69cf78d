// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Cross-cutting decorators for [`crate::core::Objective`] and [`crate::core::State`].
//!
//! Objective decorators ([`ObjectiveCount`], [`SimpleObjectiveCache`], [`LruObjectiveCache`],
//! [`ObjectiveReturn`]) wrap an objective and are composed by nesting: wrapping order is
//! observable (count-vs-cache ordering).
//!
//! State decorators ([`StateDebug`], [`StateRecord`], [`StateReturn`]) wrap a [`crate::core::State`]
//! and forward every operation to the inner state untouched, adding behavior only at the three
//! driver hook points. No monkey-patching: every decorator is explicit at construction.

mod objective_cache;
mod objective_count;
mod objective_return;
mod state_debug;
mod state_record;
mod state_return;
pub mod sink;

pub use objective_cache::{bitwise_key, LruObjectiveCache, SimpleObjectiveCache};
pub use objective_count::ObjectiveCount;
pub use objective_return::ObjectiveReturn;
pub use sink::{DebugSink, StdoutSink, VecSink};
pub use state_debug::{field as debug_field, DebugAction, StateDebug};
pub use state_record::{field as record_field, group as record_group, Hook, RecordAction, StateRecord};
pub use state_return::StateReturn;
