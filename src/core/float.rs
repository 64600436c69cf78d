// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use num_traits::{Float, FloatConst, FromPrimitive, ToPrimitive};
use std::fmt::{Debug, Display};

/// An alias for float types (`f32`, `f64`) which combines the `num_traits` and `std::fmt` bounds
/// needed throughout this crate. It is automatically implemented for all types which fulfill
/// the trait bounds.
pub trait OptimFloat:
    'static + Float + FloatConst + FromPrimitive + ToPrimitive + Debug + Display
{
}

/// `OptimFloat` is automatically implemented for all types which fulfill the trait bounds.
impl<I> OptimFloat for I where
    I: 'static + Float + FloatConst + FromPrimitive + ToPrimitive + Debug + Display
{
}
