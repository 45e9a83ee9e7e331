//! [`PropValue`] implementations for standard types.
//!
//! [`PropValue`]: crate::value::PropValue

mod list;
mod map;
mod option;
mod prop_map;
mod scalar;

pub use prop_map::{PropMap, Unknown};
