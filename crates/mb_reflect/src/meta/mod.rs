//! Path resolution layers.
//!
//! [`MetaType`] answers path questions about a type with no instance in
//! hand; [`MetaValue`] resolves paths against a live value.

mod meta_type;
mod meta_value;

pub use meta_type::MetaType;
pub use meta_value::MetaValue;
