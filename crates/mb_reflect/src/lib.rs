#![doc = include_str!("../README.md")]

// -----------------------------------------------------------------------------
// Extern Self

// The derive macro emits paths through the crate name so its output works
// in downstream crates and in doc tests alike. `extern self` makes
// `mb_reflect` resolve inside the crate itself too.
extern crate self as mb_reflect;

// -----------------------------------------------------------------------------
// Modules

mod copy;

pub mod descriptor;
pub mod error;
pub mod factory;
pub mod impls;
pub mod meta;
pub mod path;
pub mod schema;
pub mod token;
pub mod value;
pub mod wrap;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use copy::copy_matching;
pub use descriptor::{DescriptorCache, TypeDescriptor};
pub use error::ReflectError;
pub use factory::{DefaultObjectFactory, ObjectFactory};
pub use impls::{PropMap, Unknown};
pub use meta::{MetaType, MetaValue};
pub use schema::{Described, SchemaBuilder, TypeSchema};
pub use token::{StaticType, TypeToken, ValueKind};
pub use value::{Assoc, DebugValue, OptValue, PropValue, Seq, Shape, ShapeMut};
pub use wrap::{
    DefaultWrapperFactory, Env, ObjectWrapper, Wrapped, WrapperFactory, default_env, wrap,
};

pub use mb_reflect_derive as derive;
