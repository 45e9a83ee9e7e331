//! See [`PropValue`].

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static PROP_ATTRIBUTE_NAME: &str = "prop";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;

// -----------------------------------------------------------------------------
// Macros

/// # Property Reflection Derivation
///
/// `#[derive(PropValue)]` automatically implements the following traits:
///
/// - `PropValue`
/// - `StaticType`
/// - `Described`
///
/// Every named field becomes a property, readable and writable through
/// property paths.
///
/// Only non-generic structs with named fields are supported: generated
/// accessors live in `static` tables keyed by concrete type, so there is no
/// single table a generic type could own.
///
/// ## Type-Level Flags
///
/// The macro cannot detect standard trait implementations, so capabilities
/// tied to them are declared explicitly:
///
/// ```rust, ignore
/// #[derive(PropValue, Default, Clone)]
/// #[prop(default, clone)]
/// struct Order { /* ... */ }
/// ```
///
/// - `default`: the type implements `Default`. Object factories may then
///   construct it, which is what lets a write materialize a missing link of
///   this type.
/// - `clone`: the type implements `Clone`, enabling `try_clone` and with it
///   property copying.
///
/// Without the flag, the corresponding operation reports its absence at
/// runtime instead.
///
/// ## Field-Level Flags
///
/// ```rust, ignore
/// #[derive(PropValue)]
/// struct Account {
///     balance: i64,
///     #[prop(readonly)]
///     id: u64,
///     #[prop(skip)]
///     session: Handle,
/// }
/// ```
///
/// - `readonly`: the property can be read and traversed, but never written.
/// - `skip`: the field is not a property at all. Its type needs no
///   `PropValue` implementation.
#[proc_macro_derive(PropValue, attributes(prop))]
pub fn derive_prop_value(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_data::ReflectInput::parse(&input) {
        Ok(info) => impls::impl_prop_value(&info).into(),
        Err(err) => err.to_compile_error().into(),
    }
}
