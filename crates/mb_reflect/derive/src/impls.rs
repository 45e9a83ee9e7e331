//! Token generation for the three derived traits.

use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{ReflectField, ReflectInput};

/// Implement full property reflection for a struct type.
pub(crate) fn impl_prop_value(info: &ReflectInput) -> TokenStream {
    let prop_value_tokens = impl_trait_prop_value(info);
    let static_type_tokens = impl_trait_static_type(info);
    let described_tokens = impl_trait_described(info);

    quote! {
        #prop_value_tokens

        #static_type_tokens

        #described_tokens
    }
}

// -----------------------------------------------------------------------------
// trait: PropValue

fn impl_trait_prop_value(info: &ReflectInput) -> TokenStream {
    let ident = info.ident;
    let name_str = ident.to_string();

    let debug_fields = info.fields.iter().map(|field| {
        let field_ident = field.ident;
        let field_str = field_ident.to_string();
        quote! {
            .field(#field_str, &mb_reflect::DebugValue(&self.#field_ident))
        }
    });

    let try_clone_tokens = if info.with_clone {
        quote! {
            fn try_clone(&self) -> ::core::option::Option<::std::boxed::Box<dyn mb_reflect::PropValue>> {
                ::core::option::Option::Some(::std::boxed::Box::new(::core::clone::Clone::clone(self)))
            }
        }
    } else {
        TokenStream::new()
    };

    quote! {
        impl mb_reflect::PropValue for #ident {
            fn type_token(&self) -> mb_reflect::TypeToken {
                <Self as mb_reflect::StaticType>::token()
            }

            fn value_kind(&self) -> mb_reflect::ValueKind {
                mb_reflect::ValueKind::Record
            }

            fn shape(&self) -> mb_reflect::Shape<'_> {
                mb_reflect::Shape::Record(self)
            }

            fn shape_mut(&mut self) -> mb_reflect::ShapeMut<'_> {
                mb_reflect::ShapeMut::Record(self)
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
                self
            }

            fn assign(
                &mut self,
                value: ::std::boxed::Box<dyn mb_reflect::PropValue>,
            ) -> ::core::result::Result<(), ::std::boxed::Box<dyn mb_reflect::PropValue>> {
                *self = value.take::<Self>()?;
                ::core::result::Result::Ok(())
            }

            #try_clone_tokens

            fn debug_fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_struct(#name_str)
                    #(#debug_fields)*
                    .finish()
            }
        }
    }
}

// -----------------------------------------------------------------------------
// trait: StaticType

fn impl_trait_static_type(info: &ReflectInput) -> TokenStream {
    let ident = info.ident;

    let default_tokens = if info.with_default {
        quote! {
            .with_default(|| {
                ::std::boxed::Box::new(<Self as ::core::default::Default>::default())
            })
        }
    } else {
        TokenStream::new()
    };

    quote! {
        impl mb_reflect::StaticType for #ident {
            fn token() -> mb_reflect::TypeToken {
                mb_reflect::TypeToken::of_type::<Self>(mb_reflect::ValueKind::Record)
                    .with_schema(<Self as mb_reflect::Described>::schema)
                    #default_tokens
            }
        }
    }
}

// -----------------------------------------------------------------------------
// trait: Described

fn impl_trait_described(info: &ReflectInput) -> TokenStream {
    let ident = info.ident;
    let field_calls = info.fields.iter().map(get_field_slot_tokens);

    quote! {
        impl mb_reflect::Described for #ident {
            fn schema() -> mb_reflect::TypeSchema {
                mb_reflect::TypeSchema::builder(<Self as mb_reflect::StaticType>::token())
                    #(#field_calls)*
                    .build()
            }
        }
    }
}

/// Generate one `.field(...)` builder call: the read projection, the
/// mutable projection writes traverse through, and the write itself.
fn get_field_slot_tokens(field: &ReflectField) -> TokenStream {
    let field_ident = field.ident;
    let field_str = field_ident.to_string();
    let field_ty = field.ty;

    let read_tokens = quote! {
        |base| {
            let this = base
                .downcast_ref::<Self>()
                .ok_or_else(|| mb_reflect::ReflectError::wrong_receiver::<Self>(base))?;
            ::core::result::Result::Ok(&this.#field_ident)
        }
    };

    // An exclusive borrow of `base` must end before the error path can look
    // at it again, so the receiver's path is captured up front.
    let read_mut_tokens = quote! {
        ::core::option::Option::Some(|base| {
            let found = base.type_token().path();
            let ::core::option::Option::Some(this) = base.downcast_mut::<Self>() else {
                return ::core::result::Result::Err(mb_reflect::ReflectError::WrongReceiver {
                    expected: ::core::any::type_name::<Self>(),
                    found,
                });
            };
            ::core::result::Result::Ok(&mut this.#field_ident)
        })
    };

    let write_tokens = if field.readonly {
        quote! { ::core::option::Option::None }
    } else {
        quote! {
            ::core::option::Option::Some(|base, value| {
                let found = base.type_token().path();
                let ::core::option::Option::Some(this) = base.downcast_mut::<Self>() else {
                    return ::core::result::Result::Err(mb_reflect::ReflectError::WrongReceiver {
                        expected: ::core::any::type_name::<Self>(),
                        found,
                    });
                };
                this.#field_ident = value
                    .take::<#field_ty>()
                    .map_err(|value| mb_reflect::ReflectError::value_type::<#field_ty>(&*value))?;
                ::core::result::Result::Ok(())
            })
        }
    };

    quote! {
        .field(
            #field_str,
            <#field_ty as mb_reflect::StaticType>::token(),
            #read_tokens,
            #read_mut_tokens,
            #write_tokens,
        )
    }
}
