//! Parsed form of the derive input, attributes digested.

use syn::{Data, DeriveInput, Error, Fields, Ident, Result, Type};

use crate::PROP_ATTRIBUTE_NAME;

/// A struct the derive accepts: named fields, no generics.
pub(crate) struct ReflectInput<'a> {
    pub ident: &'a Ident,
    pub with_default: bool,
    pub with_clone: bool,
    pub fields: Vec<ReflectField<'a>>,
}

/// One field that becomes a property. Skipped fields never get here.
pub(crate) struct ReflectField<'a> {
    pub ident: &'a Ident,
    pub ty: &'a Type,
    pub readonly: bool,
}

impl<'a> ReflectInput<'a> {
    pub fn parse(input: &'a DeriveInput) -> Result<Self> {
        if !input.generics.params.is_empty() || input.generics.where_clause.is_some() {
            return Err(Error::new_spanned(
                &input.generics,
                "#[derive(PropValue)] does not support generic types: \
                 generated accessor tables are keyed by one concrete type",
            ));
        }
        let Data::Struct(data) = &input.data else {
            return Err(Error::new_spanned(
                input,
                "#[derive(PropValue)] only supports structs",
            ));
        };
        let Fields::Named(named) = &data.fields else {
            return Err(Error::new_spanned(
                &data.fields,
                "#[derive(PropValue)] requires named fields",
            ));
        };

        let (with_default, with_clone) = parse_type_flags(input)?;

        let mut fields = Vec::new();
        for field in &named.named {
            let (readonly, skip) = parse_field_flags(field)?;
            if skip {
                continue;
            }
            fields.push(ReflectField {
                // Named fields always carry an ident.
                ident: field.ident.as_ref().unwrap(),
                ty: &field.ty,
                readonly,
            });
        }
        Ok(ReflectInput {
            ident: &input.ident,
            with_default,
            with_clone,
            fields,
        })
    }
}

fn parse_type_flags(input: &DeriveInput) -> Result<(bool, bool)> {
    let mut with_default = false;
    let mut with_clone = false;
    for attr in &input.attrs {
        if !attr.path().is_ident(PROP_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                with_default = true;
                Ok(())
            } else if meta.path.is_ident("clone") {
                with_clone = true;
                Ok(())
            } else {
                Err(meta.error("expected `default` or `clone`"))
            }
        })?;
    }
    Ok((with_default, with_clone))
}

fn parse_field_flags(field: &syn::Field) -> Result<(bool, bool)> {
    let mut readonly = false;
    let mut skip = false;
    for attr in &field.attrs {
        if !attr.path().is_ident(PROP_ATTRIBUTE_NAME) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("readonly") {
                readonly = true;
                Ok(())
            } else if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `readonly` or `skip`"))
            }
        })?;
    }
    Ok((readonly, skip))
}
