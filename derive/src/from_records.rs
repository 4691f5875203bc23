use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Field, Fields, Ident, LitInt, Result, Type};

pub(crate) fn expand_from_records(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`FromRecords` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`FromRecords` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(RecordMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for field in &fields {
        if !seen.insert(field.number.base10_parse::<u16>()?) {
            Err(Error::new_spanned(
                &field.number,
                "Message numbers must be unique.",
            ))?
        }
    }

    let cases = fields.iter().map(|field| {
        let RecordMetadata { name, number, kind } = field;

        let receiver = match kind {
            Collection::Vec => quote! {
                self.#name.push(Default::default());
                self.#name.last_mut().map(|r| r as _)
            },
            Collection::Option => quote! {
                Some(self.#name.insert(Default::default()))
            },
        };

        quote! { #number => { #receiver } }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl ::freewheel::avec::FromRecords for #name {
            fn add_record(
                &mut self,
                global: u16,
            ) -> Option<&mut dyn ::freewheel::avec::FromRecord> {
                match global {
                    #(#cases)*
                    _ => None,
                }
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
enum Collection {
    /// Keep the latest record.
    Option,
    /// Keep every record, in order.
    Vec,
}

#[derive(Debug)]
struct RecordMetadata {
    name: Ident,
    number: LitInt,
    kind: Collection,
}

impl RecordMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("record")) else {
            return Ok(None);
        };

        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let number = attr.parse_args::<LitInt>()?;

        let message = "Field must have an `Option<T>` or `Vec<T>` type.";

        let Type::Path(path) = &field.ty else {
            Err(Error::new_spanned(&field.ty, message))?
        };

        let Some(segment) = path.path.segments.last() else {
            Err(Error::new_spanned(&field.ty, message))?
        };

        let kind = if segment.ident == "Option" {
            Collection::Option
        } else if segment.ident == "Vec" {
            Collection::Vec
        } else {
            Err(Error::new_spanned(&segment.ident, message))?
        };

        Ok(Some(Self { name, number, kind }))
    }
}
