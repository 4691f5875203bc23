use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, GenericArgument, Ident, LitInt, Pat,
    PathArguments, Result, Token, Type,
    parse::{Parse, ParseStream},
};

pub(crate) fn expand_from_record(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`FromRecord` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`FromRecord` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for field in &fields {
        if !seen.insert(field.number.base10_parse::<u8>()?) {
            Err(Error::new_spanned(
                &field.number,
                "Field numbers must be unique.",
            ))?
        }
    }

    let cases = fields.iter().map(|field| {
        let FieldMetadata {
            name,
            number,
            receiver,
        } = field;

        let assignment = match receiver {
            Receiver::Option(inner) => quote! {
                if let Some(value) =
                    <#inner as ::freewheel::avec::FromField>::from_field(field)
                {
                    self.#name = Some(value);
                }
            },
            Receiver::Handler { acc, val, body } => quote! {
                let #acc = &mut self.#name;
                let #val = field;
                #body;
            },
        };

        quote! { #number => { #assignment } }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl ::freewheel::avec::FromRecord for #name {
            fn add_field(&mut self, field: &::freewheel::sans::data::DecodedField) {
                match field.number {
                    #(#cases)*
                    _ => {}
                }
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    number: LitInt,
    receiver: Receiver,
}

#[derive(Debug)]
enum Receiver {
    /// Assign converted values to an `Option<T>`.
    Option(Type),
    /// Pass the struct field and the decoded field to a closure body.
    Handler {
        acc: Box<Pat>,
        val: Box<Pat>,
        body: Box<syn::Expr>,
    },
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let FieldAttribute { number, handler } = attr.meta.require_list()?.parse_args()?;

        let receiver = match handler {
            Some(handler) => {
                let mut inputs = handler.inputs.iter().cloned();

                let (Some(acc), Some(val), None) = (inputs.next(), inputs.next(), inputs.next())
                else {
                    Err(Error::new_spanned(
                        &handler,
                        "Handler closure must have two parameters.",
                    ))?
                };

                Receiver::Handler {
                    acc: Box::new(acc),
                    val: Box::new(val),
                    body: handler.body,
                }
            }
            None => Receiver::Option(option_inner(&field.ty)?.clone()),
        };

        Ok(Some(Self {
            name,
            number,
            receiver,
        }))
    }
}

/// Extract `T` from a field of type `Option<T>`.
fn option_inner(ty: &Type) -> Result<&Type> {
    let message = "Field without a handler must have type `Option<T>`.";

    let Type::Path(path) = ty else {
        Err(Error::new_spanned(ty, message))?
    };

    let Some(segment) = path.path.segments.last() else {
        Err(Error::new_spanned(ty, message))?
    };

    if segment.ident != "Option" {
        Err(Error::new_spanned(&segment.ident, message))?
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        Err(Error::new_spanned(
            &segment.arguments,
            "Field of type `Option<T>` must have a generic parameter.",
        ))?
    };

    let Some(GenericArgument::Type(inner)) = arguments.args.first() else {
        Err(Error::new_spanned(
            &arguments.args,
            "Generic argument of a field of type `Option<T>` must be a type.",
        ))?
    };

    Ok(inner)
}

#[derive(Debug)]
struct FieldAttribute {
    number: LitInt,
    handler: Option<ExprClosure>,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let number = input.parse::<LitInt>()?;

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self { number, handler })
    }
}
