//! Derive macros for the `freewheel` receiver traits.
//!
//! Expansions refer to the traits by their absolute `::freewheel` paths.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_record;
mod from_records;

/// Derive `freewheel::avec::FromRecord` from `#[field(N)]` attributes.
#[proc_macro_derive(FromRecord, attributes(field))]
pub fn derive_from_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_record::expand_from_record(&input).unwrap_or_else(|err| err.to_compile_error().into())
}

/// Derive `freewheel::avec::FromRecords` from `#[record(N)]` attributes.
#[proc_macro_derive(FromRecords, attributes(record))]
pub fn derive_from_records(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_records::expand_from_records(&input).unwrap_or_else(|err| err.to_compile_error().into())
}
