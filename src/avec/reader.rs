//! Reader-based decoder implementation.
//!
//! _Requires Cargo feature `std`._

use std::{io::Read, vec::Vec};

use crate::sans::header::FitHeader;

use super::{DecodeOptions, Error, FromRecords, slice};

/// Decode records from a reader of a document, publishing to a receiver.
///
/// The reader is drained into memory before decoding; read failures are
/// reported as [`Error::IoFailure`]. This method is also re-exported as
/// `freewheel::avec::decode_reader`.
pub fn decode(r: &mut impl Read, o: &mut impl FromRecords) -> Result<FitHeader, Error> {
    decode_with(r, o, &DecodeOptions::default())
}

/// Decode records from a reader of a document with explicit options.
pub fn decode_with(
    r: &mut impl Read,
    o: &mut impl FromRecords,
    options: &DecodeOptions,
) -> Result<FitHeader, Error> {
    let mut buf = Vec::new();
    r.read_to_end(&mut buf)?;

    slice::decode_with(&buf, o, options)
}
