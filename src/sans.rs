//! Building blocks for implementing decoders, free of any I/O.
//!
//! This module is intended for applications that need finer control than
//! the convenience functions in [`crate::avec`] provide, such as inspecting
//! raw field values or definitions as they stream past.
//!
//! # Architecture
//!
//! A document is a header, a record section of `data_size` bytes, and a
//! trailing two-byte CRC. Decoding proceeds strictly forward:
//!
//! 1. [`header::FitHeader::parse`] validates the marker and length in the
//!    first 12 bytes (and [`header::FitHeader::with_crc`] the optional
//!    header CRC).
//! 2. [`check::verify`] compares the trailing CRC against the header and
//!    record bytes, after which [`header::FitHeader::check_protocol`] reads
//!    the protocol version.
//! 3. A [`stream::MessageStream`], bounded to the record section by its
//!    [`cursor::Cursor`], absorbs definition messages into its
//!    [`definition::Registry`] and yields data messages as ordered sets of
//!    [`data::DecodedField`].
//!
//! The registry and the running timestamp belong to a single stream, so
//! separate documents may be decoded concurrently without coordination.

pub mod check;
pub mod cursor;
pub mod data;
pub mod definition;
pub mod header;
pub mod stream;
