//! Convenience interfaces for common decoding patterns.
//!
//! The functions in this module decode whole documents from slices and
//! readers, publishing each data message to the [`FromRecords`] and
//! [`FromRecord`] traits.
//!
//! When records are of a known shape these traits can be derived. See the
//! [`FromRecords`](macro@FromRecords) and [`FromRecord`](macro@FromRecord)
//! macros for details. The activity model in [`crate::activity`] is built
//! this way.

#[cfg(feature = "std")]
pub mod reader;
pub mod slice;

use alloc::string::String;

use thiserror::Error;

use crate::sans::{
    check::CrcMismatch,
    cursor::Truncated,
    data::DecodedField,
    definition::DefinitionError,
    header::HeaderError,
    stream::StreamError,
};

#[cfg(feature = "std")]
pub use reader::decode as decode_reader;
pub use slice::{decode as decode_slice, decode_with as decode_slice_with};

/// Errors occurring while decoding a document.
///
/// Every error is terminal: no partially decoded output accompanies it.
#[derive(Debug, Error)]
pub enum Error {
    /// The document header is not a usable FIT header. Header CRC failures
    /// are reported as [`Error::CrcMismatch`].
    #[error("Malformed file header: {0}")]
    MalformedHeader(HeaderError),
    /// A read would pass the end of the declared data.
    #[error("Truncated stream: {0}")]
    TruncatedStream(#[from] Truncated),
    /// A data message referenced a local type with no prior definition.
    #[error("Data message for undefined local type {0}.")]
    UndefinedLocalType(u8),
    /// A definition declared an unknown base type.
    #[error("Field {field} has unsupported base type {code:#04x}.")]
    UnsupportedBaseType { field: u8, code: u8 },
    /// Calculated and found CRC values do not match, for either the header
    /// or the whole document.
    #[error("Calculated ({calculated}) and found ({found}) CRC values do not match.")]
    CrcMismatch { found: u16, calculated: u16 },
    /// The document decoded but holds no activity.
    #[error("No activity or session message found.")]
    NoActivityMessage,
    /// An error from the supplied reader.
    #[error(transparent)]
    IoFailure(#[from] IoError),
}

/// Error type of the reader-based decoder; uninhabited without `std`.
#[cfg(feature = "std")]
pub type IoError = std::io::Error;
#[cfg(not(feature = "std"))]
pub type IoError = core::convert::Infallible;

impl From<HeaderError> for Error {
    fn from(err: HeaderError) -> Self {
        match err {
            HeaderError::CyclicRedundancyCheck { found, calculated } => {
                Self::CrcMismatch { found, calculated }
            }
            err => Self::MalformedHeader(err),
        }
    }
}

impl From<CrcMismatch> for Error {
    fn from(CrcMismatch { found, calculated }: CrcMismatch) -> Self {
        Self::CrcMismatch { found, calculated }
    }
}

impl From<DefinitionError> for Error {
    fn from(err: DefinitionError) -> Self {
        match err {
            DefinitionError::Truncated(err) => Self::TruncatedStream(err),
            DefinitionError::UnsupportedBaseType { field, code } => {
                Self::UnsupportedBaseType { field, code }
            }
        }
    }
}

impl From<StreamError> for Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Truncated(err) => Self::TruncatedStream(err),
            StreamError::UndefinedLocalType(local) => Self::UndefinedLocalType(local),
            StreamError::Definition(err) => err.into(),
        }
    }
}

/// How to treat a CRC that does not match the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrcPolicy {
    /// Fail the decode.
    #[default]
    Strict,
    /// Log a warning and continue.
    Lenient,
}

/// Run-time decoding options. The default is strict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Applies to both the header CRC and the file CRC.
    pub crc: CrcPolicy,
    /// Whether [`crate::activity::decode_activity_with`] fails when the
    /// document lacks an activity message or a session.
    pub require_activity: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            crc: CrcPolicy::Strict,
            require_activity: true,
        }
    }
}

impl DecodeOptions {
    pub fn lenient() -> Self {
        Self {
            crc: CrcPolicy::Lenient,
            ..Self::default()
        }
    }
}

/// Derive [`FromRecords`] for a struct holding a collection of records.
///
/// # Example
///
/// To collect a single record, add the `record(N)` attribute to an `Option<T>`
/// struct field, where `N` is the global message number and `T` is a type
/// implementing [`FromRecord`] and [`Default`]. Additional records received
/// for the same message number will overwrite earlier ones. To collect
/// multiple occurrences of a record, apply the attribute to a `Vec<T>`
/// instead.
///
/// ```
/// #[derive(Debug, Default, FromRecords)]
/// struct Rides {
///     #[record(0)]
///     file_id: Option<FileId>,
///     #[record(20)]
///     records: Vec<Record>,
/// }
/// ```
pub use freewheel_derive::FromRecords;

/// Produce record receivers for a document.
///
/// Messages for which no receiver is returned are skipped.
pub trait FromRecords {
    /// Retrieve a receiver for a message, if one exists.
    fn add_record(&mut self, global: u16) -> Option<&mut dyn FromRecord>;
}

/// Derive [`FromRecord`] for a struct representing a single record.
///
/// # Examples
///
/// To receive a single value for a field, add the `field(N)` attribute to an
/// `Option<T>` struct field, where `N` is the field number and `T`
/// implements [`FromField`]. Floating point targets receive scaled values;
/// integer targets receive raw values. Fields holding their 'invalid'
/// marker are skipped, and later values replace earlier ones.
///
/// ```
/// #[derive(Debug, Default, FromRecord)]
/// struct Record {
///     #[field(253)]
///     timestamp: Option<Timestamp>,
///     #[field(0)]
///     position_lat: Option<i32>,
///     #[field(2)]
///     altitude: Option<f64>,
/// }
/// ```
///
/// To receive arrays or arbitrary types, supply a two-argument handler
/// closure. The first argument is the struct field, the second the
/// [`DecodedField`].
///
/// ```
/// #[derive(Debug, Default, FromRecord)]
/// struct Hrv {
///     #[field(0, |times, f| times.extend(f.scaled()))]
///     times: Vec<f64>,
/// }
/// ```
pub use freewheel_derive::FromRecord;

/// Receive decoded fields for a record.
///
/// Fields arrive in definition order. Array fields arrive element by
/// element, and the timestamp expanded from a compressed timestamp header
/// arrives first, as field 253.
pub trait FromRecord {
    /// Add a field to the record. The default implementation ignores it.
    fn add_field(&mut self, field: &DecodedField) {
        let _ = field;
    }
}

/// Conversion from a decoded field into a Rust value.
pub trait FromField: Sized {
    /// Convert, or return `None` if the field is invalid or of another kind.
    fn from_field(field: &DecodedField) -> Option<Self>;
}

impl FromField for f64 {
    fn from_field(field: &DecodedField) -> Option<Self> {
        field.scaled()
    }
}

impl FromField for f32 {
    fn from_field(field: &DecodedField) -> Option<Self> {
        field.scaled().map(|x| x as f32)
    }
}

macro_rules! from_field_integer {
    ($($t:ty),*) => {
        $(
            impl FromField for $t {
                fn from_field(field: &DecodedField) -> Option<Self> {
                    field.integer()?.try_into().ok()
                }
            }
        )*
    };
}

from_field_integer!(u8, u16, u32, u64, i8, i16, i32, i64);

impl FromField for String {
    fn from_field(field: &DecodedField) -> Option<Self> {
        field.text().map(String::from)
    }
}
