#![no_std]

//! A decoder for Garmin's Flexible and Interoperable Data Transfer activity
//! files.
//!
//! Freewheel turns a complete in-memory FIT document into typed records,
//! laps, and sessions. It performs no file I/O of its own.
//!
//! Most users should begin with [`decode_activity`], which returns an
//! [`ActivityFile`]. To decode into other shapes, implement or derive the
//! receiver traits in the [`avec`] module. Applications needing access to
//! raw definitions and field values can drive the building blocks in the
//! [`sans`] module directly.
//!
//! The [`columns`] module flattens a decoded activity into fixed-capacity
//! columns with NaN marking absent values, for consumers that plot or
//! export.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `std`: enable the reader-based decoder and `std` logging support
//!   (default).

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

// Lets derive expansions name `::freewheel` from inside this crate.
extern crate self as freewheel;

pub mod activity;
pub mod avec;
pub mod columns;
pub mod profile;
pub mod sans;

pub use activity::{ActivityFile, decode_activity, decode_activity_with};
pub use avec::{DecodeOptions, Error};
