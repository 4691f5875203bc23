//! Pull-based decoder over the record section of a document.

use alloc::vec::Vec;

use either::Either::{Left, Right};
use thiserror::Error;
use tracing::trace;

use crate::profile;

use super::{
    cursor::{Cursor, Truncated},
    data::{DecodedField, Scaling, Value, decode_field},
    definition::{BaseType, DefinitionError, MessageDefinition, Registry},
    header::{DataHeader, parse_record_header},
};

/// An error decoding the record section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error(transparent)]
    Truncated(#[from] Truncated),
    /// A data message referenced a local type with no active definition.
    #[error("Data message for undefined local type {0}.")]
    UndefinedLocalType(u8),
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Running absolute timestamp used to expand compressed timestamp headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeBase(u32);

impl TimeBase {
    /// Record an absolute timestamp.
    pub fn set(&mut self, timestamp: u32) {
        self.0 = timestamp;
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Expand a five-bit offset against the base, rolling over when the
    /// offset is below the base's low five bits, then advance the base.
    pub fn expand(&mut self, offset: u8) -> u32 {
        let offset = u32::from(offset & 0x1F);
        let mut next = (self.0 & !0x1F).wrapping_add(offset);

        if offset < (self.0 & 0x1F) {
            next = next.wrapping_add(0x20);
        }

        self.0 = next;
        next
    }
}

/// Decodes messages one at a time from the record section.
///
/// Definition messages are absorbed into the stream's [`Registry`]; only
/// data messages are surfaced to the caller.
#[derive(Debug)]
pub struct MessageStream<'a> {
    cursor: Cursor<'a>,
    registry: Registry,
    time: TimeBase,
}

impl<'a> MessageStream<'a> {
    /// Begin decoding at the cursor's position, reading until its limit.
    pub fn new(cursor: Cursor<'a>) -> Self {
        Self {
            cursor,
            registry: Registry::new(),
            time: TimeBase::default(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The most recent absolute timestamp seen.
    pub fn time_base(&self) -> u32 {
        self.time.get()
    }

    /// Decode up to and including the next data message.
    ///
    /// Replaces the contents of `fields` with the message's fields and
    /// returns its global message number, or `None` once the record section
    /// is exhausted.
    pub fn next_message(
        &mut self,
        fields: &mut Vec<DecodedField>,
    ) -> Result<Option<u16>, StreamError> {
        while !self.cursor.is_exhausted() {
            match parse_record_header(self.cursor.u8()?) {
                Left(header) => {
                    let definition = MessageDefinition::parse(header, &mut self.cursor)?;
                    self.registry.insert(definition);
                }
                Right(header) => return self.decode_data(header, fields).map(Some),
            }
        }

        Ok(None)
    }

    fn decode_data(
        &mut self,
        header: DataHeader,
        fields: &mut Vec<DecodedField>,
    ) -> Result<u16, StreamError> {
        let definition = self
            .registry
            .get(header.local)
            .ok_or(StreamError::UndefinedLocalType(header.local))?;

        let global = definition.global;
        fields.clear();

        if let Some(offset) = header.time_offset {
            let timestamp = self.time.expand(offset);
            fields.push(DecodedField {
                number: profile::TIMESTAMP,
                base_type: BaseType::Uint32,
                value: Value::U32(timestamp),
                scaling: Scaling::IDENTITY,
                invalid: false,
            });
        }

        for field in &definition.fields {
            let scaling = profile::scaling(global, field.number);
            decode_field(
                &mut self.cursor,
                field,
                definition.architecture,
                scaling,
                fields,
            )?;
        }

        let developer_size = definition.developer_fields.iter().map(|f| f.size as usize);
        self.cursor.skip(developer_size.sum())?;

        if header.time_offset.is_none() {
            let timestamp = fields
                .iter()
                .filter(|f| f.number == profile::TIMESTAMP)
                .find_map(|f| f.integer());

            if let Some(timestamp) = timestamp.and_then(|t| u32::try_from(t).ok()) {
                self.time.set(timestamp);
            }
        }

        trace!(local = header.local, global, fields = fields.len(), "decoded data message");

        Ok(global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_above_base_do_not_roll_over() {
        let mut time = TimeBase::default();
        time.set(64 + 3);
        assert_eq!(time.expand(10), 64 + 10);
        assert_eq!(time.get(), 64 + 10);
    }

    #[test]
    fn offsets_below_base_roll_over() {
        let t = 1_000_000_030;
        assert_eq!(t % 32, 30);

        let mut time = TimeBase::default();
        time.set(t);
        assert_eq!(time.expand(5), t - 30 + 32 + 5);
    }

    #[test]
    fn stream_tracks_definitions_and_time() {
        let bytes = [
            // local 0: record with timestamp and distance
            0x40, 0, 0, 20, 0, 2, 253, 4, 0x86, 5, 4, 0x86,
            0x00, 0xE8, 0x03, 0, 0, 5, 0, 0, 0,
            // local 1: record with distance and a two-byte developer field
            0x61, 0, 0, 20, 0, 1, 5, 4, 0x86, 1, 0, 2, 0,
            0x01, 6, 0, 0, 0, 0xAA, 0xBB,
        ];

        let mut stream = MessageStream::new(Cursor::new(&bytes));
        let mut fields = Vec::new();

        assert_eq!(stream.next_message(&mut fields), Ok(Some(20)));
        assert_eq!(stream.time_base(), 1000);
        assert_eq!(stream.registry().get(0).map(|d| d.data_size()), Some(8));

        assert_eq!(stream.next_message(&mut fields), Ok(Some(20)));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].integer(), Some(6));
        assert_eq!(stream.registry().get(1).map(|d| d.data_size()), Some(6));
        assert_eq!(stream.time_base(), 1000);

        assert_eq!(stream.next_message(&mut fields), Ok(None));
    }

    #[test]
    fn equal_offset_keeps_time() {
        let mut time = TimeBase::default();
        time.set(100);
        assert_eq!(time.expand((100 % 32) as u8), 100);
    }
}
