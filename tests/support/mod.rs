#![allow(dead_code)]

//! Builder for synthetic FIT documents.

use freewheel::sans::check::compute_crc;

pub const ENUM: u8 = 0x00;
pub const SINT8: u8 = 0x01;
pub const UINT8: u8 = 0x02;
pub const SINT16: u8 = 0x83;
pub const UINT16: u8 = 0x84;
pub const SINT32: u8 = 0x85;
pub const UINT32: u8 = 0x86;
pub const STRING: u8 = 0x07;
pub const FLOAT32: u8 = 0x88;
pub const FLOAT64: u8 = 0x89;
pub const UINT8Z: u8 = 0x0A;
pub const UINT16Z: u8 = 0x8B;
pub const UINT32Z: u8 = 0x8C;
pub const BYTE: u8 = 0x0D;
pub const SINT64: u8 = 0x8E;
pub const UINT64: u8 = 0x8F;
pub const UINT64Z: u8 = 0x90;

pub use freewheel::profile::mesg::{
    ACTIVITY, DEVICE_INFO, EVENT, FILE_ID, LAP, RECORD, SESSION,
};

/// Accumulates record bytes and wraps them in a header and CRC.
#[derive(Debug, Clone)]
pub struct FitBuilder {
    body: Vec<u8>,
    extended: bool,
    protocol: u8,
}

impl Default for FitBuilder {
    fn default() -> Self {
        Self {
            body: Vec::new(),
            extended: true,
            protocol: 0x20,
        }
    }
}

impl FitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a 12-byte header without a header CRC.
    pub fn short_header(mut self) -> Self {
        self.extended = false;
        self
    }

    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = protocol;
        self
    }

    /// Little-endian definition of `(field, size, base type)` triples.
    pub fn definition(self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> Self {
        self.definition_full(local, global, false, fields, &[])
    }

    /// Big-endian definition.
    pub fn definition_be(self, local: u8, global: u16, fields: &[(u8, u8, u8)]) -> Self {
        self.definition_full(local, global, true, fields, &[])
    }

    /// Definition carrying developer `(field, size, developer index)` triples.
    pub fn definition_dev(
        self,
        local: u8,
        global: u16,
        fields: &[(u8, u8, u8)],
        developer: &[(u8, u8, u8)],
    ) -> Self {
        self.definition_full(local, global, false, fields, developer)
    }

    fn definition_full(
        mut self,
        local: u8,
        global: u16,
        big_endian: bool,
        fields: &[(u8, u8, u8)],
        developer: &[(u8, u8, u8)],
    ) -> Self {
        let flag = if developer.is_empty() { 0 } else { 0x20 };
        self.body.push(0x40 | flag | (local & 0x0F));
        self.body.push(0);
        self.body.push(big_endian as u8);
        if big_endian {
            self.body.extend(global.to_be_bytes());
        } else {
            self.body.extend(global.to_le_bytes());
        }
        self.body.push(fields.len() as u8);
        for (n, s, t) in fields {
            self.body.extend([*n, *s, *t]);
        }
        if !developer.is_empty() {
            self.body.push(developer.len() as u8);
            for (n, s, i) in developer {
                self.body.extend([*n, *s, *i]);
            }
        }
        self
    }

    /// Data message with a normal header.
    pub fn data(mut self, local: u8, bytes: &[u8]) -> Self {
        self.body.push(local & 0x0F);
        self.body.extend_from_slice(bytes);
        self
    }

    /// Data message with a compressed timestamp header.
    pub fn compressed(mut self, local: u8, offset: u8, bytes: &[u8]) -> Self {
        self.body.push(0x80 | ((local & 0x03) << 5) | (offset & 0x1F));
        self.body.extend_from_slice(bytes);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Append a session and an activity message, as every activity file has.
    pub fn with_activity(self, timestamp: u32, local_offset: i32) -> Self {
        let local = timestamp.wrapping_add_signed(local_offset);
        self.definition(14, SESSION, &[(253, 4, UINT32), (9, 4, UINT32)])
            .data(14, &cat(&[&timestamp.to_le_bytes(), &500_000u32.to_le_bytes()]))
            .definition(15, ACTIVITY, &[(253, 4, UINT32), (1, 2, UINT16), (5, 4, UINT32)])
            .data(
                15,
                &cat(&[&timestamp.to_le_bytes(), &1u16.to_le_bytes(), &local.to_le_bytes()]),
            )
    }

    pub fn header_len(&self) -> usize {
        if self.extended { 14 } else { 12 }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(self.header_len() as u8);
        out.push(self.protocol);
        out.extend(2132u16.to_le_bytes());
        out.extend((self.body.len() as u32).to_le_bytes());
        out.extend(b".FIT");
        if self.extended {
            let crc = compute_crc(0, &out);
            out.extend(crc.to_le_bytes());
        }
        out.extend_from_slice(&self.body);
        let crc = compute_crc(0, &out);
        out.extend(crc.to_le_bytes());
        out
    }
}

/// Offsets whose corruption only a CRC can detect: everything except the
/// header length byte and the `.FIT` marker.
pub fn crc_covered(len: usize) -> impl Iterator<Item = usize> {
    (1..8).chain(12..len)
}

/// Concatenate byte slices.
pub fn cat(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}
