//! Document and record headers.

use either::Either::{self, Left, Right};
use tartan_bitfield::bitfield;
use thiserror::Error;
use zerocopy::FromBytes;

use super::check::compute_crc;

/// Highest supported protocol major version.
const PROTOCOL_MAJOR_MAX: u8 = 2;

/// An error decoding a document header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// Incorrect filetype marker.
    #[error("Incorrect file type marker.")]
    NotFitData,
    /// Unknown header length.
    #[error("Unknown header length ({0}).")]
    UnknownHeaderLength(u8),
    /// Protocol major version newer than this decoder understands.
    #[error("Unsupported protocol version ({0}.{1}).")]
    UnsupportedProtocol(u8, u8),
    /// Calculated and found header CRC values do not match.
    #[error("Calculated ({calculated}) and found ({found}) header CRC values do not match.")]
    CyclicRedundancyCheck { found: u16, calculated: u16 },
}

/// A parsed document header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitHeader {
    /// Header length in bytes, 12 or 14.
    pub header_size: u8,
    pub protocol_version: u8,
    pub profile_version: u16,
    /// Number of record bytes following the header.
    pub data_size: u32,
    pub data_type: [u8; 4],
    /// Header CRC, present in 14-byte headers only. Zero means not computed.
    pub crc: Option<u16>,
}

#[repr(C, packed)]
#[derive(FromBytes)]
struct RawHeader {
    header_size: u8,
    protocol_version: u8,
    profile_version: [u8; 2],
    data_size: [u8; 4],
    data_type: [u8; 4],
}

impl FitHeader {
    /// Decode the first 12 bytes of a document, checking its marker and
    /// length.
    ///
    /// For 14-byte headers the CRC is still unread; follow up with
    /// [`FitHeader::with_crc`]. The protocol version is checked separately
    /// by [`FitHeader::check_protocol`], once the bytes are known intact.
    pub fn parse(r: [u8; 12]) -> Result<Self, HeaderError> {
        let RawHeader {
            header_size,
            protocol_version,
            profile_version,
            data_size,
            data_type,
        } = zerocopy::transmute!(r);

        if &data_type != b".FIT" {
            Err(HeaderError::NotFitData)?;
        }

        if !matches!(header_size, 12 | 14) {
            Err(HeaderError::UnknownHeaderLength(header_size))?;
        }

        Ok(Self {
            header_size,
            protocol_version,
            profile_version: u16::from_le_bytes(profile_version),
            data_size: u32::from_le_bytes(data_size),
            data_type,
            crc: None,
        })
    }

    /// Whether two more header bytes (the header CRC) follow the first 12.
    pub fn is_extended(&self) -> bool {
        self.header_size == 14
    }

    /// Attach the header CRC of an extended header, verifying it against the
    /// first 12 header bytes unless it is zero.
    pub fn with_crc(mut self, r: [u8; 2], prefix: &[u8; 12]) -> Result<Self, HeaderError> {
        let found = u16::from_le_bytes(r);
        self.crc = Some(found);

        if found != 0 {
            let calculated = compute_crc(0, prefix);
            if found != calculated {
                Err(HeaderError::CyclicRedundancyCheck { found, calculated })?;
            }
        }

        Ok(self)
    }

    /// Reject protocol major versions newer than this decoder understands.
    pub fn check_protocol(&self) -> Result<(), HeaderError> {
        let (major, minor) = (self.protocol_version >> 4, self.protocol_version & 0x0F);
        if major > PROTOCOL_MAJOR_MAX {
            Err(HeaderError::UnsupportedProtocol(major, minor))?;
        }

        Ok(())
    }

    /// Offset of the first byte after the record section.
    pub fn data_end(&self) -> usize {
        self.header_size as usize + self.data_size as usize
    }
}

/// Header of a definition message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefinitionHeader {
    pub local: u8,
    pub has_developer_fields: bool,
}

/// Header of a data message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHeader {
    pub local: u8,
    /// Five-bit seconds offset carried by a compressed timestamp header.
    pub time_offset: Option<u8>,
}

/// Classify a record header byte as either a definition or data message.
pub fn parse_record_header(r: u8) -> Either<DefinitionHeader, DataHeader> {
    bitfield! {
        struct RecordHeader(u8) {
            [7] is_compressed,
        }
    }

    if RecordHeader(r).is_compressed() {
        bitfield! {
            struct CompressedHeader(u8) {
                [0..5] time_offset: u8,
                [5..7] local_message: u8,
            }
        }

        let header = CompressedHeader(r);

        Right(DataHeader {
            local: header.local_message(),
            time_offset: Some(header.time_offset()),
        })
    } else {
        bitfield! {
            struct NormalHeader(u8) {
                [0..4] local_message: u8,
                [5] is_developer,
                [6] is_definition,
            }
        }

        let header = NormalHeader(r);

        if header.is_definition() {
            Left(DefinitionHeader {
                local: header.local_message(),
                has_developer_fields: header.is_developer(),
            })
        } else {
            Right(DataHeader {
                local: header.local_message(),
                time_offset: None,
            })
        }
    }
}
