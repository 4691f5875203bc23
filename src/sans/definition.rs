//! Definition messages and the per-session table of active definitions.

use alloc::vec::Vec;

use thiserror::Error;
use tracing::{trace, warn};
use zerocopy::FromBytes;

use super::{cursor::Cursor, cursor::Truncated, header::DefinitionHeader};

/// An error decoding a definition message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error(transparent)]
    Truncated(#[from] Truncated),
    /// A field declared a base type this decoder does not know.
    #[error("Field {field} has unsupported base type {code:#04x}.")]
    UnsupportedBaseType { field: u8, code: u8 },
}

/// Byte order of multi-byte values in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Architecture {
    #[default]
    LittleEndian,
    BigEndian,
}

/// A FIT base type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Enum,
    Sint8,
    Uint8,
    Sint16,
    Uint16,
    Sint32,
    Uint32,
    String,
    Float32,
    Float64,
    Uint8z,
    Uint16z,
    Uint32z,
    Byte,
    Sint64,
    Uint64,
    Uint64z,
}

impl BaseType {
    /// Look up a base type by its definition byte.
    ///
    /// Only the low five bits (the base type number) are significant; the
    /// endian-ability flag in bit 7 is implied by the type.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code & 0x1F {
            0x00 => Self::Enum,
            0x01 => Self::Sint8,
            0x02 => Self::Uint8,
            0x03 => Self::Sint16,
            0x04 => Self::Uint16,
            0x05 => Self::Sint32,
            0x06 => Self::Uint32,
            0x07 => Self::String,
            0x08 => Self::Float32,
            0x09 => Self::Float64,
            0x0A => Self::Uint8z,
            0x0B => Self::Uint16z,
            0x0C => Self::Uint32z,
            0x0D => Self::Byte,
            0x0E => Self::Sint64,
            0x0F => Self::Uint64,
            0x10 => Self::Uint64z,
            _ => return None,
        })
    }

    /// Natural width of one element in bytes.
    pub const fn width(self) -> u8 {
        match self {
            Self::Enum | Self::Sint8 | Self::Uint8 | Self::Uint8z => 1,
            Self::String | Self::Byte => 1,
            Self::Sint16 | Self::Uint16 | Self::Uint16z => 2,
            Self::Sint32 | Self::Uint32 | Self::Uint32z | Self::Float32 => 4,
            Self::Float64 | Self::Sint64 | Self::Uint64 | Self::Uint64z => 8,
        }
    }

    /// Whether a multi-byte field of this type is read as one value rather
    /// than as an array of elements.
    pub const fn is_opaque(self) -> bool {
        matches!(self, Self::String | Self::Byte)
    }
}

/// Layout of one field within a data message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    pub number: u8,
    /// Total size in bytes, always a multiple of the base type's width.
    pub size: u8,
    pub base_type: BaseType,
}

impl FieldDefinition {
    /// Build a definition, reinterpreting a size that is not a multiple of
    /// the base type's width as a byte array.
    pub fn new(number: u8, size: u8, base_type: BaseType) -> Self {
        let width = base_type.width();

        let base_type = if size % width != 0 {
            warn!(field = number, size, ?base_type, "field size is not a multiple of its base type");
            BaseType::Byte
        } else {
            base_type
        };

        Self {
            number,
            size,
            base_type,
        }
    }

    /// Number of elements stored in this field.
    pub fn count(&self) -> u8 {
        if self.base_type.is_opaque() {
            1
        } else {
            self.size / self.base_type.width()
        }
    }
}

/// Layout of one developer field. The payload is skipped when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeveloperFieldDefinition {
    pub number: u8,
    pub size: u8,
    pub developer_index: u8,
}

/// The layout established by a definition message for one local type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDefinition {
    pub local: u8,
    pub global: u16,
    pub architecture: Architecture,
    pub fields: Vec<FieldDefinition>,
    pub developer_fields: Vec<DeveloperFieldDefinition>,
}

#[repr(C, packed)]
#[derive(FromBytes)]
struct DefinitionPrefix {
    _reserved: u8,
    architecture: u8,
    global_message: [u8; 2],
    field_count: u8,
}

#[repr(C, packed)]
#[derive(FromBytes)]
struct FieldTriple {
    field: u8,
    size: u8,
    base_type: u8,
}

impl MessageDefinition {
    /// Decode the body of a definition message, the record header having
    /// been consumed already.
    pub fn parse(header: DefinitionHeader, c: &mut Cursor) -> Result<Self, DefinitionError> {
        let DefinitionPrefix {
            architecture,
            global_message,
            field_count,
            ..
        } = zerocopy::transmute!(c.take::<5>()?);

        let architecture = if architecture == 0 {
            Architecture::LittleEndian
        } else {
            Architecture::BigEndian
        };

        let global = match architecture {
            Architecture::LittleEndian => u16::from_le_bytes(global_message),
            Architecture::BigEndian => u16::from_be_bytes(global_message),
        };

        let fields = (0..field_count)
            .map(|_| {
                let FieldTriple {
                    field,
                    size,
                    base_type,
                } = zerocopy::transmute!(c.take::<3>()?);

                let base_type = BaseType::from_code(base_type).ok_or(
                    DefinitionError::UnsupportedBaseType {
                        field,
                        code: base_type,
                    },
                )?;

                Ok(FieldDefinition::new(field, size, base_type))
            })
            .collect::<Result<Vec<_>, DefinitionError>>()?;

        let developer_fields = if header.has_developer_fields {
            let count = c.u8()?;
            (0..count)
                .map(|_| {
                    let FieldTriple {
                        field,
                        size,
                        base_type,
                    } = zerocopy::transmute!(c.take::<3>()?);

                    Ok(DeveloperFieldDefinition {
                        number: field,
                        size,
                        developer_index: base_type,
                    })
                })
                .collect::<Result<Vec<_>, Truncated>>()?
        } else {
            Vec::new()
        };

        Ok(Self {
            local: header.local,
            global,
            architecture,
            fields,
            developer_fields,
        })
    }

    /// Total size in bytes of a data message using this definition,
    /// excluding the record header.
    pub fn data_size(&self) -> usize {
        let fields = self.fields.iter().map(|f| f.size as usize);
        let developer = self.developer_fields.iter().map(|f| f.size as usize);
        fields.chain(developer).sum()
    }
}

/// Number of local message types addressable by a normal record header.
pub const LOCAL_TYPES: usize = 16;

/// Active definitions for each local message type within one document.
///
/// A registry belongs to exactly one decode; it is never shared.
#[derive(Debug, Default)]
pub struct Registry {
    definitions: [Option<MessageDefinition>; LOCAL_TYPES],
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a definition, replacing any earlier one for the same local
    /// type wholesale.
    pub fn insert(&mut self, definition: MessageDefinition) {
        trace!(
            local = definition.local,
            global = definition.global,
            fields = definition.fields.len(),
            developer_fields = definition.developer_fields.len(),
            "registered definition"
        );

        let slot = definition.local as usize % LOCAL_TYPES;
        self.definitions[slot] = Some(definition);
    }

    pub fn get(&self, local: u8) -> Option<&MessageDefinition> {
        self.definitions.get(local as usize)?.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sans::header::DefinitionHeader;

    const NORMAL: DefinitionHeader = DefinitionHeader {
        local: 2,
        has_developer_fields: false,
    };

    #[test]
    fn parses_big_endian_global_number() {
        let bytes = [0, 1, 0x00, 0x14, 1, 253, 4, 0x86];
        let d = MessageDefinition::parse(NORMAL, &mut Cursor::new(&bytes)).unwrap();
        assert_eq!(d.global, 20);
        assert_eq!(d.architecture, Architecture::BigEndian);
        assert_eq!(
            d.fields,
            [FieldDefinition {
                number: 253,
                size: 4,
                base_type: BaseType::Uint32
            }]
        );
    }

    #[test]
    fn unknown_base_type_fails() {
        let bytes = [0, 0, 20, 0, 1, 3, 1, 0x1F];
        assert_eq!(
            MessageDefinition::parse(NORMAL, &mut Cursor::new(&bytes)),
            Err(DefinitionError::UnsupportedBaseType {
                field: 3,
                code: 0x1F
            })
        );
    }

    #[test]
    fn misaligned_size_becomes_bytes() {
        let f = FieldDefinition::new(7, 3, BaseType::Uint16);
        assert_eq!(f.base_type, BaseType::Byte);
        assert_eq!(f.count(), 1);
        assert_eq!(FieldDefinition::new(7, 6, BaseType::Uint16).count(), 3);
    }

    #[test]
    fn registry_replaces_wholesale() {
        let mut registry = Registry::new();
        assert!(registry.get(2).is_none());

        let first = [0, 0, 20, 0, 2, 253, 4, 0x86, 5, 4, 0x86];
        let second = [0, 0, 19, 0, 0];
        registry.insert(MessageDefinition::parse(NORMAL, &mut Cursor::new(&first)).unwrap());
        registry.insert(MessageDefinition::parse(NORMAL, &mut Cursor::new(&second)).unwrap());

        let d = registry.get(2).unwrap();
        assert_eq!(d.global, 19);
        assert!(d.fields.is_empty());
        assert!(registry.get(16).is_none());
    }
}
