//! Field values of data messages.

use alloc::{string::String, vec::Vec};

use super::{
    cursor::{Cursor, Truncated},
    definition::{Architecture, BaseType, FieldDefinition},
};

/// A raw field value, as stored in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// The value as a signed integer, for integral base types.
    pub fn as_i64(&self) -> Option<i64> {
        Some(match *self {
            Self::U8(x) => x.into(),
            Self::I8(x) => x.into(),
            Self::U16(x) => x.into(),
            Self::I16(x) => x.into(),
            Self::U32(x) => x.into(),
            Self::I32(x) => x.into(),
            Self::U64(x) => i64::try_from(x).ok()?,
            Self::I64(x) => x,
            _ => return None,
        })
    }

    /// The value as a float, for numeric base types.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F32(x) => Some(x.into()),
            Self::F64(x) => Some(x),
            Self::U64(x) => Some(x as f64),
            Self::I64(x) => Some(x as f64),
            _ => self.as_i64().map(|x| x as f64),
        }
    }
}

/// Linear transform from a raw value to physical units:
/// `value = raw / scale - offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub scale: f64,
    pub offset: f64,
}

impl Scaling {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: 0.0,
    };

    pub const fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    pub fn apply(self, raw: f64) -> f64 {
        raw / self.scale - self.offset
    }
}

impl Default for Scaling {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One decoded element of a data message field.
///
/// Array fields produce one `DecodedField` per element, all sharing the
/// field number.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    pub number: u8,
    pub base_type: BaseType,
    pub value: Value,
    pub scaling: Scaling,
    /// The raw value equals its base type's 'invalid' marker.
    pub invalid: bool,
}

impl DecodedField {
    /// The scaled numeric value, or `None` if invalid or non-numeric.
    pub fn scaled(&self) -> Option<f64> {
        if self.invalid {
            return None;
        }

        self.value.as_f64().map(|raw| self.scaling.apply(raw))
    }

    /// The raw integer value, or `None` if invalid or non-integral.
    pub fn integer(&self) -> Option<i64> {
        if self.invalid {
            return None;
        }

        self.value.as_i64()
    }

    /// The string value, or `None` if invalid or not a string.
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) if !self.invalid => Some(s),
            _ => None,
        }
    }

    /// The raw bytes of a byte-array field, or `None` if invalid.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Bytes(b) if !self.invalid => Some(b),
            _ => None,
        }
    }
}

trait FieldInner {
    /// The data storing this base type.
    type From;

    /// Convert data of this base type to a value, and whether it held the
    /// 'invalid' marker.
    fn from(r: Self::From, arch: Architecture) -> (Value, bool);
}

macro_rules! field_inner {
    ($t:ident, $into:ident, $variant:ident, $is_invalid:expr, $(#[$attr:meta])*) => {
        $(#[$attr])*
        enum $t {}

        impl FieldInner for $t {
            type From = [u8; size_of::<$into>()];

            fn from(r: Self::From, arch: Architecture) -> (Value, bool) {
                let x = match arch {
                    Architecture::LittleEndian => $into::from_le_bytes(r),
                    Architecture::BigEndian => $into::from_be_bytes(r),
                };

                let is_invalid: fn($into) -> bool = $is_invalid;
                (Value::$variant(x), is_invalid(x))
            }
        }
    };
}

field_inner!(U8, u8, U8, |x| x == u8::MAX, /** `uint8`, `enum` */);
field_inner!(U8Z, u8, U8, |x| x == 0, /** `uint8z` */);
field_inner!(U16, u16, U16, |x| x == u16::MAX, /** `uint16` */);
field_inner!(U16Z, u16, U16, |x| x == 0, /** `uint16z` */);
field_inner!(U32, u32, U32, |x| x == u32::MAX, /** `uint32` */);
field_inner!(U32Z, u32, U32, |x| x == 0, /** `uint32z` */);
field_inner!(U64, u64, U64, |x| x == u64::MAX, /** `uint64` */);
field_inner!(U64Z, u64, U64, |x| x == 0, /** `uint64z` */);

field_inner!(I8, i8, I8, |x| x == i8::MAX, /** `sint8` */);
field_inner!(I16, i16, I16, |x| x == i16::MAX, /** `sint16` */);
field_inner!(I32, i32, I32, |x| x == i32::MAX, /** `sint32` */);
field_inner!(I64, i64, I64, |x| x == i64::MAX, /** `sint64` */);

field_inner!(F32, f32, F32, |x| x.is_nan(), /** `float32` */);
field_inner!(F64, f64, F64, |x| x.is_nan(), /** `float64` */);

/// Reads one element of a numeric base type.
type ElementDecoder = fn(&mut Cursor, Architecture) -> Result<(Value, bool), Truncated>;

fn element<T: FieldInner<From = [u8; N]>, const N: usize>(
    c: &mut Cursor,
    arch: Architecture,
) -> Result<(Value, bool), Truncated> {
    Ok(T::from(c.take()?, arch))
}

/// Read every element of a field, appending to `out`.
///
/// The same scaling is attached to each element; it is only applied when
/// the value is read through [`DecodedField::scaled`].
pub fn decode_field(
    c: &mut Cursor,
    definition: &FieldDefinition,
    arch: Architecture,
    scaling: Scaling,
    out: &mut Vec<DecodedField>,
) -> Result<(), Truncated> {
    let FieldDefinition {
        number,
        size,
        base_type,
    } = *definition;

    let mut push = |(value, invalid): (Value, bool)| {
        out.push(DecodedField {
            number,
            base_type,
            value,
            scaling,
            invalid,
        })
    };

    let element: ElementDecoder = match base_type {
        BaseType::String => {
            let r = c.take_slice(size as usize)?;
            let end = r.iter().position(|b| *b == 0).unwrap_or(r.len());
            let s = String::from_utf8_lossy(&r[..end]).into_owned();
            push((Value::String(s), end == 0));
            return Ok(());
        }
        BaseType::Byte => {
            let r = c.take_slice(size as usize)?;
            let invalid = r.iter().all(|b| *b == 0xFF);
            push((Value::Bytes(r.to_vec()), invalid));
            return Ok(());
        }

        BaseType::Enum | BaseType::Uint8 => element::<U8, 1>,
        BaseType::Uint8z => element::<U8Z, 1>,
        BaseType::Uint16 => element::<U16, 2>,
        BaseType::Uint16z => element::<U16Z, 2>,
        BaseType::Uint32 => element::<U32, 4>,
        BaseType::Uint32z => element::<U32Z, 4>,
        BaseType::Uint64 => element::<U64, 8>,
        BaseType::Uint64z => element::<U64Z, 8>,

        BaseType::Sint8 => element::<I8, 1>,
        BaseType::Sint16 => element::<I16, 2>,
        BaseType::Sint32 => element::<I32, 4>,
        BaseType::Sint64 => element::<I64, 8>,

        BaseType::Float32 => element::<F32, 4>,
        BaseType::Float64 => element::<F64, 8>,
    };

    for _ in 0..definition.count() {
        push(element(c, arch)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8], def: FieldDefinition, arch: Architecture) -> Vec<DecodedField> {
        let mut out = Vec::new();
        decode_field(&mut Cursor::new(bytes), &def, arch, Scaling::IDENTITY, &mut out).unwrap();
        out
    }

    #[test]
    fn sentinels_are_invalid() {
        let cases: &[(&[u8], BaseType)] = &[
            (&[0xFF], BaseType::Uint8),
            (&[0xFF], BaseType::Enum),
            (&[0x7F], BaseType::Sint8),
            (&[0xFF, 0xFF], BaseType::Uint16),
            (&[0xFF, 0x7F], BaseType::Sint16),
            (&[0xFF; 4], BaseType::Uint32),
            (&[0xFF, 0xFF, 0xFF, 0x7F], BaseType::Sint32),
            (&[0xFF; 4], BaseType::Float32),
            (&[0xFF; 8], BaseType::Float64),
            (&[0xFF; 8], BaseType::Uint64),
            (&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F], BaseType::Sint64),
            (&[0], BaseType::Uint8z),
            (&[0, 0], BaseType::Uint16z),
            (&[0; 4], BaseType::Uint32z),
            (&[0; 8], BaseType::Uint64z),
            (&[0, 0, 0], BaseType::String),
            (&[0xFF, 0xFF], BaseType::Byte),
        ];

        for (bytes, base_type) in cases {
            let def = FieldDefinition::new(1, bytes.len() as u8, *base_type);
            let fields = decode(bytes, def, Architecture::LittleEndian);
            assert!(fields[0].invalid, "{base_type:?}");
            assert_eq!(fields[0].scaled(), None);
            assert_eq!(fields[0].integer(), None);
        }
    }

    #[test]
    fn big_endian_elements() {
        let def = FieldDefinition::new(4, 2, BaseType::Sint16);
        let fields = decode(&[0xFF, 0xFE], def, Architecture::BigEndian);
        assert_eq!(fields[0].value, Value::I16(-2));
        assert!(!fields[0].invalid);
    }

    #[test]
    fn arrays_repeat_the_field_number() {
        let def = FieldDefinition::new(9, 6, BaseType::Uint16);
        let fields = decode(&[1, 0, 0xFF, 0xFF, 3, 0], def, Architecture::LittleEndian);
        let values: Vec<_> = fields.iter().map(|f| (f.number, f.integer())).collect();
        assert_eq!(values, [(9, Some(1)), (9, None), (9, Some(3))]);
    }

    #[test]
    fn strings_stop_at_nul() {
        let def = FieldDefinition::new(5, 8, BaseType::String);
        let fields = decode(b"Ride\0\0\0\0", def, Architecture::LittleEndian);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].text(), Some("Ride"));
    }

    #[test]
    fn scaling_divides_then_subtracts() {
        let field = DecodedField {
            number: 2,
            base_type: BaseType::Uint16,
            value: Value::U16(2600),
            scaling: Scaling::new(5.0, 500.0),
            invalid: false,
        };
        assert_eq!(field.scaled(), Some(20.0));
        assert_eq!(field.integer(), Some(2600));
    }
}
