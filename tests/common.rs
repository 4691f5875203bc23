#![cfg(feature = "std")]

mod support;

use csv::ReaderBuilder;
use freewheel::{
    avec::{FromRecord, FromRecords},
    sans::data::{DecodedField, Value},
};

use support::*;

/// One row per message: the global number, then each field number followed
/// by its values. Array elements share one field number; `-` marks invalid.
const EXPECTED: &str = "\
0,0,4,1,255,4,1000
20,253,100,13,-5,5,12345,3,-
65281,0,1,2,3,1,1.5,2,ride
20,253,104,13,-6,5,12400,3,140
";

fn document() -> Vec<u8> {
    FitBuilder::new()
        .definition(0, 0, &[(0, 1, ENUM), (1, 2, UINT16), (4, 4, UINT32)])
        .data(0, &cat(&[&[4], &255u16.to_le_bytes(), &1000u32.to_le_bytes()]))
        .definition(
            1,
            RECORD,
            &[(253, 4, UINT32), (13, 1, SINT8), (5, 4, UINT32), (3, 1, UINT8)],
        )
        .data(
            1,
            &cat(&[&100u32.to_le_bytes(), &[-5i8 as u8], &12345u32.to_le_bytes(), &[0xFF]]),
        )
        .definition(2, 0xFF01, &[(0, 6, UINT16), (1, 4, FLOAT32), (2, 8, STRING)])
        .data(
            2,
            &cat(&[
                &[1, 0, 2, 0, 3, 0],
                &1.5f32.to_le_bytes(),
                b"ride\0\0\0\0",
            ]),
        )
        .definition(3, RECORD, &[(13, 1, SINT8), (5, 4, UINT32), (3, 1, UINT8)])
        .compressed(3, 8, &cat(&[&[-6i8 as u8], &12400u32.to_le_bytes(), &[140]]))
        .build()
}

#[test]
fn decode_slice_validates() {
    let mut validator = Validator::new(EXPECTED);
    freewheel::avec::decode_slice(&document(), &mut validator).unwrap();
    validator.finish();
}

#[test]
fn decode_reader_validates() {
    let mut validator = Validator::new(EXPECTED);
    let mut reader = std::io::Cursor::new(document());
    freewheel::avec::decode_reader(&mut reader, &mut validator).unwrap();
    validator.finish();
}

struct Validator(Vec<String>, Vec<Vec<String>>, Option<u8>);

impl Validator {
    fn new(expected: &str) -> Self {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_reader(expected.as_bytes());

        let expected: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect();

        Self(vec![], expected, None)
    }

    fn validate_field(&mut self, field: u8) {
        if Some(field) != self.2 {
            self.2 = Some(field);
            assert_eq!(self.0.remove(0), field.to_string())
        }
    }

    fn finish(self) {
        assert!(self.0.is_empty(), "unconsumed values: {:?}", self.0);
        assert!(self.1.is_empty(), "unconsumed rows: {:?}", self.1);
    }
}

fn render(field: &DecodedField) -> String {
    if field.invalid {
        return "-".to_string();
    }

    match &field.value {
        Value::String(s) => s.clone(),
        Value::Bytes(b) => format!("{b:02x?}"),
        Value::F32(x) => x.to_string(),
        Value::F64(x) => x.to_string(),
        value => value.as_i64().unwrap().to_string(),
    }
}

impl FromRecords for Validator {
    fn add_record(&mut self, id: u16) -> Option<&mut dyn FromRecord> {
        assert!(self.0.is_empty(), "unconsumed values: {:?}", self.0);
        self.0 = self.1.remove(0);
        self.2 = None;
        assert_eq!(self.0.remove(0), id.to_string());
        Some(self)
    }
}

impl FromRecord for Validator {
    fn add_field(&mut self, field: &DecodedField) {
        self.validate_field(field.number);
        assert_eq!(self.0.remove(0), render(field));
    }
}
