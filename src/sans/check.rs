//! Cyclic redundancy checks over document bytes.

use thiserror::Error;

/// Calculated and found CRC values do not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Calculated ({calculated}) and found ({found}) CRC values do not match.")]
pub struct CrcMismatch {
    pub found: u16,
    pub calculated: u16,
}

/// Accumulate a slice of bytes into a cyclic redundancy check value.
pub fn compute_crc(init: u16, r: &[u8]) -> u16 {
    r.iter().fold(init, |acc, b| crc_byte(acc, *b))
}

/// Compare the CRC of `covered` against the little-endian value in `stored`.
pub fn verify(covered: &[u8], stored: [u8; 2]) -> Result<(), CrcMismatch> {
    let found = u16::from_le_bytes(stored);
    let calculated = compute_crc(0, covered);

    if found != calculated {
        Err(CrcMismatch { found, calculated })
    } else {
        Ok(())
    }
}

/// Accumulate a single byte, one nibble at a time.
fn crc_byte(crc: u16, b: u8) -> u16 {
    const CRC_TABLE: [u16; 16] = [
        0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
        0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
    ];

    [b & 0xF, b >> 4].into_iter().fold(crc, |crc, nibble| {
        let tmp = CRC_TABLE[(crc & 0xF) as usize];
        ((crc >> 4) & 0x0FFF) ^ tmp ^ CRC_TABLE[nibble as usize]
    })
}
