//! The subset of the FIT profile this crate understands: global message
//! numbers, field numbers, and per-field scale and offset.
//!
//! Messages and fields not listed here still decode; their values are
//! reported unscaled.

use crate::sans::data::Scaling;

/// Global message numbers.
pub mod mesg {
    pub const FILE_ID: u16 = 0;
    pub const SESSION: u16 = 18;
    pub const LAP: u16 = 19;
    pub const RECORD: u16 = 20;
    pub const EVENT: u16 = 21;
    pub const DEVICE_INFO: u16 = 23;
    pub const ACTIVITY: u16 = 34;
}

/// Field number of the timestamp common to all messages.
pub const TIMESTAMP: u8 = 253;

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z).
pub const FIT_EPOCH_OFFSET: i64 = 631_065_600;

/// Convert a semicircle angle to degrees: `semicircles * (180 / 2^31)`.
pub fn semicircles_to_degrees(semicircles: i32) -> f64 {
    const DEGREES_PER_SEMICIRCLE: f64 = 180.0 / 2_147_483_648.0;
    semicircles as f64 * DEGREES_PER_SEMICIRCLE
}

const MILLI: Scaling = Scaling::new(1000.0, 0.0);
const CENTI: Scaling = Scaling::new(100.0, 0.0);
const DECI: Scaling = Scaling::new(10.0, 0.0);
const ALTITUDE: Scaling = Scaling::new(5.0, 500.0);

/// Scale and offset declared for a field of a global message.
pub fn scaling(global: u16, field: u8) -> Scaling {
    match (global, field) {
        // record: altitude, distance, speed, enhanced speed and altitude
        (mesg::RECORD, 2 | 78) => ALTITUDE,
        (mesg::RECORD, 5) => CENTI,
        (mesg::RECORD, 6 | 73) => MILLI,
        (mesg::RECORD, 53) => Scaling::new(128.0, 0.0),

        // lap: elapsed and timer time, distance, speeds, altitudes
        (mesg::LAP, 7 | 8) => MILLI,
        (mesg::LAP, 9) => CENTI,
        (mesg::LAP, 13 | 14 | 110 | 111) => MILLI,
        (mesg::LAP, 42 | 43 | 62 | 112 | 113 | 114) => ALTITUDE,

        // session
        (mesg::SESSION, 7 | 8 | 59 | 69) => MILLI,
        (mesg::SESSION, 9) => CENTI,
        (mesg::SESSION, 14 | 15 | 124 | 125) => MILLI,
        (mesg::SESSION, 24 | 137) => DECI,
        (mesg::SESSION, 49 | 50 | 71 | 126 | 127 | 128) => ALTITUDE,

        // activity: total timer time
        (mesg::ACTIVITY, 0) => MILLI,

        _ => Scaling::IDENTITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicircle_extremes() {
        assert_eq!(semicircles_to_degrees(0), 0.0);
        assert_eq!(semicircles_to_degrees(i32::MIN), -180.0);
        assert_eq!(semicircles_to_degrees(1 << 30), 90.0);
    }

    #[test]
    fn unknown_fields_are_unscaled() {
        assert_eq!(scaling(mesg::RECORD, 3), Scaling::IDENTITY);
        assert_eq!(scaling(0xFF00, 5), Scaling::IDENTITY);
        assert_eq!(scaling(mesg::RECORD, 5), Scaling::new(100.0, 0.0));
    }
}
