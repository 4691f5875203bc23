//! Typed activity model: records, laps, sessions, events, and the activity
//! summary.
//!
//! Each message type is a struct deriving [`FromRecord`], holding the raw
//! primitive for integer fields and the scaled value for fields the profile
//! scales. Positions are kept as semicircles and converted to degrees in
//! accessors. Every field is optional: absent is distinct from zero.

use alloc::vec::Vec;

use tracing::debug;

use crate::{
    avec::{DecodeOptions, Error, FromField, FromRecord, FromRecords, decode_slice_with},
    profile::{FIT_EPOCH_OFFSET, semicircles_to_degrees},
    sans::data::DecodedField,
};

/// Seconds since the FIT epoch (1989-12-31T00:00:00Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u32);

impl Timestamp {
    /// Seconds since the Unix epoch.
    pub fn unix(self) -> i64 {
        i64::from(self.0) + FIT_EPOCH_OFFSET
    }
}

impl FromField for Timestamp {
    fn from_field(field: &DecodedField) -> Option<Self> {
        u32::from_field(field).map(Self)
    }
}

fn degrees(semicircles: Option<i32>) -> Option<f64> {
    semicircles.map(semicircles_to_degrees)
}

/// `FileId::file_type` of activity files.
pub const FILE_TYPE_ACTIVITY: u8 = 4;

/// File identification (message 0).
#[derive(Debug, Default, Clone, PartialEq, FromRecord)]
pub struct FileId {
    /// Kind of document; [`FILE_TYPE_ACTIVITY`] for activities.
    #[field(0)]
    pub file_type: Option<u8>,
    #[field(1)]
    pub manufacturer: Option<u16>,
    #[field(2)]
    pub product: Option<u16>,
    #[field(3)]
    pub serial_number: Option<u32>,
    #[field(4)]
    pub time_created: Option<Timestamp>,
}

/// A single sample along the activity (message 20).
#[derive(Debug, Default, Clone, PartialEq, FromRecord)]
pub struct Record {
    #[field(253)]
    pub timestamp: Option<Timestamp>,
    #[field(0)]
    pub position_lat: Option<i32>,
    #[field(1)]
    pub position_long: Option<i32>,
    #[field(2)]
    pub altitude: Option<f64>,
    #[field(3)]
    pub heart_rate: Option<u8>,
    #[field(4)]
    pub cadence: Option<u8>,
    /// Metres.
    #[field(5)]
    pub distance: Option<f64>,
    /// Metres per second.
    #[field(6)]
    pub speed: Option<f64>,
    #[field(7)]
    pub power: Option<u16>,
    /// Degrees Celsius.
    #[field(13)]
    pub temperature: Option<i8>,
    #[field(73)]
    pub enhanced_speed: Option<f64>,
    #[field(78)]
    pub enhanced_altitude: Option<f64>,
}

impl Record {
    pub fn latitude(&self) -> Option<f64> {
        degrees(self.position_lat)
    }

    pub fn longitude(&self) -> Option<f64> {
        degrees(self.position_long)
    }

    /// Speed, preferring the enhanced field.
    pub fn speed(&self) -> Option<f64> {
        self.enhanced_speed.or(self.speed)
    }

    /// Altitude in metres, preferring the enhanced field.
    pub fn altitude(&self) -> Option<f64> {
        self.enhanced_altitude.or(self.altitude)
    }
}

/// Summary of one lap (message 19).
#[derive(Debug, Default, Clone, PartialEq, FromRecord)]
pub struct Lap {
    #[field(253)]
    pub timestamp: Option<Timestamp>,
    #[field(254)]
    pub message_index: Option<u16>,
    #[field(2)]
    pub start_time: Option<Timestamp>,
    #[field(3)]
    pub start_position_lat: Option<i32>,
    #[field(4)]
    pub start_position_long: Option<i32>,
    #[field(5)]
    pub end_position_lat: Option<i32>,
    #[field(6)]
    pub end_position_long: Option<i32>,
    /// Seconds.
    #[field(7)]
    pub total_elapsed_time: Option<f64>,
    /// Seconds.
    #[field(8)]
    pub total_timer_time: Option<f64>,
    /// Metres.
    #[field(9)]
    pub total_distance: Option<f64>,
    /// Kilocalories.
    #[field(11)]
    pub total_calories: Option<u16>,
    #[field(13)]
    pub avg_speed: Option<f64>,
    #[field(14)]
    pub max_speed: Option<f64>,
    #[field(15)]
    pub avg_heart_rate: Option<u8>,
    #[field(16)]
    pub max_heart_rate: Option<u8>,
    #[field(17)]
    pub avg_cadence: Option<u8>,
    #[field(18)]
    pub max_cadence: Option<u8>,
    #[field(21)]
    pub total_ascent: Option<u16>,
    #[field(22)]
    pub total_descent: Option<u16>,
}

impl Lap {
    pub fn start_latitude(&self) -> Option<f64> {
        degrees(self.start_position_lat)
    }

    pub fn start_longitude(&self) -> Option<f64> {
        degrees(self.start_position_long)
    }

    pub fn end_latitude(&self) -> Option<f64> {
        degrees(self.end_position_lat)
    }

    pub fn end_longitude(&self) -> Option<f64> {
        degrees(self.end_position_long)
    }
}

/// Summary of one session (message 18).
#[derive(Debug, Default, Clone, PartialEq, FromRecord)]
pub struct Session {
    #[field(253)]
    pub timestamp: Option<Timestamp>,
    #[field(254)]
    pub message_index: Option<u16>,
    #[field(2)]
    pub start_time: Option<Timestamp>,
    #[field(3)]
    pub start_position_lat: Option<i32>,
    #[field(4)]
    pub start_position_long: Option<i32>,
    #[field(5)]
    pub sport: Option<u8>,
    #[field(6)]
    pub sub_sport: Option<u8>,
    #[field(7)]
    pub total_elapsed_time: Option<f64>,
    #[field(8)]
    pub total_timer_time: Option<f64>,
    #[field(9)]
    pub total_distance: Option<f64>,
    #[field(11)]
    pub total_calories: Option<u16>,
    #[field(14)]
    pub avg_speed: Option<f64>,
    #[field(15)]
    pub max_speed: Option<f64>,
    #[field(16)]
    pub avg_heart_rate: Option<u8>,
    #[field(17)]
    pub max_heart_rate: Option<u8>,
    #[field(18)]
    pub avg_cadence: Option<u8>,
    #[field(19)]
    pub max_cadence: Option<u8>,
    #[field(22)]
    pub total_ascent: Option<u16>,
    #[field(23)]
    pub total_descent: Option<u16>,
    #[field(24)]
    pub total_training_effect: Option<f64>,
    #[field(26)]
    pub num_laps: Option<u16>,
    /// North-east corner of the bounding box.
    #[field(29)]
    pub nec_lat: Option<i32>,
    #[field(30)]
    pub nec_long: Option<i32>,
    /// South-west corner of the bounding box.
    #[field(31)]
    pub swc_lat: Option<i32>,
    #[field(32)]
    pub swc_long: Option<i32>,
    /// Joules.
    #[field(48)]
    pub total_work: Option<u32>,
    #[field(49)]
    pub avg_altitude: Option<f64>,
    #[field(50)]
    pub max_altitude: Option<f64>,
    #[field(57)]
    pub avg_temperature: Option<i8>,
    #[field(58)]
    pub max_temperature: Option<i8>,
    #[field(59)]
    pub total_moving_time: Option<f64>,
    #[field(64)]
    pub min_heart_rate: Option<u8>,
    #[field(69)]
    pub avg_lap_time: Option<f64>,
    #[field(71)]
    pub min_altitude: Option<f64>,
    #[field(124)]
    pub enhanced_avg_speed: Option<f64>,
    #[field(125)]
    pub enhanced_max_speed: Option<f64>,
    #[field(126)]
    pub enhanced_avg_altitude: Option<f64>,
    #[field(127)]
    pub enhanced_min_altitude: Option<f64>,
    #[field(128)]
    pub enhanced_max_altitude: Option<f64>,
    #[field(137)]
    pub total_anaerobic_training_effect: Option<f64>,
}

impl Session {
    pub fn start_latitude(&self) -> Option<f64> {
        degrees(self.start_position_lat)
    }

    pub fn start_longitude(&self) -> Option<f64> {
        degrees(self.start_position_long)
    }

    /// Bounding box as `(north, east, south, west)` degrees.
    pub fn bounds(&self) -> (Option<f64>, Option<f64>, Option<f64>, Option<f64>) {
        (
            degrees(self.nec_lat),
            degrees(self.nec_long),
            degrees(self.swc_lat),
            degrees(self.swc_long),
        )
    }

    pub fn avg_speed(&self) -> Option<f64> {
        self.enhanced_avg_speed.or(self.avg_speed)
    }

    pub fn max_speed(&self) -> Option<f64> {
        self.enhanced_max_speed.or(self.max_speed)
    }

    pub fn avg_altitude(&self) -> Option<f64> {
        self.enhanced_avg_altitude.or(self.avg_altitude)
    }

    pub fn max_altitude(&self) -> Option<f64> {
        self.enhanced_max_altitude.or(self.max_altitude)
    }

    pub fn min_altitude(&self) -> Option<f64> {
        self.enhanced_min_altitude.or(self.min_altitude)
    }
}

/// Activity summary (message 34).
#[derive(Debug, Default, Clone, PartialEq, FromRecord)]
pub struct ActivityMeta {
    /// UTC time the activity was saved.
    #[field(253)]
    pub timestamp: Option<Timestamp>,
    #[field(0)]
    pub total_timer_time: Option<f64>,
    #[field(1)]
    pub num_sessions: Option<u16>,
    #[field(2)]
    pub activity_type: Option<u8>,
    #[field(3)]
    pub event: Option<u8>,
    #[field(4)]
    pub event_type: Option<u8>,
    /// The same instant as `timestamp`, in local time.
    #[field(5)]
    pub local_timestamp: Option<Timestamp>,
}

impl ActivityMeta {
    /// Offset of local time from UTC, in seconds.
    pub fn utc_offset(&self) -> Option<i64> {
        let (utc, local) = (self.timestamp?, self.local_timestamp?);
        Some(i64::from(local.0) - i64::from(utc.0))
    }
}

/// Event number of timer events.
pub const EVENT_TIMER: u8 = 0;

/// Event types relevant to timer tracking.
pub mod event_type {
    pub const START: u8 = 0;
    pub const STOP: u8 = 1;
    pub const STOP_ALL: u8 = 4;
    pub const STOP_DISABLE: u8 = 8;
    pub const STOP_DISABLE_ALL: u8 = 9;
}

/// A device event such as a timer start or stop (message 21).
#[derive(Debug, Default, Clone, PartialEq, FromRecord)]
pub struct Event {
    #[field(253)]
    pub timestamp: Option<Timestamp>,
    #[field(0)]
    pub event: Option<u8>,
    #[field(1)]
    pub event_type: Option<u8>,
    #[field(3)]
    pub data: Option<u32>,
    #[field(4)]
    pub event_group: Option<u8>,
}

impl Event {
    pub fn is_timer_start(&self) -> bool {
        self.event == Some(EVENT_TIMER) && self.event_type == Some(event_type::START)
    }

    pub fn is_timer_stop(&self) -> bool {
        use event_type::*;

        self.event == Some(EVENT_TIMER)
            && matches!(
                self.event_type,
                Some(STOP | STOP_ALL | STOP_DISABLE | STOP_DISABLE_ALL)
            )
    }
}

/// Interval during which the device timer was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerPeriod {
    pub start: Timestamp,
    /// `None` if the timer was never stopped.
    pub stop: Option<Timestamp>,
}

#[derive(Debug, Default, FromRecords)]
struct Messages {
    #[record(0)]
    file_id: Option<FileId>,
    #[record(18)]
    sessions: Vec<Session>,
    #[record(19)]
    laps: Vec<Lap>,
    #[record(20)]
    records: Vec<Record>,
    #[record(21)]
    events: Vec<Event>,
    #[record(34)]
    activity: Option<ActivityMeta>,
}

/// A decoded activity document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActivityFile {
    pub file_id: Option<FileId>,
    /// Samples, in document order.
    pub records: Vec<Record>,
    /// Laps, in document order.
    pub laps: Vec<Lap>,
    /// Sessions, in document order.
    pub sessions: Vec<Session>,
    pub events: Vec<Event>,
    pub activity: ActivityMeta,
}

impl ActivityFile {
    /// The first session, whose summary describes the whole activity in
    /// single-sport files.
    pub fn session(&self) -> Option<&Session> {
        self.sessions.first()
    }

    /// Periods the timer ran, from timer start and stop events.
    ///
    /// Repeated starts extend the open period; stops without a preceding
    /// start are ignored.
    pub fn timer_periods(&self) -> Vec<TimerPeriod> {
        let mut periods = Vec::new();
        let mut open: Option<Timestamp> = None;

        for event in &self.events {
            let Some(at) = event.timestamp else { continue };

            if event.is_timer_start() {
                open.get_or_insert(at);
            } else if event.is_timer_stop() {
                if let Some(start) = open.take() {
                    periods.push(TimerPeriod {
                        start,
                        stop: Some(at),
                    });
                }
            }
        }

        if let Some(start) = open {
            periods.push(TimerPeriod { start, stop: None });
        }

        periods
    }
}

/// Decode an activity document from a complete in-memory buffer.
///
/// Fails if the document is malformed or its CRC disagrees. With default
/// options it also fails if the document holds no activity message or no
/// session, or identifies itself as another kind of file.
pub fn decode_activity(r: &[u8]) -> Result<ActivityFile, Error> {
    decode_activity_with(r, &DecodeOptions::default())
}

/// Decode an activity document with explicit options.
pub fn decode_activity_with(r: &[u8], options: &DecodeOptions) -> Result<ActivityFile, Error> {
    let mut messages = Messages::default();
    decode_slice_with(r, &mut messages, options)?;

    let Messages {
        file_id,
        sessions,
        laps,
        records,
        events,
        activity,
    } = messages;

    if options.require_activity {
        let file_type = file_id.as_ref().and_then(|f| f.file_type);
        if file_type.is_some_and(|t| t != FILE_TYPE_ACTIVITY) {
            debug!(?file_type, "document is not an activity");
            Err(Error::NoActivityMessage)?;
        }

        if activity.is_none() || sessions.is_empty() {
            Err(Error::NoActivityMessage)?;
        }
    }

    debug!(
        records = records.len(),
        laps = laps.len(),
        sessions = sessions.len(),
        events = events.len(),
        "decoded activity"
    );

    Ok(ActivityFile {
        file_id,
        records,
        laps,
        sessions,
        events,
        activity: activity.unwrap_or_default(),
    })
}
