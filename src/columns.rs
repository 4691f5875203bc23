//! Flattening of a decoded activity into fixed-capacity columns.
//!
//! Each column is allocated at the caller's capacity and pre-filled, so
//! every slot is defined whether or not the document supplied it: absent
//! values are NaN in float columns and zero in timestamp columns. Capacity
//! smaller than the decoded count truncates; `written` reports how many
//! leading slots hold data and `total` how many entries were decoded.
//!
//! A failed decode still yields a complete [`ActivityColumns`], with
//! [`Status::Failed`] and placeholder contents.

use alloc::{string::ToString, vec, vec::Vec};

use crate::{
    activity::{ActivityFile, Lap, Record, Session},
    avec::Error,
};

/// Outcome of the decode the columns were produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Succeeded,
    /// The decode failed; holds the error message.
    Failed(alloc::string::String),
}

fn nan(x: Option<f64>) -> f32 {
    x.map_or(f32::NAN, |x| x as f32)
}

fn nan_int<T: Into<f64>>(x: Option<T>) -> f32 {
    nan(x.map(Into::into))
}

fn fill<T: Copy, S>(column: &mut [T], source: &[S], get: impl Fn(&S) -> T) {
    for (slot, item) in column.iter_mut().zip(source) {
        *slot = get(item);
    }
}

/// Per-record columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordColumns {
    /// Unix seconds.
    pub timestamp: Vec<i64>,
    pub distance: Vec<f32>,
    pub speed: Vec<f32>,
    pub altitude: Vec<f32>,
    pub cadence: Vec<f32>,
    pub heart_rate: Vec<f32>,
    pub latitude: Vec<f32>,
    pub longitude: Vec<f32>,
    /// Leading slots holding decoded records.
    pub written: usize,
    /// Records decoded, regardless of capacity.
    pub total: usize,
}

impl RecordColumns {
    /// Columns of `capacity` slots holding no records.
    pub fn empty(capacity: usize) -> Self {
        Self {
            timestamp: vec![0; capacity],
            distance: vec![f32::NAN; capacity],
            speed: vec![f32::NAN; capacity],
            altitude: vec![f32::NAN; capacity],
            cadence: vec![f32::NAN; capacity],
            heart_rate: vec![f32::NAN; capacity],
            latitude: vec![f32::NAN; capacity],
            longitude: vec![f32::NAN; capacity],
            written: 0,
            total: 0,
        }
    }

    pub fn new(records: &[Record], capacity: usize) -> Self {
        let mut c = Self::empty(capacity);

        fill(&mut c.timestamp, records, |r| r.timestamp.map_or(0, |t| t.unix()));
        fill(&mut c.distance, records, |r| nan(r.distance));
        fill(&mut c.speed, records, |r| nan(r.speed()));
        fill(&mut c.altitude, records, |r| nan(r.altitude()));
        fill(&mut c.cadence, records, |r| nan_int(r.cadence));
        fill(&mut c.heart_rate, records, |r| nan_int(r.heart_rate));
        fill(&mut c.latitude, records, |r| nan(r.latitude()));
        fill(&mut c.longitude, records, |r| nan(r.longitude()));

        c.written = records.len().min(capacity);
        c.total = records.len();
        c
    }
}

/// Per-lap columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LapColumns {
    /// Unix seconds.
    pub timestamp: Vec<i64>,
    pub total_distance: Vec<f32>,
    pub start_latitude: Vec<f32>,
    pub start_longitude: Vec<f32>,
    pub end_latitude: Vec<f32>,
    pub end_longitude: Vec<f32>,
    pub total_calories: Vec<f32>,
    pub total_elapsed_time: Vec<f32>,
    pub total_timer_time: Vec<f32>,
    pub written: usize,
    pub total: usize,
}

impl LapColumns {
    pub fn empty(capacity: usize) -> Self {
        Self {
            timestamp: vec![0; capacity],
            total_distance: vec![f32::NAN; capacity],
            start_latitude: vec![f32::NAN; capacity],
            start_longitude: vec![f32::NAN; capacity],
            end_latitude: vec![f32::NAN; capacity],
            end_longitude: vec![f32::NAN; capacity],
            total_calories: vec![f32::NAN; capacity],
            total_elapsed_time: vec![f32::NAN; capacity],
            total_timer_time: vec![f32::NAN; capacity],
            written: 0,
            total: 0,
        }
    }

    pub fn new(laps: &[Lap], capacity: usize) -> Self {
        let mut c = Self::empty(capacity);

        fill(&mut c.timestamp, laps, |l| l.timestamp.map_or(0, |t| t.unix()));
        fill(&mut c.total_distance, laps, |l| nan(l.total_distance));
        fill(&mut c.start_latitude, laps, |l| nan(l.start_latitude()));
        fill(&mut c.start_longitude, laps, |l| nan(l.start_longitude()));
        fill(&mut c.end_latitude, laps, |l| nan(l.end_latitude()));
        fill(&mut c.end_longitude, laps, |l| nan(l.end_longitude()));
        fill(&mut c.total_calories, laps, |l| nan_int(l.total_calories));
        fill(&mut c.total_elapsed_time, laps, |l| nan(l.total_elapsed_time));
        fill(&mut c.total_timer_time, laps, |l| nan(l.total_timer_time));

        c.written = laps.len().min(capacity);
        c.total = laps.len();
        c
    }
}

/// Summary fields of the first session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    /// Unix seconds.
    pub timestamp: i64,
    pub start_time: i64,
    pub start_latitude: f32,
    pub start_longitude: f32,
    pub total_elapsed_time: f32,
    pub total_timer_time: f32,
    pub total_distance: f32,
    pub nec_latitude: f32,
    pub nec_longitude: f32,
    pub swc_latitude: f32,
    pub swc_longitude: f32,
    pub total_work: f32,
    pub total_moving_time: f32,
    pub avg_lap_time: f32,
    pub total_calories: f32,
    pub avg_speed: f32,
    pub max_speed: f32,
    pub total_ascent: f32,
    pub total_descent: f32,
    pub avg_altitude: f32,
    pub max_altitude: f32,
    pub min_altitude: f32,
    pub avg_heart_rate: f32,
    pub max_heart_rate: f32,
    pub min_heart_rate: f32,
    pub avg_cadence: f32,
    pub max_cadence: f32,
    pub avg_temperature: f32,
    pub max_temperature: f32,
    pub total_anaerobic_training_effect: f32,
}

impl Default for SessionSummary {
    fn default() -> Self {
        Self::from(&Session::default())
    }
}

impl From<&Session> for SessionSummary {
    fn from(s: &Session) -> Self {
        let (north, east, south, west) = s.bounds();

        Self {
            timestamp: s.timestamp.map_or(0, |t| t.unix()),
            start_time: s.start_time.map_or(0, |t| t.unix()),
            start_latitude: nan(s.start_latitude()),
            start_longitude: nan(s.start_longitude()),
            total_elapsed_time: nan(s.total_elapsed_time),
            total_timer_time: nan(s.total_timer_time),
            total_distance: nan(s.total_distance),
            nec_latitude: nan(north),
            nec_longitude: nan(east),
            swc_latitude: nan(south),
            swc_longitude: nan(west),
            total_work: nan_int(s.total_work),
            total_moving_time: nan(s.total_moving_time),
            avg_lap_time: nan(s.avg_lap_time),
            total_calories: nan_int(s.total_calories),
            avg_speed: nan(s.avg_speed()),
            max_speed: nan(s.max_speed()),
            total_ascent: nan_int(s.total_ascent),
            total_descent: nan_int(s.total_descent),
            avg_altitude: nan(s.avg_altitude()),
            max_altitude: nan(s.max_altitude()),
            min_altitude: nan(s.min_altitude()),
            avg_heart_rate: nan_int(s.avg_heart_rate),
            max_heart_rate: nan_int(s.max_heart_rate),
            min_heart_rate: nan_int(s.min_heart_rate),
            avg_cadence: nan_int(s.avg_cadence),
            max_cadence: nan_int(s.max_cadence),
            avg_temperature: nan_int(s.avg_temperature),
            max_temperature: nan_int(s.max_temperature),
            total_anaerobic_training_effect: nan(s.total_anaerobic_training_effect),
        }
    }
}

/// Everything a plotting consumer reads from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityColumns {
    pub status: Status,
    pub records: RecordColumns,
    pub laps: LapColumns,
    pub session: SessionSummary,
    /// Unix seconds at which the activity was saved.
    pub utc_timestamp: i64,
    /// Local time minus UTC, in seconds.
    pub utc_offset: i64,
}

impl ActivityColumns {
    pub fn new(activity: &ActivityFile, record_capacity: usize, lap_capacity: usize) -> Self {
        Self {
            status: Status::Succeeded,
            records: RecordColumns::new(&activity.records, record_capacity),
            laps: LapColumns::new(&activity.laps, lap_capacity),
            session: activity.session().map(SessionSummary::from).unwrap_or_default(),
            utc_timestamp: activity.activity.timestamp.map_or(0, |t| t.unix()),
            utc_offset: activity.activity.utc_offset().unwrap_or(0),
        }
    }

    /// Placeholder columns describing a failed decode.
    pub fn failed(err: &Error, record_capacity: usize, lap_capacity: usize) -> Self {
        Self {
            status: Status::Failed(err.to_string()),
            records: RecordColumns::empty(record_capacity),
            laps: LapColumns::empty(lap_capacity),
            session: SessionSummary::default(),
            utc_timestamp: 0,
            utc_offset: 0,
        }
    }

    /// Columns for the outcome of a decode, successful or not.
    pub fn from_result(
        result: &Result<ActivityFile, Error>,
        record_capacity: usize,
        lap_capacity: usize,
    ) -> Self {
        match result {
            Ok(activity) => Self::new(activity, record_capacity, lap_capacity),
            Err(err) => Self::failed(err, record_capacity, lap_capacity),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Succeeded
    }
}
