//! Vital Signs Model
//!
//! This module defines the data exchanged with the vitals backend and the
//! chart-ready series derived from it:
//! - `DeviceId`: opaque identifier of a connected sensing unit
//! - `RawReading`: one sample of heart rate, SpO2 and temperature
//! - `Series` / `SeriesSet`: per-metric sample points sorted by time

use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, sync::Arc};
use time::{macros::format_description, OffsetDateTime, UtcOffset};

use super::threshold::BoundaryPair;

/// Identifier of a connected device.
///
/// The backend may report identifiers as JSON strings or numbers, both are
/// normalised to their textual representation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum WireId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match WireId::deserialize(deserializer)? {
            WireId::Text(text) => DeviceId(text),
            WireId::Number(number) => DeviceId(number.to_string()),
        })
    }
}

/// A single sample reported by a device.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Heart rate in beats per minute.
    #[serde(rename = "hr")]
    pub heart_rate: f64,
    /// Blood oxygen saturation in percent.
    pub spo2: f64,
    /// Body temperature in degrees Celsius.
    #[serde(rename = "temp")]
    pub temperature: f64,
    /// Sampling instant in seconds since the unix epoch.
    #[serde(rename = "timestamp")]
    pub timestamp_secs: f64,
}

/// The vital signs tracked per device.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    HeartRate,
    Spo2,
    Temperature,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::HeartRate, Metric::Spo2, Metric::Temperature];

    pub fn title(&self) -> &'static str {
        match self {
            Metric::HeartRate => "Heart Rate",
            Metric::Spo2 => "SPO2",
            Metric::Temperature => "Temperature",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::HeartRate => "BPM",
            Metric::Spo2 => "%",
            Metric::Temperature => "°C",
        }
    }

    pub fn default_boundaries(&self) -> BoundaryPair {
        match self {
            Metric::HeartRate => BoundaryPair::new(50.0, 120.0),
            Metric::Spo2 => BoundaryPair::new(90.0, 100.0),
            Metric::Temperature => BoundaryPair::new(35.0, 40.0),
        }
    }

    /// Projects the value of this metric out of a reading.
    pub fn value_of(&self, reading: &RawReading) -> f64 {
        match self {
            Metric::HeartRate => reading.heart_rate,
            Metric::Spo2 => reading.spo2,
            Metric::Temperature => reading.temperature,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Metric::HeartRate => 0,
            Metric::Spo2 => 1,
            Metric::Temperature => 2,
        }
    }
}

/// One metric value at one instant, ready for charting.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SamplePoint {
    pub value: f64,
    pub timestamp_millis: f64,
}

/// Sample points of a single metric, sorted ascending by timestamp.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    points: Vec<SamplePoint>,
}

impl Series {
    /// Projects `metric` out of `readings` and sorts the result by time.
    ///
    /// The sort is stable, samples sharing a timestamp keep their arrival order.
    pub fn project(metric: Metric, readings: &[RawReading]) -> Self {
        let mut points: Vec<SamplePoint> = readings
            .iter()
            .map(|reading| SamplePoint {
                value: metric.value_of(reading),
                timestamp_millis: reading.timestamp_secs * 1000.0,
            })
            .collect();
        points.sort_by(|a, b| a.timestamp_millis.total_cmp(&b.timestamp_millis));
        Self { points }
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn last(&self) -> Option<&SamplePoint> {
        self.points.last()
    }
}

/// The three metric series of one device.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeriesSet {
    series: [Arc<Series>; 3],
}

impl SeriesSet {
    pub fn from_readings(readings: &[RawReading]) -> Self {
        Self {
            series: Metric::ALL.map(|metric| Arc::new(Series::project(metric, readings))),
        }
    }

    pub fn get(&self, metric: Metric) -> &Arc<Series> {
        &self.series[metric.index()]
    }
}

/// Formats a millisecond timestamp as a wall clock time label.
///
/// Uses the local offset when the platform can determine it, UTC otherwise.
pub fn time_label(timestamp_millis: f64) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    time_label_at(timestamp_millis, offset)
}

pub fn time_label_at(timestamp_millis: f64, offset: UtcOffset) -> String {
    let fd = format_description!("[hour]:[minute]:[second]");
    let nanos = (timestamp_millis * 1_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|ts| ts.to_offset(offset).format(fd).ok())
        .unwrap_or_else(|| "--:--:--".to_owned())
}

/// Current wall clock time in fractional seconds since the unix epoch.
pub fn now_secs() -> f64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1e9
}
