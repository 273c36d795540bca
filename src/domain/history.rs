// Historical data domain models
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSample {
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl HistoricalSample {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self { time, value }
    }
}

/// Samples for one tag, ascending by time.
pub type HistoricalSeries = Vec<HistoricalSample>;

#[derive(Debug, Clone, PartialEq)]
pub struct DailyAverage {
    pub date: NaiveDate,
    pub label: String,
    pub average: f64,
}

impl DailyAverage {
    pub fn new(date: NaiveDate, label: String, average: f64) -> Self {
        Self {
            date,
            label,
            average,
        }
    }
}

/// Where a resolved 24-hour series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    Real,
    Simulated,
}
