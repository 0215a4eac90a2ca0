use crate::util::format_amount;
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Columns the loader cannot do without. Anything else in the file is ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = ["station", "year", "month", "day", "hour", "PM2.5", "CO"];

/// One line of the input CSV, before any cleaning.
///
/// Every cell is read as text so that `NA` markers and blanks can be mapped
/// to `None` instead of failing the whole row.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub station: Option<String>,
    pub year: Option<String>,
    pub month: Option<String>,
    pub day: Option<String>,
    pub hour: Option<String>,
    #[serde(rename = "PM2.5")]
    pub pm25: Option<String>,
    #[serde(rename = "CO")]
    pub co: Option<String>,
}

/// A normalized reading: the four time-part columns collapsed into `timestamp`.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub station: String,
    pub timestamp: NaiveDateTime,
    pub pm25: Option<f64>,
    pub co: Option<f64>,
}

/// A reading inside a date range, carrying the month/year used for grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRecord {
    pub measurement: Measurement,
    pub month: u32,
    pub year: i32,
}

impl ViewRecord {
    pub fn new(measurement: Measurement) -> Self {
        let month = measurement.timestamp.month();
        let year = measurement.timestamp.year();
        Self {
            measurement,
            month,
            year,
        }
    }

    pub fn station(&self) -> &str {
        &self.measurement.station
    }
}

/// The records selected by one `[start, end]` range.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub records: Vec<ViewRecord>,
}

impl FilteredView {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Latest timestamp in the view, `None` when the view is empty.
    pub fn max_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.iter().map(|r| r.measurement.timestamp).max()
    }

    /// The underlying measurements, with the derived fields stripped.
    pub fn to_measurements(&self) -> Vec<Measurement> {
        self.records.iter().map(|r| r.measurement.clone()).collect()
    }
}

/// CSV header of an exported table, written even when the table has no rows.
/// Must match the serde field names of the row type.
pub trait CsvColumns {
    const COLUMNS: &'static [&'static str];
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct StationMonthRow {
    #[tabled(rename = "Station")]
    pub station: String,
    #[tabled(rename = "Month")]
    pub month: u32,
    #[serde(rename = "PM2.5")]
    #[tabled(rename = "Total PM2.5", display_with = "format_amount")]
    pub pm25_total: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct StationYearRow {
    #[tabled(rename = "Station")]
    pub station: String,
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "PM2.5")]
    #[tabled(rename = "Total PM2.5", display_with = "format_amount")]
    pub pm25_total: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct StationTotalRow {
    #[tabled(rename = "Station")]
    pub station: String,
    #[serde(rename = "PM2.5")]
    #[tabled(rename = "Total PM2.5", display_with = "format_amount")]
    pub pm25_total: f64,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct RfmRow {
    #[tabled(rename = "Station")]
    pub station: String,
    #[tabled(rename = "Frequency")]
    pub frequency: usize,
    #[tabled(rename = "Monetary", display_with = "format_amount")]
    pub monetary: f64,
    #[tabled(rename = "Recency (days)")]
    pub recency: i64,
}

impl CsvColumns for StationMonthRow {
    const COLUMNS: &'static [&'static str] = &["station", "month", "PM2.5"];
}

impl CsvColumns for StationYearRow {
    const COLUMNS: &'static [&'static str] = &["station", "year", "PM2.5"];
}

impl CsvColumns for StationTotalRow {
    const COLUMNS: &'static [&'static str] = &["station", "PM2.5"];
}

impl CsvColumns for RfmRow {
    const COLUMNS: &'static [&'static str] = &["station", "frequency", "monetary", "recency"];
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RfmSummary {
    pub stations: usize,
    pub avg_recency: f64,
    pub avg_frequency: f64,
    pub avg_monetary: f64,
}
