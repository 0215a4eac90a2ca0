use crate::error::{ReportError, Result};
use crate::filter;
use crate::types::{FilteredView, Measurement, RawRow, REQUIRED_COLUMNS};
use crate::util::{parse_f64_safe, parse_i32_safe, parse_u32_safe, timestamp_from_parts};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub station_count: usize,
    pub missing_pm25: usize,
    pub missing_co: usize,
}

/// The full, normalized dataset. Built once and never mutated; every range
/// query produces a fresh [`FilteredView`].
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<Measurement>,
    min: NaiveDateTime,
    max: NaiveDateTime,
}

impl RecordStore {
    /// Wrap an already-normalized record set. Fails on an empty set.
    pub fn new(records: Vec<Measurement>) -> Result<Self> {
        let (min, max) = filter::bounds(&records)?;
        Ok(Self { records, min, max })
    }

    pub fn records(&self) -> &[Measurement] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`: [`RecordStore::new`] rejects empty sets. Kept as the
    /// companion of `len`.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest timestamp in the dataset.
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.min, self.max)
    }

    /// Distinct station identifiers, sorted.
    pub fn stations(&self) -> Vec<String> {
        let mut stations: Vec<String> = self
            .records
            .iter()
            .map(|r| r.station.as_str())
            .collect::<HashSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        stations.sort();
        stations
    }

    /// Select the records in `[start, end]`, rejecting bounds whose dates lie
    /// outside the dataset's own date span.
    pub fn filter_by_range(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<FilteredView> {
        let (min_date, max_date) = (self.min.date(), self.max.date());
        for (label, bound) in [("start", start), ("end", end)] {
            if bound.date() < min_date || bound.date() > max_date {
                return Err(ReportError::InvalidRange(format!(
                    "{} {} is outside the dataset span {} to {}",
                    label, bound, min_date, max_date
                )));
            }
        }
        filter::filter(&self.records, start, end)
    }
}

/// Load the dataset at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<(RecordStore, LoadReport)> {
    let path = path.as_ref();
    info!("Loading {}", path.display());
    let file = std::fs::File::open(path).map_err(|e| {
        ReportError::DataUnavailable(format!("cannot read {}: {}", path.display(), e))
    })?;
    load_from_reader(file)
}

/// Load the dataset from any CSV source with a header row.
pub fn load_from_reader<R: Read>(reader: R) -> Result<(RecordStore, LoadReport)> {
    // Header names are trimmed here so the column check below and the serde
    // field matching see the same names.
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ReportError::DataUnavailable(format!("unreadable header: {}", e)))?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(ReportError::DataUnavailable(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let mut total_rows = 0usize;
    let mut missing_pm25 = 0usize;
    let mut missing_co = 0usize;
    let mut records: Vec<Measurement> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        // Header is line 1, so data row N sits on line N + 1.
        let line = total_rows + 1;
        let row = result
            .map_err(|e| ReportError::DataUnavailable(format!("line {}: {}", line, e)))?;

        let station = row
            .station
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ReportError::DataUnavailable(format!("line {}: empty station", line)))?
            .to_string();

        let timestamp = parse_timestamp(&row).ok_or_else(|| {
            ReportError::DataUnavailable(format!(
                "line {}: invalid time parts year={:?} month={:?} day={:?} hour={:?}",
                line, row.year, row.month, row.day, row.hour
            ))
        })?;

        let pm25 = parse_f64_safe(row.pm25.as_deref());
        let co = parse_f64_safe(row.co.as_deref());
        if pm25.is_none() {
            missing_pm25 += 1;
        }
        if co.is_none() {
            missing_co += 1;
        }

        records.push(Measurement {
            station,
            timestamp,
            pm25,
            co,
        });
    }

    let store = RecordStore::new(records)?;
    let report = LoadReport {
        total_rows,
        station_count: store.stations().len(),
        missing_pm25,
        missing_co,
    };
    debug!(?report, "Load finished");
    Ok((store, report))
}

fn parse_timestamp(row: &RawRow) -> Option<NaiveDateTime> {
    let year = parse_i32_safe(row.year.as_deref())?;
    let month = parse_u32_safe(row.month.as_deref())?;
    let day = parse_u32_safe(row.day.as_deref())?;
    let hour = parse_u32_safe(row.hour.as_deref())?;
    timestamp_from_parts(year, month, day, hour)
}
