use crate::error::{ReportError, Result};
use crate::types::{FilteredView, Measurement, ViewRecord};
use chrono::NaiveDateTime;
use tracing::debug;

/// Earliest and latest timestamp across `records`.
pub fn bounds(records: &[Measurement]) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let mut iter = records.iter().map(|r| r.timestamp);
    let first = iter.next().ok_or(ReportError::EmptyDataset)?;
    Ok(iter.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts))))
}

/// Keep the records with `start <= timestamp <= end`, tagging each with its
/// month and year. An empty selection is a valid result.
pub fn filter(
    records: &[Measurement],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<FilteredView> {
    if start > end {
        return Err(ReportError::InvalidRange(format!(
            "start {} is after end {}",
            start, end
        )));
    }
    let selected: Vec<ViewRecord> = records
        .iter()
        .filter(|r| r.timestamp >= start && r.timestamp <= end)
        .cloned()
        .map(ViewRecord::new)
        .collect();
    debug!(
        "Filtered {} of {} records to [{}, {}]",
        selected.len(),
        records.len(),
        start,
        end
    );
    Ok(FilteredView {
        start,
        end,
        records: selected,
    })
}
