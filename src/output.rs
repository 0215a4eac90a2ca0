use crate::error::Result;
use crate::reports::{top_stations, RfmMetric, ReportSet};
use crate::types::CsvColumns;
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub const STATION_MONTH_FILE: &str = "pm25_station_month.csv";
pub const STATION_YEAR_FILE: &str = "pm25_station_year.csv";
pub const STATION_TOTAL_FILE: &str = "pm25_station.csv";
pub const RFM_FILE: &str = "rfm_station.csv";
pub const SUMMARY_FILE: &str = "rfm_summary.json";

pub fn write_csv<T: Serialize + CsvColumns>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    // serde only emits the header alongside the first row.
    if rows.is_empty() {
        wtr.write_record(T::COLUMNS)?;
    }
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write every table of `set` into `dir`, returning the paths written.
pub fn export_all(dir: &Path, set: &ReportSet) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let paths = [
        STATION_MONTH_FILE,
        STATION_YEAR_FILE,
        STATION_TOTAL_FILE,
        RFM_FILE,
        SUMMARY_FILE,
    ]
    .map(|name| dir.join(name));

    write_csv(&paths[0], &set.station_month)?;
    write_csv(&paths[1], &set.station_year)?;
    write_csv(&paths[2], &set.station_totals)?;
    write_csv(&paths[3], &set.rfm)?;
    write_json(&paths[4], &set.summary)?;

    info!("Exported {} files to {}", paths.len(), dir.display());
    Ok(paths.to_vec())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    preview_table_rows(rows, max_rows);
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}", table_str);
    if rows.len() > max_rows {
        println!("... {} more rows", format_int(rows.len() - max_rows));
    }
    println!();
}

/// Console rendition of one report pass: the three PM2.5 roll-ups, the RFM
/// metrics and the top stations per RFM metric.
pub fn print_report(set: &ReportSet, range_note: &str, max_rows: usize) {
    preview_table("Total PM2.5 per Month", Some(range_note), &set.station_month, max_rows);
    preview_table("Total PM2.5 per Year", Some(range_note), &set.station_year, max_rows);
    preview_table("Total PM2.5 per Station", Some(range_note), &set.station_totals, max_rows);

    println!("Best Station Based on RFM Parameters\n");
    println!(
        "Average Recency (days): {}  |  Average Frequency: {}  |  Average Monetary: {}\n",
        format_number(set.summary.avg_recency, 1),
        format_number(set.summary.avg_frequency, 2),
        format_number(set.summary.avg_monetary, 2)
    );
    for metric in RfmMetric::ALL {
        let top = top_stations(&set.rfm, metric, max_rows);
        preview_table(metric.title(), None, &top, max_rows);
    }
}
