use crate::types::{
    FilteredView, RfmRow, RfmSummary, StationMonthRow, StationTotalRow, StationYearRow,
};
use crate::util::{average, days_between};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Total PM2.5 per (station, month). Missing readings count as 0.
pub fn sum_by_station_month(view: &FilteredView) -> Vec<StationMonthRow> {
    let mut map: HashMap<(&str, u32), f64> = HashMap::new();
    for r in &view.records {
        *map.entry((r.station(), r.month)).or_default() += r.measurement.pm25.unwrap_or(0.0);
    }
    let mut rows: Vec<StationMonthRow> = map
        .into_iter()
        .map(|((station, month), pm25_total)| StationMonthRow {
            station: station.to_string(),
            month,
            pm25_total,
        })
        .collect();
    rows.sort_by(|a, b| a.station.cmp(&b.station).then(a.month.cmp(&b.month)));
    rows
}

/// Total PM2.5 per (station, year). Missing readings count as 0.
pub fn sum_by_station_year(view: &FilteredView) -> Vec<StationYearRow> {
    let mut map: HashMap<(&str, i32), f64> = HashMap::new();
    for r in &view.records {
        *map.entry((r.station(), r.year)).or_default() += r.measurement.pm25.unwrap_or(0.0);
    }
    let mut rows: Vec<StationYearRow> = map
        .into_iter()
        .map(|((station, year), pm25_total)| StationYearRow {
            station: station.to_string(),
            year,
            pm25_total,
        })
        .collect();
    rows.sort_by(|a, b| a.station.cmp(&b.station).then(a.year.cmp(&b.year)));
    rows
}

/// Total PM2.5 per station. Missing readings count as 0.
pub fn sum_by_station(view: &FilteredView) -> Vec<StationTotalRow> {
    let mut map: HashMap<&str, f64> = HashMap::new();
    for r in &view.records {
        *map.entry(r.station()).or_default() += r.measurement.pm25.unwrap_or(0.0);
    }
    let mut rows: Vec<StationTotalRow> = map
        .into_iter()
        .map(|(station, pm25_total)| StationTotalRow {
            station: station.to_string(),
            pm25_total,
        })
        .collect();
    rows.sort_by(|a, b| a.station.cmp(&b.station));
    rows
}

/// Recency / frequency / monetary per station.
///
/// - frequency: number of rows with a PM2.5 reading
/// - monetary: CO total, missing readings count as 0
/// - recency: whole days from the station's last reading to the last
///   reading anywhere in the view
///
/// Stations with no rows in the view get no row here.
pub fn rfm(view: &FilteredView) -> Vec<RfmRow> {
    struct Acc {
        last_seen: NaiveDateTime,
        frequency: usize,
        monetary: f64,
    }

    let Some(recent) = view.max_timestamp() else {
        return Vec::new();
    };
    let recent_date = recent.date();

    let mut map: HashMap<&str, Acc> = HashMap::new();
    for r in &view.records {
        let m = &r.measurement;
        let e = map.entry(r.station()).or_insert(Acc {
            last_seen: m.timestamp,
            frequency: 0,
            monetary: 0.0,
        });
        e.last_seen = e.last_seen.max(m.timestamp);
        if m.pm25.is_some() {
            e.frequency += 1;
        }
        e.monetary += m.co.unwrap_or(0.0);
    }

    let mut rows: Vec<RfmRow> = map
        .into_iter()
        .map(|(station, acc)| RfmRow {
            station: station.to_string(),
            frequency: acc.frequency,
            monetary: acc.monetary,
            recency: days_between(acc.last_seen.date(), recent_date),
        })
        .collect();
    rows.sort_by(|a, b| a.station.cmp(&b.station));
    rows
}

/// Means over the RFM table, as shown above the RFM charts.
pub fn rfm_summary(rows: &[RfmRow]) -> RfmSummary {
    let recency: Vec<f64> = rows.iter().map(|r| r.recency as f64).collect();
    let frequency: Vec<f64> = rows.iter().map(|r| r.frequency as f64).collect();
    let monetary: Vec<f64> = rows.iter().map(|r| r.monetary).collect();
    RfmSummary {
        stations: rows.len(),
        avg_recency: average(&recency),
        avg_frequency: average(&frequency),
        avg_monetary: average(&monetary),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RfmMetric {
    /// Fewest days since the last reading first.
    Recency,
    /// Most PM2.5 readings first.
    Frequency,
    /// Highest CO total first.
    Monetary,
}

impl RfmMetric {
    pub const ALL: [RfmMetric; 3] = [RfmMetric::Recency, RfmMetric::Frequency, RfmMetric::Monetary];

    pub fn title(self) -> &'static str {
        match self {
            RfmMetric::Recency => "By Recency (days)",
            RfmMetric::Frequency => "By Frequency",
            RfmMetric::Monetary => "By Monetary",
        }
    }

    fn compare(self, a: &RfmRow, b: &RfmRow) -> Ordering {
        match self {
            RfmMetric::Recency => a.recency.cmp(&b.recency),
            RfmMetric::Frequency => b.frequency.cmp(&a.frequency),
            RfmMetric::Monetary => b
                .monetary
                .partial_cmp(&a.monetary)
                .unwrap_or(Ordering::Equal),
        }
    }
}

/// The `n` best stations for `metric`, ties broken by station name.
pub fn top_stations(rows: &[RfmRow], metric: RfmMetric, n: usize) -> Vec<RfmRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| metric.compare(a, b).then_with(|| a.station.cmp(&b.station)));
    ranked.truncate(n);
    ranked
}

/// Every table one report pass produces from a single view.
#[derive(Debug, Clone)]
pub struct ReportSet {
    pub station_month: Vec<StationMonthRow>,
    pub station_year: Vec<StationYearRow>,
    pub station_totals: Vec<StationTotalRow>,
    pub rfm: Vec<RfmRow>,
    pub summary: RfmSummary,
}

impl ReportSet {
    pub fn build(view: &FilteredView) -> Self {
        let rfm = rfm(view);
        let summary = rfm_summary(&rfm);
        Self {
            station_month: sum_by_station_month(view),
            station_year: sum_by_station_year(view),
            station_totals: sum_by_station(view),
            rfm,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter;
    use crate::types::Measurement;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn reading(station: &str, at: NaiveDateTime, pm25: Option<f64>, co: Option<f64>) -> Measurement {
        Measurement {
            station: station.to_string(),
            timestamp: at,
            pm25,
            co,
        }
    }

    fn full_view(records: &[Measurement]) -> FilteredView {
        let (min, max) = crate::filter::bounds(records).unwrap();
        filter(records, min, max).unwrap()
    }

    fn scenario() -> Vec<Measurement> {
        vec![
            reading("A", ts(2023, 1, 1, 0), Some(10.0), Some(1.0)),
            reading("A", ts(2023, 1, 2, 0), None, Some(2.0)),
            reading("B", ts(2023, 1, 1, 0), Some(5.0), Some(0.0)),
        ]
    }

    #[test]
    fn test_sum_by_station_scenario() {
        let rows = sum_by_station(&full_view(&scenario()));
        assert_eq!(
            rows,
            vec![
                StationTotalRow { station: "A".into(), pm25_total: 10.0 },
                StationTotalRow { station: "B".into(), pm25_total: 5.0 },
            ]
        );
    }

    #[test]
    fn test_rfm_scenario() {
        let rows = rfm(&full_view(&scenario()));
        assert_eq!(
            rows,
            vec![
                RfmRow { station: "A".into(), frequency: 1, monetary: 3.0, recency: 0 },
                RfmRow { station: "B".into(), frequency: 1, monetary: 0.0, recency: 1 },
            ]
        );
    }

    #[test]
    fn test_month_and_year_rollups_are_ordered() {
        let records = vec![
            reading("B", ts(2014, 2, 1, 0), Some(2.0), None),
            reading("A", ts(2013, 12, 31, 23), Some(1.0), None),
            reading("A", ts(2014, 1, 1, 0), Some(4.0), None),
            reading("A", ts(2013, 12, 1, 0), None, None),
            reading("B", ts(2013, 2, 1, 0), Some(3.0), None),
        ];
        let view = full_view(&records);

        let months: Vec<(String, u32, f64)> = sum_by_station_month(&view)
            .into_iter()
            .map(|r| (r.station, r.month, r.pm25_total))
            .collect();
        assert_eq!(
            months,
            vec![
                ("A".to_string(), 1, 4.0),
                ("A".to_string(), 12, 1.0),
                ("B".to_string(), 2, 5.0),
            ]
        );

        let years: Vec<(String, i32, f64)> = sum_by_station_year(&view)
            .into_iter()
            .map(|r| (r.station, r.year, r.pm25_total))
            .collect();
        assert_eq!(
            years,
            vec![
                ("A".to_string(), 2013, 1.0),
                ("A".to_string(), 2014, 4.0),
                ("B".to_string(), 2013, 3.0),
                ("B".to_string(), 2014, 2.0),
            ]
        );
    }

    #[test]
    fn test_station_totals_match_monthly_rollup() {
        let records = vec![
            reading("A", ts(2013, 3, 1, 0), Some(1.5), None),
            reading("A", ts(2013, 4, 1, 0), Some(2.5), None),
            reading("A", ts(2014, 3, 1, 0), Some(3.0), None),
            reading("B", ts(2013, 3, 5, 0), None, None),
            reading("B", ts(2013, 5, 5, 0), Some(7.0), None),
        ];
        let view = full_view(&records);

        let mut regrouped: HashMap<String, f64> = HashMap::new();
        for row in sum_by_station_month(&view) {
            *regrouped.entry(row.station).or_default() += row.pm25_total;
        }
        for row in sum_by_station(&view) {
            assert_eq!(regrouped[&row.station], row.pm25_total);
        }
        assert_eq!(regrouped.len(), 2);
    }

    #[test]
    fn test_recency_follows_view_maximum() {
        let records = vec![
            reading("A", ts(2023, 1, 1, 0), Some(1.0), None),
            reading("A", ts(2023, 1, 10, 0), Some(1.0), None),
            reading("B", ts(2023, 1, 5, 23), Some(1.0), None),
        ];
        let full = rfm(&full_view(&records));
        assert_eq!(full[1].recency, 5);

        let narrowed = filter(&records, ts(2023, 1, 1, 0), ts(2023, 1, 6, 0)).unwrap();
        let rows = rfm(&narrowed);
        assert_eq!(rows[0].recency, 4);
        assert_eq!(rows[1].recency, 0);
        assert!(rows.iter().all(|r| r.recency >= 0));
    }

    #[test]
    fn test_absent_station_is_omitted() {
        let records = vec![
            reading("A", ts(2023, 1, 1, 0), Some(1.0), None),
            reading("B", ts(2023, 3, 1, 0), Some(1.0), None),
        ];
        let view = filter(&records, ts(2023, 1, 1, 0), ts(2023, 1, 31, 0)).unwrap();
        let stations: Vec<String> = rfm(&view).into_iter().map(|r| r.station).collect();
        assert_eq!(stations, vec!["A"]);
    }

    #[test]
    fn test_empty_view_gives_empty_tables() {
        let view = filter(&scenario(), ts(2024, 1, 1, 0), ts(2024, 2, 1, 0)).unwrap();
        assert!(sum_by_station_month(&view).is_empty());
        assert!(sum_by_station_year(&view).is_empty());
        assert!(sum_by_station(&view).is_empty());
        assert!(rfm(&view).is_empty());

        let summary = rfm_summary(&[]);
        assert_eq!(summary.stations, 0);
        assert_eq!(summary.avg_recency, 0.0);
    }

    #[test]
    fn test_rfm_summary_means() {
        let rows = rfm(&full_view(&scenario()));
        let summary = rfm_summary(&rows);
        assert_eq!(summary.stations, 2);
        assert_eq!(summary.avg_recency, 0.5);
        assert_eq!(summary.avg_frequency, 1.0);
        assert_eq!(summary.avg_monetary, 1.5);
    }

    #[test]
    fn test_top_stations_per_metric() {
        let rows = vec![
            RfmRow { station: "A".into(), frequency: 10, monetary: 5.0, recency: 2 },
            RfmRow { station: "B".into(), frequency: 30, monetary: 1.0, recency: 0 },
            RfmRow { station: "C".into(), frequency: 30, monetary: 9.0, recency: 0 },
        ];
        let names = |metric| -> Vec<String> {
            top_stations(&rows, metric, 2)
                .into_iter()
                .map(|r| r.station)
                .collect()
        };
        assert_eq!(names(RfmMetric::Recency), vec!["B", "C"]);
        assert_eq!(names(RfmMetric::Frequency), vec!["B", "C"]);
        assert_eq!(names(RfmMetric::Monetary), vec!["C", "A"]);
    }
}
