use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Column name of a lag feature, e.g. `max_lag_1d`.
pub fn lag_column(days: u32) -> String {
    format!("max_lag_{days}d")
}

/// One calendar day of the working temperature history.
///
/// For historical days `temp_max` is the observed daily maximum; for days
/// appended by a forecast it is the predicted maximum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub temp_max: f64,
    /// Calendar month, 1-12.
    pub month: u32,
    pub hist_mean: f64,
    pub threshold: f64,
    pub heat_label: bool,
    /// Lag depth in days -> `temp_max` that many days earlier, if known.
    pub lags: BTreeMap<u32, Option<f64>>,
}

impl DailyRecord {
    /// Derive month, threshold and heat label for a day.
    pub fn new(
        date: NaiveDate,
        temp_max: f64,
        hist_mean: f64,
        threshold_delta: f64,
        lags: BTreeMap<u32, Option<f64>>,
    ) -> Self {
        let threshold = hist_mean + threshold_delta;
        DailyRecord {
            date,
            temp_max,
            month: date.month(),
            hist_mean,
            threshold,
            heat_label: temp_max >= threshold,
            lags,
        }
    }

    /// Lag value at `days`, `None` when the day was absent or the lag is unknown.
    pub fn lag(&self, days: u32) -> Option<f64> {
        self.lags.get(&days).copied().flatten()
    }
}

/// Per-day history keyed by date, plus the monthly baselines computed once
/// from the original observations.
///
/// The canonical table is never modified by a forecast; forecasters clone it
/// and append predicted days to the clone.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyTable {
    records: BTreeMap<NaiveDate, DailyRecord>,
    monthly_means: BTreeMap<u32, f64>,
    lags: Vec<u32>,
    threshold_delta: f64,
}

impl DailyTable {
    /// Assemble a table from already-derived records and frozen monthly means.
    pub fn from_parts(
        records: impl IntoIterator<Item = DailyRecord>,
        monthly_means: BTreeMap<u32, f64>,
        lags: Vec<u32>,
        threshold_delta: f64,
    ) -> Self {
        DailyTable {
            records: records.into_iter().map(|r| (r.date, r)).collect(),
            monthly_means,
            lags,
            threshold_delta,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Configured lag depths, ascending.
    pub fn lags(&self) -> &[u32] {
        &self.lags
    }

    pub fn threshold_delta(&self) -> f64 {
        self.threshold_delta
    }

    pub fn get(&self, date: &NaiveDate) -> Option<&DailyRecord> {
        self.records.get(date)
    }

    /// Daily maximum for `date`, if that day is present.
    pub fn temp_max(&self, date: &NaiveDate) -> Option<f64> {
        self.records.get(date).map(|r| r.temp_max)
    }

    /// Daily maximum `days` days before `date`, if that day is present.
    pub fn temp_max_before(&self, date: NaiveDate, days: u32) -> Option<f64> {
        date.checked_sub_days(Days::new(u64::from(days)))
            .and_then(|earlier| self.temp_max(&earlier))
    }

    /// Records in chronological order.
    pub fn records(&self) -> impl Iterator<Item = &DailyRecord> {
        self.records.values()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.keys().next_back().copied()
    }

    /// Monthly mean computed from the original history only.
    pub fn historical_mean(&self, month: u32) -> Option<f64> {
        self.monthly_means.get(&month).copied()
    }

    /// Mean `temp_max` over every record currently in the table for `month`,
    /// including any appended forecast days.
    pub fn running_mean(&self, month: u32) -> Option<f64> {
        let (sum, count) = self
            .records
            .values()
            .filter(|r| r.month == month)
            .fold((0.0, 0usize), |(sum, count), r| (sum + r.temp_max, count + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Insert a day, replacing any record already held for that date.
    pub fn insert(&mut self, record: DailyRecord) -> Option<DailyRecord> {
        self.records.insert(record.date, record)
    }
}
