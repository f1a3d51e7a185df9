//! Daily feature building for historical temperature observations.
//!
//! This crate turns a raw timestamped series into the per-day table the
//! forecaster works from: daily maxima, monthly baselines, heat-wave
//! thresholds and labels, and fixed-lag lookback features.

/// Aggregation of raw observations into calendar days
pub mod aggregate {
    use chrono::{Datelike, NaiveDate};
    use hwf_core::observation::HistoricalSeries;
    use std::collections::BTreeMap;

    /// Maximum observed temperature per calendar day.
    ///
    /// Days without observations are absent; nothing is interpolated.
    pub fn daily_max(series: &HistoricalSeries) -> BTreeMap<NaiveDate, f64> {
        let mut result: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for obs in series.observations() {
            result
                .entry(obs.date())
                .and_modify(|max| *max = max.max(obs.temperature))
                .or_insert(obs.temperature);
        }
        result
    }

    /// Arithmetic mean of the daily maxima of each month (1-12), across all years.
    pub fn monthly_means(daily: &BTreeMap<NaiveDate, f64>) -> BTreeMap<u32, f64> {
        let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
        for (date, temp_max) in daily {
            let entry = sums.entry(date.month()).or_insert((0.0, 0));
            entry.0 += temp_max;
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(month, (sum, count))| (month, sum / count as f64))
            .collect()
    }

}

/// The daily feature table builder
pub mod features {
    use crate::aggregate::{daily_max, monthly_means};
    use chrono::{Datelike, Days};
    use hwf_core::config::normalize_lags;
    use hwf_core::daily::{DailyRecord, DailyTable};
    use hwf_core::error::{HwfError, Result};
    use hwf_core::observation::HistoricalSeries;
    use log::info;
    use std::collections::BTreeMap;

    /// Build the canonical per-day table from a historical series.
    ///
    /// Monthly means are computed once over the whole aggregated history and
    /// shared by every day of that month. Lag `k` of a day is the maximum of
    /// the day exactly `k` calendar days earlier, or `None` if that day has no
    /// observations.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hwf_core::observation::HistoricalSeries;
    /// use hwf_data::features::build_daily_table;
    ///
    /// let csv = "data;temp\n2021-07-01 12:00;24.0\n2021-07-02 12:00;36.0\n";
    /// let series = HistoricalSeries::from_csv_str(csv, b';').unwrap();
    /// let table = build_daily_table(&series, &[1, 2, 3], 5.0).unwrap();
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.historical_mean(7), Some(30.0));
    /// ```
    pub fn build_daily_table(
        series: &HistoricalSeries,
        lags: &[u32],
        threshold_delta: f64,
    ) -> Result<DailyTable> {
        if series.is_empty() {
            return Err(HwfError::EmptyHistory);
        }
        let lags = normalize_lags(lags)?;
        let daily = daily_max(series);
        let means = monthly_means(&daily);

        let mut records = Vec::with_capacity(daily.len());
        for (&date, &temp_max) in &daily {
            let hist_mean = means[&date.month()];
            let lag_values: BTreeMap<u32, Option<f64>> = lags
                .iter()
                .map(|&k| {
                    let earlier = date
                        .checked_sub_days(Days::new(u64::from(k)))
                        .and_then(|d| daily.get(&d).copied());
                    (k, earlier)
                })
                .collect();
            records.push(DailyRecord::new(
                date,
                temp_max,
                hist_mean,
                threshold_delta,
                lag_values,
            ));
        }

        let table = DailyTable::from_parts(records, means, lags, threshold_delta);
        info!(
            "Built daily table: {} days from {} observations ({:?} to {:?})",
            table.len(),
            series.len(),
            table.first_date(),
            table.last_date()
        );
        Ok(table)
    }

}
