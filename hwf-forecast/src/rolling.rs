//! Rolling multi-day forecasts
//!
//! Days are always processed in increasing date order within one call:
//! the lag features of a day may point at a day that was itself predicted
//! earlier in the same loop.

use crate::error::{ForecastError, Result};
use crate::features::FeatureRow;
use crate::model::{Classifier, Regressor};
use chrono::{Datelike, NaiveDate};
use hwf_core::daily::{DailyRecord, DailyTable};
use hwf_core::date_range::DateRange;
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;

/// Predicted daily maximum for one requested day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    pub temp_max_pred: f64,
}

/// A forecast day that had full lag depth and was labelled by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatWaveRecord {
    pub date: NaiveDate,
    pub temp_max_pred: f64,
    pub heat_pred: bool,
}

/// Output of the temperature pass together with the working history it built.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureForecast {
    pub records: Vec<ForecastRecord>,
    /// Private copy of the daily table with every forecast day appended.
    pub history: DailyTable,
}

/// Predict one daily maximum per day in `[start, end]`.
///
/// Returns an empty sequence when `start > end`. `daily_table` is not
/// modified.
pub fn forecast_daily_temp<R>(
    start: NaiveDate,
    end: NaiveDate,
    daily_table: &DailyTable,
    regressor: &R,
) -> Result<Vec<ForecastRecord>>
where
    R: Regressor + ?Sized,
{
    forecast_with_history(start, end, daily_table, regressor).map(|forecast| forecast.records)
}

/// Temperature pass that also hands back the working history.
///
/// For each day the baseline is the mean `temp_max` of that month across the
/// working history as it stands, forecast days included. A lag day missing
/// from the history is replaced by that baseline.
pub fn forecast_with_history<R>(
    start: NaiveDate,
    end: NaiveDate,
    daily_table: &DailyTable,
    regressor: &R,
) -> Result<TemperatureForecast>
where
    R: Regressor + ?Sized,
{
    let mut history = daily_table.clone();
    let threshold_delta = history.threshold_delta();
    let lags = history.lags().to_vec();
    let mut records = Vec::new();

    for date in DateRange(start, end) {
        let month = date.month();
        let hist_mean = history
            .running_mean(month)
            .ok_or(ForecastError::MissingBaseline { month })?;
        let lag_values: Vec<(u32, f64)> = lags
            .iter()
            .map(|&k| (k, history.temp_max_before(date, k).unwrap_or(hist_mean)))
            .collect();

        let row = FeatureRow::new(month, hist_mean, lag_values);
        let temp_max_pred = regressor.predict(&row)?;
        if !temp_max_pred.is_finite() {
            return Err(ForecastError::NonFinitePrediction { date });
        }
        debug!(
            "{}: predicted {:.2} (baseline {:.2}, lags {:?})",
            date, temp_max_pred, hist_mean, row.lags
        );

        let used_lags: BTreeMap<u32, Option<f64>> =
            row.lags.iter().map(|&(k, v)| (k, Some(v))).collect();
        history.insert(DailyRecord::new(
            date,
            temp_max_pred,
            hist_mean,
            threshold_delta,
            used_lags,
        ));
        records.push(ForecastRecord {
            date,
            temp_max_pred,
        });
    }

    info!(
        "Temperature pass: {} days forecast from {} to {}",
        records.len(),
        start,
        end
    );
    Ok(TemperatureForecast { records, history })
}

/// Build classifier rows from a forecast sequence.
///
/// `hist_mean` comes from the frozen historical monthly means of
/// `daily_table`; lag `k` of position `i` is the prediction at position
/// `i - k`. Days with any missing feature are `None`.
pub fn classifier_features(
    forecast: &[ForecastRecord],
    daily_table: &DailyTable,
) -> Vec<Option<FeatureRow>> {
    forecast
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let month = record.date.month();
            let hist_mean = daily_table.historical_mean(month)?;
            let lags = daily_table
                .lags()
                .iter()
                .map(|&k| {
                    let back = usize::try_from(k).ok()?;
                    let position = i.checked_sub(back)?;
                    Some((k, forecast[position].temp_max_pred))
                })
                .collect::<Option<Vec<(u32, f64)>>>()?;
            Some(FeatureRow::new(month, hist_mean, lags))
        })
        .collect()
}

/// Forecast `[start, end]` and label each day that has full lag depth.
///
/// The first `max(lags)` days of the window never have complete features
/// and are dropped, so a window no longer than the deepest lag yields an
/// empty sequence.
pub fn predict_heat_wave<R, C>(
    start: NaiveDate,
    end: NaiveDate,
    daily_table: &DailyTable,
    regressor: &R,
    classifier: &C,
) -> Result<Vec<HeatWaveRecord>>
where
    R: Regressor + ?Sized,
    C: Classifier + ?Sized,
{
    let forecast = forecast_daily_temp(start, end, daily_table, regressor)?;
    let (kept, rows): (Vec<ForecastRecord>, Vec<FeatureRow>) = forecast
        .iter()
        .zip(classifier_features(&forecast, daily_table))
        .filter_map(|(record, row)| row.map(|row| (*record, row)))
        .unzip();

    if rows.is_empty() {
        info!(
            "Classification pass: none of {} days has full lag depth",
            forecast.len()
        );
        return Ok(Vec::new());
    }

    let labels = classifier.predict(&rows)?;
    if labels.len() != rows.len() {
        return Err(ForecastError::ClassifierOutput {
            expected: rows.len(),
            got: labels.len(),
        });
    }

    let result: Vec<HeatWaveRecord> = kept
        .into_iter()
        .zip(labels)
        .map(|(record, heat_pred)| HeatWaveRecord {
            date: record.date,
            temp_max_pred: record.temp_max_pred,
            heat_pred,
        })
        .collect();
    info!(
        "Classification pass: {} of {} days classified, {} heat-wave days",
        result.len(),
        forecast.len(),
        result.iter().filter(|r| r.heat_pred).count()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinearRegressor, LogisticClassifier};
    use hwf_core::observation::{HistoricalSeries, Observation};
    use hwf_data::features::build_daily_table;
    use std::cell::RefCell;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(days: &[(NaiveDate, f64)]) -> HistoricalSeries {
        HistoricalSeries::new(
            days.iter()
                .map(|&(date, temp)| {
                    Observation::new(date.and_hms_opt(15, 0, 0).unwrap(), temp)
                })
                .collect(),
        )
    }

    /// Every July day of 2020 at `temp`.
    fn july_table(temp: f64) -> DailyTable {
        let days: Vec<(NaiveDate, f64)> = DateRange(day(2020, 7, 1), day(2020, 7, 31))
            .map(|d| (d, temp))
            .collect();
        build_daily_table(&series(&days), &[1, 2, 3], 5.0).unwrap()
    }

    struct ConstantRegressor(f64);

    impl Regressor for ConstantRegressor {
        fn predict(&self, _row: &FeatureRow) -> Result<f64> {
            Ok(self.0)
        }
    }

    /// Returns lag 1 plus one and remembers every row it saw.
    #[derive(Default)]
    struct RecordingRegressor {
        rows: RefCell<Vec<FeatureRow>>,
    }

    impl Regressor for RecordingRegressor {
        fn predict(&self, row: &FeatureRow) -> Result<f64> {
            self.rows.borrow_mut().push(row.clone());
            Ok(row.lag(1).unwrap_or(row.hist_mean) + 1.0)
        }
    }

    /// Labels a row hot when lag 1 is at or above its threshold + delta.
    struct LagThresholdClassifier {
        delta: f64,
        rows: RefCell<Vec<FeatureRow>>,
    }

    impl Classifier for LagThresholdClassifier {
        fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<bool>> {
            self.rows.borrow_mut().extend_from_slice(rows);
            Ok(rows
                .iter()
                .map(|row| row.lag(1).unwrap_or(f64::MIN) >= row.hist_mean + self.delta)
                .collect())
        }
    }

    fn lag_classifier() -> LagThresholdClassifier {
        LagThresholdClassifier {
            delta: 5.0,
            rows: RefCell::new(Vec::new()),
        }
    }

    struct ShortClassifier;

    impl Classifier for ShortClassifier {
        fn predict(&self, _rows: &[FeatureRow]) -> Result<Vec<bool>> {
            Ok(vec![true])
        }
    }

    #[test]
    fn test_one_record_per_requested_day() {
        let table = july_table(20.0);
        let forecast =
            forecast_daily_temp(day(2021, 7, 1), day(2021, 7, 10), &table, &ConstantRegressor(21.0))
                .unwrap();
        assert_eq!(forecast.len(), 10);
        let dates: Vec<NaiveDate> = forecast.iter().map(|r| r.date).collect();
        assert_eq!(dates, DateRange(day(2021, 7, 1), day(2021, 7, 10)).collect::<Vec<_>>());
    }

    #[test]
    fn test_unbounded_range_fails_without_preallocating() {
        let table = july_table(20.0);
        let result = forecast_daily_temp(
            NaiveDate::MIN,
            NaiveDate::MAX,
            &table,
            &ConstantRegressor(21.0),
        );
        assert!(matches!(
            result,
            Err(ForecastError::MissingBaseline { month: 1 })
        ));
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let table = july_table(20.0);
        let regressor = RecordingRegressor::default();
        let forecast =
            forecast_daily_temp(day(2021, 7, 10), day(2021, 7, 1), &table, &regressor).unwrap();
        assert!(forecast.is_empty());
        assert!(regressor.rows.borrow().is_empty());
    }

    #[test]
    fn test_month_without_history_stops_the_pass() {
        let table = july_table(20.0);
        let regressor = RecordingRegressor::default();
        let forecast =
            forecast_daily_temp(day(2020, 7, 29), day(2020, 8, 2), &table, &regressor);
        // 1 August has no August history yet
        assert!(matches!(
            forecast,
            Err(ForecastError::MissingBaseline { month: 8 })
        ));
        // the three July days were predicted before the failure
        assert_eq!(regressor.rows.borrow().len(), 3);
    }

    #[test]
    fn test_lag_lookup_uses_history_then_predictions() {
        // history ends 31 July; forecast continues straight on from it
        let days: Vec<(NaiveDate, f64)> = DateRange(day(2020, 7, 1), day(2020, 7, 31))
            .map(|d| (d, 20.0))
            .chain(DateRange(day(2020, 8, 1), day(2020, 8, 5)).map(|d| (d, 22.0)))
            .collect();
        let table = build_daily_table(&series(&days), &[1, 2, 3], 5.0).unwrap();
        let regressor = RecordingRegressor::default();
        let forecast =
            forecast_daily_temp(day(2020, 8, 6), day(2020, 8, 8), &table, &regressor).unwrap();

        let rows = regressor.rows.borrow();
        // 6 Aug: every lag is observed history
        assert_eq!(rows[0].lags, vec![(1, 22.0), (2, 22.0), (3, 22.0)]);
        assert_eq!(forecast[0].temp_max_pred, 23.0);
        // 7 Aug: lag 1 is the 6 Aug prediction
        assert_eq!(rows[1].lag(1), Some(23.0));
        assert_eq!(rows[1].lag(2), Some(22.0));
        // 8 Aug: lags 1 and 2 are predictions
        assert_eq!(rows[2].lag(1), Some(24.0));
        assert_eq!(rows[2].lag(2), Some(23.0));
        assert_eq!(rows[2].lag(3), Some(22.0));
        assert_eq!(forecast[2].temp_max_pred, 25.0);
    }

    #[test]
    fn test_missing_lag_days_fall_back_to_month_mean() {
        let table = july_table(20.0);
        let regressor = RecordingRegressor::default();
        // a year after the history: no lag day is present
        forecast_daily_temp(day(2021, 7, 10), day(2021, 7, 10), &table, &regressor).unwrap();
        let rows = regressor.rows.borrow();
        assert_eq!(rows[0].month, 7);
        assert_eq!(rows[0].hist_mean, 20.0);
        assert_eq!(rows[0].lags, vec![(1, 20.0), (2, 20.0), (3, 20.0)]);
    }

    #[test]
    fn test_baseline_includes_earlier_forecast_days() {
        let table = july_table(20.0);
        let regressor = RecordingRegressor::default();
        forecast_daily_temp(day(2021, 7, 1), day(2021, 7, 2), &table, &regressor).unwrap();
        let rows = regressor.rows.borrow();
        assert_eq!(rows[0].hist_mean, 20.0);
        // 31 days at 20.0 plus the 1 July prediction of 21.0
        assert_eq!(rows[1].hist_mean, (31.0 * 20.0 + 21.0) / 32.0);
        // the canonical baseline is untouched
        assert_eq!(table.historical_mean(7), Some(20.0));
    }

    #[test]
    fn test_forecast_is_idempotent_and_leaves_table_alone() {
        let table = july_table(20.0);
        let snapshot = table.clone();
        let regressor = RecordingRegressor::default();
        let first =
            forecast_daily_temp(day(2021, 7, 1), day(2021, 7, 7), &table, &regressor).unwrap();
        let second =
            forecast_daily_temp(day(2021, 7, 1), day(2021, 7, 7), &table, &regressor).unwrap();
        assert_eq!(first, second);
        assert_eq!(table, snapshot);
    }

    #[test]
    fn test_working_history_labels() {
        // hist_mean 25.0 for July
        let table = july_table(25.0);
        let hot = forecast_with_history(
            day(2021, 7, 1),
            day(2021, 7, 1),
            &table,
            &ConstantRegressor(30.0),
        )
        .unwrap();
        let record = hot.history.get(&day(2021, 7, 1)).unwrap();
        assert_eq!(record.threshold, 30.0);
        assert!(record.heat_label);
        assert_eq!(hot.history.len(), table.len() + 1);

        let mild = forecast_with_history(
            day(2021, 7, 1),
            day(2021, 7, 1),
            &table,
            &ConstantRegressor(29.9),
        )
        .unwrap();
        assert!(!mild.history.get(&day(2021, 7, 1)).unwrap().heat_label);
    }

    #[test]
    fn test_constant_hot_regressor_labels_every_day() {
        let table = july_table(20.0);
        let forecast = forecast_with_history(
            day(2021, 7, 1),
            day(2021, 7, 10),
            &table,
            &ConstantRegressor(28.0),
        )
        .unwrap();
        assert_eq!(forecast.records.len(), 10);
        for record in &forecast.records {
            let day_record = forecast.history.get(&record.date).unwrap();
            assert!(day_record.heat_label, "{} should be labelled", record.date);
        }
    }

    #[test]
    fn test_non_finite_prediction_is_an_error() {
        let table = july_table(20.0);
        let result = forecast_daily_temp(
            day(2021, 7, 1),
            day(2021, 7, 3),
            &table,
            &ConstantRegressor(f64::NAN),
        );
        assert!(matches!(
            result,
            Err(ForecastError::NonFinitePrediction { .. })
        ));
    }

    #[test]
    fn test_model_errors_propagate() {
        let table = july_table(20.0);
        let regressor =
            LinearRegressor::new(vec!["max_lag_9d".to_string()], vec![1.0], 0.0).unwrap();
        let result = forecast_daily_temp(day(2021, 7, 1), day(2021, 7, 3), &table, &regressor);
        assert!(matches!(result, Err(ForecastError::MalformedFeatures(_))));
    }

    #[test]
    fn test_classifier_features_shift_predicted_series() {
        let table = july_table(20.0);
        let forecast: Vec<ForecastRecord> = DateRange(day(2021, 7, 1), day(2021, 7, 5))
            .zip([21.0, 22.0, 23.0, 24.0, 25.0])
            .map(|(date, temp_max_pred)| ForecastRecord {
                date,
                temp_max_pred,
            })
            .collect();
        let rows = classifier_features(&forecast, &table);
        assert_eq!(rows.len(), 5);
        assert!(rows[..3].iter().all(Option::is_none));
        let fourth = rows[3].as_ref().unwrap();
        assert_eq!(fourth.hist_mean, 20.0);
        assert_eq!(fourth.lags, vec![(1, 23.0), (2, 22.0), (3, 21.0)]);
        let fifth = rows[4].as_ref().unwrap();
        assert_eq!(fifth.lags, vec![(1, 24.0), (2, 23.0), (3, 22.0)]);
    }

    #[test]
    fn test_classifier_features_drop_months_without_history() {
        let table = july_table(20.0);
        let forecast: Vec<ForecastRecord> = DateRange(day(2021, 8, 1), day(2021, 8, 5))
            .map(|date| ForecastRecord {
                date,
                temp_max_pred: 20.0,
            })
            .collect();
        assert!(classifier_features(&forecast, &table)
            .iter()
            .all(Option::is_none));
    }

    #[test]
    fn test_short_range_yields_no_heat_wave_records() {
        let table = july_table(20.0);
        let classifier = lag_classifier();
        let records = predict_heat_wave(
            day(2021, 7, 1),
            day(2021, 7, 2),
            &table,
            &ConstantRegressor(28.0),
            &classifier,
        )
        .unwrap();
        assert!(records.is_empty());
        assert!(classifier.rows.borrow().is_empty());

        let records = predict_heat_wave(
            day(2021, 7, 1),
            day(2021, 7, 3),
            &table,
            &ConstantRegressor(28.0),
            &classifier,
        )
        .unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_heat_wave_uses_frozen_baseline_and_predicted_lags() {
        let table = july_table(20.0);
        let classifier = lag_classifier();
        let records = predict_heat_wave(
            day(2021, 7, 1),
            day(2021, 7, 10),
            &table,
            &ConstantRegressor(28.0),
            &classifier,
        )
        .unwrap();
        assert_eq!(records.len(), 7);
        assert_eq!(records[0].date, day(2021, 7, 4));
        assert_eq!(records[6].date, day(2021, 7, 10));
        assert!(records.iter().all(|r| r.heat_pred && r.temp_max_pred == 28.0));

        let rows = classifier.rows.borrow();
        assert!(rows.iter().all(|row| row.hist_mean == 20.0));
        assert!(rows
            .iter()
            .all(|row| row.lags == vec![(1, 28.0), (2, 28.0), (3, 28.0)]));
    }

    #[test]
    fn test_heat_wave_with_logistic_classifier() {
        let table = july_table(25.0);
        let classifier = LogisticClassifier::new(
            vec!["max_lag_1d".to_string(), "hist_mean".to_string()],
            vec![1.0, -1.0],
            -5.0,
        )
        .unwrap();
        let regressor = RecordingRegressor::default();
        let records = predict_heat_wave(
            day(2021, 7, 1),
            day(2021, 7, 12),
            &table,
            &regressor,
            &classifier,
        )
        .unwrap();
        assert_eq!(records.len(), 9);
        // predictions climb 26, 27, ... so lag 1 reaches 30 on 6 July
        let hot: Vec<NaiveDate> = records
            .iter()
            .filter(|r| r.heat_pred)
            .map(|r| r.date)
            .collect();
        assert_eq!(hot.first(), Some(&day(2021, 7, 6)));
        assert_eq!(hot.len(), 7);
        assert!(!records[0].heat_pred);
    }

    #[test]
    fn test_classifier_output_length_checked() {
        let table = july_table(20.0);
        let result = predict_heat_wave(
            day(2021, 7, 1),
            day(2021, 7, 10),
            &table,
            &ConstantRegressor(28.0),
            &ShortClassifier,
        );
        assert!(matches!(
            result,
            Err(ForecastError::ClassifierOutput {
                expected: 7,
                got: 1
            })
        ));
    }
}
