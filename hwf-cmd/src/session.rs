//! One-time initialization of the forecasting state.
//!
//! A `Session` holds the loaded history, the canonical daily table and both
//! models. It is built once per process and only ever borrowed afterwards.

use anyhow::Context;
use chrono::NaiveDate;
use hwf_core::config::ForecastConfig;
use hwf_core::daily::DailyTable;
use hwf_core::observation::HistoricalSeries;
use hwf_data::features::build_daily_table;
use hwf_forecast::{
    forecast_daily_temp, predict_heat_wave, ForecastRecord, HeatWaveRecord, LinearRegressor,
    LogisticClassifier,
};
use hwf_utils::dates::window_end;
use hwf_utils::input::read_text_file;
use log::info;

/// Locations of the files a session is built from.
#[derive(Debug, Clone)]
pub struct SessionPaths {
    pub history: String,
    pub regressor: String,
    pub classifier: String,
    pub delimiter: u8,
}

#[derive(Debug)]
pub struct Session {
    config: ForecastConfig,
    series: HistoricalSeries,
    daily: DailyTable,
    regressor: LinearRegressor,
    classifier: LogisticClassifier,
}

impl Session {
    /// Read every input file and build the canonical daily table.
    pub fn load(paths: &SessionPaths, config: ForecastConfig) -> anyhow::Result<Session> {
        let history = read_text_file(&paths.history)?;
        let regressor = LinearRegressor::load(&paths.regressor)
            .with_context(|| format!("failed to load regressor {}", paths.regressor))?;
        let classifier = LogisticClassifier::load(&paths.classifier)
            .with_context(|| format!("failed to load classifier {}", paths.classifier))?;
        let session = Session::assemble(&history, paths.delimiter, regressor, classifier, config)?;
        info!(
            "Session ready: {} observations from {}",
            session.series.len(),
            paths.history
        );
        Ok(session)
    }

    /// Build a session from in-memory CSV and JSON text.
    pub fn from_sources(
        history_csv: &str,
        delimiter: u8,
        regressor_json: &str,
        classifier_json: &str,
        config: ForecastConfig,
    ) -> anyhow::Result<Session> {
        let regressor =
            LinearRegressor::from_json_str(regressor_json).context("invalid regressor artifact")?;
        let classifier = LogisticClassifier::from_json_str(classifier_json)
            .context("invalid classifier artifact")?;
        Session::assemble(history_csv, delimiter, regressor, classifier, config)
    }

    fn assemble(
        history_csv: &str,
        delimiter: u8,
        regressor: LinearRegressor,
        classifier: LogisticClassifier,
        config: ForecastConfig,
    ) -> anyhow::Result<Session> {
        let config = config.validated()?;
        let series = HistoricalSeries::from_csv_str(history_csv, delimiter)
            .context("failed to parse historical series")?;
        let daily = build_daily_table(&series, &config.lags, config.threshold_delta)?;
        Ok(Session {
            config,
            series,
            daily,
            regressor,
            classifier,
        })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn series(&self) -> &HistoricalSeries {
        &self.series
    }

    pub fn daily_table(&self) -> &DailyTable {
        &self.daily
    }

    /// Fill in the window defaults: start is `today`, end covers the horizon.
    pub fn window(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> anyhow::Result<(NaiveDate, NaiveDate)> {
        let start = start.unwrap_or(today);
        let end = match end {
            Some(end) => end,
            None => window_end(start, self.config.horizon_days)
                .with_context(|| format!("forecast horizon from {start} is out of range"))?,
        };
        Ok((start, end))
    }

    pub fn forecast(&self, start: NaiveDate, end: NaiveDate) -> anyhow::Result<Vec<ForecastRecord>> {
        Ok(forecast_daily_temp(start, end, &self.daily, &self.regressor)?)
    }

    pub fn heat_wave(&self, start: NaiveDate, end: NaiveDate) -> anyhow::Result<Vec<HeatWaveRecord>> {
        Ok(predict_heat_wave(
            start,
            end,
            &self.daily,
            &self.regressor,
            &self.classifier,
        )?)
    }
}
