//! Subcommand implementations: forecast, heat-wave and the full report.

use crate::overlay::{build_overlay, heat_wave_flag, DistrictOverlay};
use crate::render::{
    render_forecast, render_heat_days, render_heat_wave, render_overlay, to_csv, OutputFormat,
};
use crate::session::{Session, SessionPaths};
use crate::{Inputs, Window};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use hwf_core::config::ForecastConfig;
use hwf_core::district::District;
use hwf_forecast::{ForecastRecord, HeatWaveRecord};
use hwf_utils::input::read_text_file;
use log::info;
use serde::Serialize;

/// Everything the dashboard view shows for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub forecast: Vec<ForecastRecord>,
    pub heat_wave: Vec<HeatWaveRecord>,
    pub heat_wave_flag: u8,
    pub overlay: Vec<DistrictOverlay>,
}

/// Load the configuration and every input named on the command line.
pub fn open_session(inputs: &Inputs) -> anyhow::Result<Session> {
    let config = match &inputs.config {
        Some(path) => ForecastConfig::load(path)
            .with_context(|| format!("failed to load config {}", path))?,
        None => ForecastConfig::default(),
    };
    let paths = SessionPaths {
        history: inputs.history.clone(),
        regressor: inputs.regressor.clone(),
        classifier: inputs.classifier.clone(),
        delimiter: delimiter(inputs)?,
    };
    Session::load(&paths, config)
}

fn delimiter(inputs: &Inputs) -> anyhow::Result<u8> {
    u8::try_from(inputs.delimiter).map_err(|_| {
        anyhow::anyhow!(
            "delimiter must be a single-byte character, got {:?}",
            inputs.delimiter
        )
    })
}

fn today() -> NaiveDate {
    Local::now().naive_local().date()
}

pub fn run_forecast(inputs: &Inputs, window: Window, format: OutputFormat) -> anyhow::Result<()> {
    let session = open_session(inputs)?;
    let (start, end) = session.window(window.start, window.end, today())?;
    info!("Forecasting daily maximum from {} to {}", start, end);
    let records = session.forecast(start, end)?;
    print!("{}", render_forecast(&records, format)?);
    Ok(())
}

pub fn run_heat_wave(inputs: &Inputs, window: Window, format: OutputFormat) -> anyhow::Result<()> {
    let session = open_session(inputs)?;
    let (start, end) = session.window(window.start, window.end, today())?;
    info!(
        "Classifying heat-wave days from {} to {} (first {} days lack full lag depth)",
        start,
        end,
        session.config().max_lag()
    );
    let records = session.heat_wave(start, end)?;
    print!("{}", render_heat_wave(&records, format)?);
    Ok(())
}

pub fn run_report(
    inputs: &Inputs,
    window: Window,
    districts_csv: Option<&str>,
    overlay_csv: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let session = open_session(inputs)?;
    let (start, end) = session.window(window.start, window.end, today())?;
    let districts = match districts_csv {
        Some(path) => {
            let text = read_text_file(path)?;
            District::parse_district_csv(&text, delimiter(inputs)?)
                .with_context(|| format!("failed to parse districts {}", path))?
        }
        None => Vec::new(),
    };

    let report = build_report(&session, start, end, &districts)?;
    if let Some(path) = overlay_csv {
        std::fs::write(path, to_csv(&report.overlay)?)
            .with_context(|| format!("failed to write overlay {}", path))?;
        info!("Overlay for {} districts written to {}", report.overlay.len(), path);
    }
    print!("{}", render_report(&report, format)?);
    Ok(())
}

/// Run both passes over `[start, end]` and attach the district overlay.
pub fn build_report(
    session: &Session,
    start: NaiveDate,
    end: NaiveDate,
    districts: &[District],
) -> anyhow::Result<Report> {
    let forecast = session.forecast(start, end)?;
    let heat_wave = session.heat_wave(start, end)?;
    let overlay = build_overlay(districts, &heat_wave);
    Ok(Report {
        start,
        end,
        heat_wave_flag: heat_wave_flag(&heat_wave),
        forecast,
        heat_wave,
        overlay,
    })
}

pub fn render_report(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        let mut out = serde_json::to_string_pretty(report)?;
        out.push('\n');
        return Ok(out);
    }
    let mut out = format!("Daily temperature forecast ({} to {})\n", report.start, report.end);
    out.push_str(&render_forecast(&report.forecast, format)?);
    out.push_str("\nPredicted heat-wave days\n");
    out.push_str(&render_heat_days(&report.heat_wave, format)?);
    if !report.overlay.is_empty() {
        out.push_str("\nHeat-wave overlay by district\n");
        out.push_str(&render_overlay(&report.overlay, format)?);
    }
    Ok(out)
}
