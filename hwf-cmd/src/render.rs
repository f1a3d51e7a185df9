//! Text, CSV and JSON rendering of forecast results.

use crate::overlay::DistrictOverlay;
use clap::ValueEnum;
use hwf_forecast::{ForecastRecord, HeatWaveRecord};
use hwf_utils::dates::format_date;
use serde::Serialize;
use std::fmt::Write;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned text table
    Table,
    /// CSV with a header row
    Csv,
    /// JSON array
    Json,
}

pub fn render_forecast(records: &[ForecastRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => {
            let mut out = format!("{:<12}{:>15}\n", "date", "temp_max_pred");
            for record in records {
                writeln!(
                    out,
                    "{:<12}{:>15.2}",
                    format_date(&record.date),
                    record.temp_max_pred
                )?;
            }
            Ok(out)
        }
        OutputFormat::Csv => to_csv(records),
        OutputFormat::Json => to_json(records),
    }
}

pub fn render_heat_wave(records: &[HeatWaveRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => {
            let mut out = format!("{:<12}{:>15}{:>11}\n", "date", "temp_max_pred", "heat_pred");
            for record in records {
                writeln!(
                    out,
                    "{:<12}{:>15.2}{:>11}",
                    format_date(&record.date),
                    record.temp_max_pred,
                    u8::from(record.heat_pred)
                )?;
            }
            Ok(out)
        }
        OutputFormat::Csv => to_csv(records),
        OutputFormat::Json => to_json(records),
    }
}

/// Every date returned by the classification pass, one per line in table form.
pub fn render_heat_days(records: &[HeatWaveRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table if records.is_empty() => {
            Ok("No heat-wave days predicted\n".to_string())
        }
        OutputFormat::Table => Ok(records
            .iter()
            .map(|r| format!("{}\n", format_date(&r.date)))
            .collect()),
        _ => render_heat_wave(records, format),
    }
}

pub fn render_overlay(overlay: &[DistrictOverlay], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => {
            let mut out = format!("{:<10}{:<32}{:>5}{:>9}\n", "district", "name", "flag", "fill");
            for district in overlay {
                writeln!(
                    out,
                    "{:<10}{:<32}{:>5}{:>9}",
                    district.district_id, district.name, district.flag, district.fill_color
                )?;
            }
            Ok(out)
        }
        OutputFormat::Csv => to_csv(overlay),
        OutputFormat::Json => to_json(overlay),
    }
}

pub fn to_csv<T: Serialize>(rows: &[T]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn to_json<T: Serialize>(rows: &[T]) -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(rows)?;
    out.push('\n');
    Ok(out)
}
