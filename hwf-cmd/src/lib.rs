//! Command implementations for HWF CLI.
//!
//! Provides subcommands for daily temperature forecasts, heat-wave
//! classification and the combined report with the district overlay.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use hwf_core::config::DEFAULT_DELIMITER;
use hwf_utils::dates::parse_date;

pub mod overlay;
pub mod render;
pub mod report;
pub mod session;

use render::OutputFormat;

/// Input files shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct Inputs {
    /// Historical observations CSV (plain or gzipped), date in the first column
    #[arg(short = 'H', long)]
    pub history: String,

    /// Regressor artifact (JSON)
    #[arg(short = 'r', long)]
    pub regressor: String,

    /// Heat-wave classifier artifact (JSON)
    #[arg(short = 'k', long)]
    pub classifier: String,

    /// Field delimiter of the history CSV
    #[arg(short = 'd', long, default_value_t = char::from(DEFAULT_DELIMITER))]
    pub delimiter: char,

    /// Forecast configuration (JSON); built-in defaults when omitted
    #[arg(short = 'c', long)]
    pub config: Option<String>,
}

/// Requested forecast window.
#[derive(Args, Debug, Clone, Copy)]
pub struct Window {
    /// First forecast day (YYYY-MM-DD), defaults to today
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last forecast day (YYYY-MM-DD), defaults to start + horizon - 1
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Forecast the daily maximum temperature for each day of the window
    Forecast {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        window: Window,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Label each forecast day that has full lag depth as heat wave or not
    HeatWave {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        window: Window,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Forecast table, heat-wave days and the per-district overlay
    Report {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        window: Window,

        /// District list CSV (id first, optional name second)
        #[arg(long)]
        districts: Option<String>,

        /// Output path for the district overlay CSV
        #[arg(long)]
        overlay_csv: Option<String>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Forecast {
            inputs,
            window,
            format,
        } => report::run_forecast(&inputs, window, format),
        Command::HeatWave {
            inputs,
            window,
            format,
        } => report::run_heat_wave(&inputs, window, format),
        Command::Report {
            inputs,
            window,
            districts,
            overlay_csv,
            format,
        } => report::run_report(
            &inputs,
            window,
            districts.as_deref(),
            overlay_csv.as_deref(),
            format,
        ),
    }
}
