use crate::error::{HwfError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use hwf_utils::dates::parse_timestamp;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Header keyword that marks the temperature column.
pub const TEMPERATURE_KEYWORD: &str = "temp";

/// A single timestamped temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
}

impl Observation {
    pub fn new(timestamp: NaiveDateTime, temperature: f64) -> Self {
        Observation {
            timestamp,
            temperature,
        }
    }

    /// Calendar day the reading belongs to.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// How the temperature column was identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMatch {
    /// The header name contains the temperature keyword.
    Keyword,
    /// No header matched; the second column was taken by position.
    Positional,
}

/// Positions of the date and temperature columns in a historical table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub date_index: usize,
    pub temperature_index: usize,
    pub temperature_header: String,
    pub matched_by: ColumnMatch,
}

impl ColumnLayout {
    /// Classify the header row: the date is always the first column and the
    /// temperature is the first later column whose name contains "temp"
    /// (case-insensitive), falling back to the second column.
    pub fn detect(headers: &StringRecord) -> Result<ColumnLayout> {
        if headers.len() < 2 {
            return Err(HwfError::InsufficientColumns {
                found: headers.len(),
            });
        }
        let keyword_match = headers
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, name)| name.to_lowercase().contains(TEMPERATURE_KEYWORD));
        let (temperature_index, matched_by) = match keyword_match {
            Some((index, _)) => (index, ColumnMatch::Keyword),
            None => (1, ColumnMatch::Positional),
        };
        Ok(ColumnLayout {
            date_index: 0,
            temperature_index,
            temperature_header: headers
                .get(temperature_index)
                .unwrap_or_default()
                .trim()
                .to_string(),
            matched_by,
        })
    }
}

/// An ordered sequence of temperature observations, not necessarily one per day.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoricalSeries(pub Vec<Observation>);

impl HistoricalSeries {
    /// Build a series from observations, ordering them by timestamp.
    pub fn new(mut observations: Vec<Observation>) -> Self {
        observations.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        HistoricalSeries(observations)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a delimited historical table with a header row.
    ///
    /// Rows whose date or temperature cannot be parsed are skipped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hwf_core::observation::HistoricalSeries;
    ///
    /// let csv = "data;Temperatura_interp\n2021-01-01 00:00;21.5\n2021-01-01 12:00;27.0\n";
    /// let series = HistoricalSeries::from_csv_str(csv, b';').unwrap();
    /// assert_eq!(series.len(), 2);
    /// ```
    pub fn from_csv_str(csv_data: &str, delimiter: u8) -> Result<HistoricalSeries> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());
        let layout = ColumnLayout::detect(rdr.headers()?)?;
        if layout.matched_by == ColumnMatch::Positional {
            warn!(
                "No header contains {:?}; using column {:?} as temperature",
                TEMPERATURE_KEYWORD, layout.temperature_header
            );
        }

        let mut observations = Vec::new();
        let mut skipped = 0u32;
        for result in rdr.records() {
            let record = result?;
            let timestamp = record
                .get(layout.date_index)
                .and_then(|s| parse_timestamp(s).ok());
            let temperature = record
                .get(layout.temperature_index)
                .and_then(parse_temperature);
            match (timestamp, temperature) {
                (Some(timestamp), Some(temperature)) => {
                    observations.push(Observation::new(timestamp, temperature))
                }
                _ => skipped += 1,
            }
        }
        info!(
            "Loaded {} observations from column {:?}, skipped {} unparseable rows",
            observations.len(),
            layout.temperature_header,
            skipped
        );
        Ok(HistoricalSeries::new(observations))
    }
}

impl From<Vec<Observation>> for HistoricalSeries {
    fn from(value: Vec<Observation>) -> Self {
        HistoricalSeries::new(value)
    }
}

/// Parse a temperature cell, accepting a decimal comma.
fn parse_temperature(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
