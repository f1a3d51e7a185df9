use crate::error::{HwfError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Lag depths, in days, used for the lookback features.
pub const DEFAULT_LAGS: [u32; 3] = [1, 2, 3];

/// Degrees above the monthly historical mean that make a heat-wave day.
pub const DEFAULT_THRESHOLD_DELTA: f64 = 5.0;

/// Default number of days covered by a forecast request.
pub const DEFAULT_HORIZON_DAYS: u32 = 7;

/// Field delimiter of the historical CSV export.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Fixed forecasting parameters, read once at process start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub lags: Vec<u32>,
    pub threshold_delta: f64,
    pub horizon_days: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            lags: DEFAULT_LAGS.to_vec(),
            threshold_delta: DEFAULT_THRESHOLD_DELTA,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl ForecastConfig {
    /// Parse a JSON configuration; omitted fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<ForecastConfig> {
        let config: ForecastConfig = serde_json::from_str(json)?;
        config.validated()
    }

    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<ForecastConfig> {
        let json = std::fs::read_to_string(path)?;
        ForecastConfig::from_json_str(&json)
    }

    /// Normalize the lag set and reject values that cannot be used.
    pub fn validated(mut self) -> Result<ForecastConfig> {
        self.lags = normalize_lags(&self.lags)?;
        Ok(self)
    }

    /// Deepest configured lag, or zero when no lags are configured.
    pub fn max_lag(&self) -> u32 {
        self.lags.iter().copied().max().unwrap_or(0)
    }
}

/// Sort and deduplicate a lag set, rejecting zero-day lags.
pub fn normalize_lags(lags: &[u32]) -> Result<Vec<u32>> {
    if let Some(&bad) = lags.iter().find(|&&lag| lag == 0) {
        return Err(HwfError::InvalidLag(bad));
    }
    let mut lags = lags.to_vec();
    lags.sort_unstable();
    lags.dedup();
    Ok(lags)
}
