//! Feature rows handed to the regressor and classifier

use hwf_core::daily::lag_column;
use serde::Serialize;

/// Feature name of the calendar month.
pub const MONTH_FEATURE: &str = "month";

/// Feature name of the monthly baseline.
pub const HIST_MEAN_FEATURE: &str = "hist_mean";

/// One model input: `{month, hist_mean, max_lag_1d, ..., max_lag_nd}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub month: u32,
    pub hist_mean: f64,
    /// (lag depth in days, value), ascending by depth.
    pub lags: Vec<(u32, f64)>,
}

impl FeatureRow {
    pub fn new(month: u32, hist_mean: f64, lags: Vec<(u32, f64)>) -> Self {
        FeatureRow {
            month,
            hist_mean,
            lags,
        }
    }

    /// Look a feature up by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            MONTH_FEATURE => Some(f64::from(self.month)),
            HIST_MEAN_FEATURE => Some(self.hist_mean),
            _ => self
                .lags
                .iter()
                .find(|(days, _)| lag_column(*days) == name)
                .map(|(_, value)| *value),
        }
    }

    /// Value of the lag feature `days` deep.
    pub fn lag(&self, days: u32) -> Option<f64> {
        self.lags
            .iter()
            .find(|(depth, _)| *depth == days)
            .map(|(_, value)| *value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FeatureRow {
        FeatureRow::new(7, 25.0, vec![(1, 27.0), (2, 26.0), (3, 24.5)])
    }

    #[test]
    fn test_get_by_name() {
        let row = row();
        assert_eq!(row.get("month"), Some(7.0));
        assert_eq!(row.get("hist_mean"), Some(25.0));
        assert_eq!(row.get("max_lag_2d"), Some(26.0));
        assert_eq!(row.get("max_lag_7d"), None);
        assert_eq!(row.get("mes"), None);
        assert_eq!(row.lag(3), Some(24.5));
    }
}
