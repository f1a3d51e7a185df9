//! Rolling daily temperature forecasting and heat-wave classification.
//!
//! The temperature pass walks the requested days in chronological order,
//! feeding each prediction back into a private copy of the daily history so
//! later days can use it as a lag. The classification pass then derives lag
//! features from the predicted series alone and labels each day that has a
//! complete feature row.

pub mod error;
pub mod features;
pub mod model;
pub mod rolling;

pub use error::{ForecastError, Result};
pub use features::FeatureRow;
pub use model::{Classifier, LinearRegressor, LogisticClassifier, Regressor};
pub use rolling::{
    forecast_daily_temp, forecast_with_history, predict_heat_wave, ForecastRecord,
    HeatWaveRecord, TemperatureForecast,
};
