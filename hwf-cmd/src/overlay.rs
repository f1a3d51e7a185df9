//! District heat-wave overlay.
//!
//! The forecast is not spatially resolved: one flag is computed for the whole
//! window and broadcast to every district.

use hwf_core::district::District;
use hwf_forecast::HeatWaveRecord;
use serde::Serialize;

/// Colormap end for "no heat wave" (value 0).
pub const NO_HEAT_COLOR: [u8; 3] = [0x00, 0x00, 0xff];

/// Colormap end for "heat wave" (value 1).
pub const HEAT_COLOR: [u8; 3] = [0xff, 0x00, 0x00];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictOverlay {
    pub district_id: String,
    pub name: String,
    pub flag: u8,
    pub fill_color: String,
}

/// 1 when the classification pass returned any day, else 0.
///
/// Per-day labels are not consulted.
pub fn heat_wave_flag(records: &[HeatWaveRecord]) -> u8 {
    u8::from(!records.is_empty())
}

/// Hex color of `value` on a linear blue to red scale over [0, 1].
///
/// Values outside the range are clamped.
pub fn fill_color(value: f64) -> String {
    let t = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    let channel = |i: usize| {
        let from = f64::from(NO_HEAT_COLOR[i]);
        let to = f64::from(HEAT_COLOR[i]);
        (from + (to - from) * t).round() as u8
    };
    format!("#{:02x}{:02x}{:02x}", channel(0), channel(1), channel(2))
}

pub fn build_overlay(districts: &[District], records: &[HeatWaveRecord]) -> Vec<DistrictOverlay> {
    let flag = heat_wave_flag(records);
    let color = fill_color(f64::from(flag));
    districts
        .iter()
        .map(|district| DistrictOverlay {
            district_id: district.district_id.clone(),
            name: district.name.clone(),
            flag,
            fill_color: color.clone(),
        })
        .collect()
}
