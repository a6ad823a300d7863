use serde::{Deserialize, Serialize};

use crate::core::features::weather::ConditionTag;

/// Outcome of a single timezone conversion. Consumed immediately by the
/// session to drive the time-bucket refresh; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub from_zone: String,
    pub to_zone: String,
    pub original: String,
    pub converted: String,
}

/// One hour's weather reading, exactly as matched in the provider's series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlySample {
    /// Provider-local timestamp, `YYYY-MM-DDTHH:MM`.
    pub time: String,
    /// Air temperature at 2m, °C.
    pub temperature: f64,
    /// Relative humidity at 2m, percent.
    pub humidity: f64,
    /// Precipitation for the hour, mm.
    pub precipitation: f64,
    /// WMO weather interpretation code.
    pub weathercode: u16,
    /// Total cloud cover, percent.
    pub cloudcover: f64,
}

/// Full composite returned by a weather lookup: location metadata plus the
/// matched hourly sample and its classified condition.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub sample: HourlySample,
    pub condition: ConditionTag,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertCurrencyRequest {
    /// Kept as a string at the boundary; validated into a number per action.
    pub amount: String,
    pub from_zone: String,
    pub to_zone: String,
    /// `YYYY-MM-DD` for a historical rate; `None` asks for the latest.
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrencyConversion {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub converted: f64,
    /// The date the provider actually priced the rate on, which may differ
    /// from the requested date (weekends, holidays), or "same currency" when
    /// the identity short-circuit applied.
    pub rate_date: String,
}
