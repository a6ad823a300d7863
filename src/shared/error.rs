use serde::Serialize;
use thiserror::Error;

/// Unified error type for every action the core can perform.
///
/// Each orchestrated action catches these at its boundary and renders a short
/// user-facing message; the variant distinction exists for logs and tests.
#[derive(Error, Debug, Serialize)]
pub enum AppError {
    #[error("Invalid timestamp format: {0}")]
    InvalidFormat(String),

    #[error("Unknown timezone: {0}")]
    UnknownZone(String),

    #[error("Timezone has no city component (use Area/City timezones): {0}")]
    UnsupportedZoneFormat(String),

    #[error("Network Error: {0}")]
    Network(String),

    #[error("Could not find location for city derived from timezone: {0}")]
    LocationNotFound(String),

    #[error("No hourly weather data returned for that date (out of range?)")]
    NoHourlyData,

    #[error("No weather exactly at that hour: {0}")]
    NoExactHourMatch(String),

    #[error("Amount must be a numeric value: {0}")]
    InvalidAmount(String),

    #[error("Both source and target currency codes are required")]
    MissingCurrencyCode,

    #[error("No rate found for {currency} on {date}")]
    RateNotFound { currency: String, date: String },

    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Settings Error: {0}")]
    Settings(String),
}

// Implement conversion from standard errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Network(format!("Invalid response: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
