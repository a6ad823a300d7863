//! Hourly weather lookups keyed by timestamp + timezone.
//!
//! A zone resolves to a city name, the city geocodes to coordinates, and the
//! date routes to either the archive or the forecast endpoint. The matched
//! hourly sample is collapsed into a coarse condition tag.

pub mod client;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::core::features::time_converter;
use crate::core::features::zones;
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{HourlySample, WeatherReport};

/// Precipitation above this many millimetres counts as rain regardless of the
/// reported weather code.
const RAIN_PRECIP_THRESHOLD_MM: f64 = 0.1;
/// Cloud cover at or above this percentage counts as cloudy.
const CLOUDY_COVER_THRESHOLD_PCT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionTag {
    Clear,
    Cloudy,
    Rain,
    Snow,
    Storm,
}

impl ConditionTag {
    pub fn label(&self) -> &'static str {
        match self {
            ConditionTag::Clear => "clear",
            ConditionTag::Cloudy => "cloudy",
            ConditionTag::Rain => "rain",
            ConditionTag::Snow => "snow",
            ConditionTag::Storm => "storm",
        }
    }

    /// Capitalized form for display.
    pub fn title(&self) -> &'static str {
        match self {
            ConditionTag::Clear => "Clear",
            ConditionTag::Cloudy => "Cloudy",
            ConditionTag::Rain => "Rain",
            ConditionTag::Snow => "Snow",
            ConditionTag::Storm => "Storm",
        }
    }
}

/// Collapse Open-Meteo numeric fields into a readable tag. First match wins.
pub fn classify_condition(weathercode: u16, precipitation: f64, cloudcover: f64) -> ConditionTag {
    // 95 = thunderstorm, 96-99 = thunderstorm with hail
    if matches!(weathercode, 95..=99) {
        return ConditionTag::Storm;
    }

    // 71-77 = snow fall / grains, 85-86 = snow showers
    if matches!(weathercode, 71 | 73 | 75 | 77 | 85 | 86) {
        return ConditionTag::Snow;
    }

    // Measured precipitation, or drizzle/rain/shower codes
    if precipitation > RAIN_PRECIP_THRESHOLD_MM
        || matches!(
            weathercode,
            51 | 53 | 55 | 56 | 57 | 61 | 63 | 65 | 66 | 67 | 80 | 81 | 82
        )
    {
        return ConditionTag::Rain;
    }

    // 1-3 = mainly clear through overcast, 45/48 = fog
    if matches!(weathercode, 1 | 2 | 3 | 45 | 48) || cloudcover >= CLOUDY_COVER_THRESHOLD_PCT {
        return ConditionTag::Cloudy;
    }

    ConditionTag::Clear
}

/// Which of the two Open-Meteo endpoints serves a requested date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Strictly-past calendar dates.
    Archive,
    /// Today and future dates.
    Forecast,
}

#[derive(Debug, Clone)]
pub struct GeoMatch {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub country_code: String,
}

/// Parallel hourly arrays as returned by the weather provider; indices are
/// aligned across all fields.
#[derive(Debug, Clone, Default)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    pub relative_humidity_2m: Vec<f64>,
    pub precipitation: Vec<f64>,
    pub weathercode: Vec<u16>,
    pub cloudcover: Vec<f64>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for a free-text city name, or `None` when nothing matched.
    async fn search(&self, city: &str) -> AppResult<Option<GeoMatch>>;
}

#[async_trait]
pub trait HourlyProvider: Send + Sync {
    /// Full-day hourly series for the given coordinates, in `zone` local time.
    async fn fetch_day(
        &self,
        latitude: f64,
        longitude: f64,
        date: &str,
        zone: &str,
        source: DataSource,
    ) -> AppResult<HourlySeries>;
}

pub struct WeatherService<G, W> {
    geocoder: G,
    hourly: W,
}

impl<G: Geocoder, W: HourlyProvider> WeatherService<G, W> {
    pub fn new(geocoder: G, hourly: W) -> Self {
        Self { geocoder, hourly }
    }

    #[cfg(test)]
    pub(crate) fn hourly(&self) -> &W {
        &self.hourly
    }

    /// Fetch the hourly weather slice matching `time_str` in `zone`.
    pub async fn fetch(&self, time_str: &str, zone: &str) -> AppResult<WeatherReport> {
        // The hourly providers only expose whole hours; clamp minutes/seconds.
        let requested = time_converter::parse_timestamp(time_str)?
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .ok_or_else(|| AppError::InvalidFormat(time_str.to_string()))?;

        let city = zones::city_from_zone(zone)?;

        let location = self
            .geocoder
            .search(&city)
            .await?
            .ok_or_else(|| AppError::LocationNotFound(zone.to_string()))?;

        let date = requested.date();
        let source = if date < Local::now().date_naive() {
            DataSource::Archive
        } else {
            DataSource::Forecast
        };
        let date_str = date.format("%Y-%m-%d").to_string();

        println!(
            "[Weather] {} @ {} ({}, {:?})",
            city, date_str, zone, source
        );

        let series = self
            .hourly
            .fetch_day(location.latitude, location.longitude, &date_str, zone, source)
            .await?;

        if series.time.is_empty() {
            return Err(AppError::NoHourlyData);
        }

        let index = find_exact_hour(&series.time, requested)
            .ok_or_else(|| AppError::NoExactHourMatch(requested.format("%Y-%m-%dT%H:%M").to_string()))?;

        let sample = sample_at(&series, index)?;
        let condition = classify_condition(sample.weathercode, sample.precipitation, sample.cloudcover);

        Ok(WeatherReport {
            city: location.name,
            country: location.country_code,
            latitude: location.latitude,
            longitude: location.longitude,
            sample,
            condition,
        })
    }
}

/// Scan the provider's time axis for an exact match to the truncated hour.
/// Entries that fail to parse are skipped rather than treated as matches.
fn find_exact_hour(times: &[String], requested: NaiveDateTime) -> Option<usize> {
    times.iter().position(|t| {
        NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M")
            .map(|parsed| parsed == requested)
            .unwrap_or(false)
    })
}

/// Pick index `i` out of every parallel array. A short array means the
/// provider returned a malformed series.
fn sample_at(series: &HourlySeries, i: usize) -> AppResult<HourlySample> {
    Ok(HourlySample {
        time: series.time.get(i).cloned().ok_or(AppError::NoHourlyData)?,
        temperature: series.temperature_2m.get(i).copied().ok_or(AppError::NoHourlyData)?,
        humidity: series.relative_humidity_2m.get(i).copied().ok_or(AppError::NoHourlyData)?,
        precipitation: series.precipitation.get(i).copied().ok_or(AppError::NoHourlyData)?,
        weathercode: series.weathercode.get(i).copied().ok_or(AppError::NoHourlyData)?,
        cloudcover: series.cloudcover.get(i).copied().ok_or(AppError::NoHourlyData)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storm_outranks_everything() {
        assert_eq!(classify_condition(99, 0.0, 0.0), ConditionTag::Storm);
        assert_eq!(classify_condition(95, 5.0, 100.0), ConditionTag::Storm);
    }

    #[test]
    fn snow_codes() {
        assert_eq!(classify_condition(73, 0.0, 0.0), ConditionTag::Snow);
        assert_eq!(classify_condition(86, 2.0, 90.0), ConditionTag::Snow);
    }

    #[test]
    fn rain_by_code_and_by_precipitation() {
        assert_eq!(classify_condition(61, 0.0, 0.0), ConditionTag::Rain);
        // Precipitation overrides a clear code.
        assert_eq!(classify_condition(0, 0.5, 0.0), ConditionTag::Rain);
        // At the threshold is not yet rain.
        assert_ne!(classify_condition(0, 0.1, 0.0), ConditionTag::Rain);
    }

    #[test]
    fn cloudy_by_code_or_cover() {
        assert_eq!(classify_condition(3, 0.0, 10.0), ConditionTag::Cloudy);
        assert_eq!(classify_condition(0, 0.0, 60.0), ConditionTag::Cloudy);
        assert_eq!(classify_condition(45, 0.0, 0.0), ConditionTag::Cloudy);
    }

    #[test]
    fn clear_is_the_fallback() {
        assert_eq!(classify_condition(0, 0.0, 5.0), ConditionTag::Clear);
        assert_eq!(classify_condition(0, 0.0, 59.9), ConditionTag::Clear);
    }

    #[test]
    fn exact_hour_scan() {
        let times = vec![
            "2024-06-15T13:00".to_string(),
            "2024-06-15T14:00".to_string(),
        ];
        let wanted = NaiveDateTime::parse_from_str("2024-06-15 14:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(find_exact_hour(&times, wanted), Some(1));

        let missing = NaiveDateTime::parse_from_str("2024-06-15 15:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(find_exact_hour(&times, missing), None);
    }

    #[test]
    fn truncated_sample_is_rejected() {
        let series = HourlySeries {
            time: vec!["2024-06-15T14:00".to_string()],
            temperature_2m: vec![],
            ..Default::default()
        };
        assert!(matches!(sample_at(&series, 0), Err(AppError::NoHourlyData)));
    }
}
