//! Open-Meteo HTTP clients: geocoding plus the archive/forecast hourly APIs.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{DataSource, GeoMatch, Geocoder, HourlyProvider, HourlySeries};
use crate::shared::error::{AppError, AppResult};

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,precipitation,weathercode,cloudcover";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Lazy static HTTP client to reuse the connection pool
static CLIENT: OnceLock<Client> = OnceLock::new();

fn get_client() -> &'static Client {
    CLIENT.get_or_init(|| {
        Client::builder()
            .user_agent("zonelens/weather")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

// -- Strict Serde Structs for the Open-Meteo APIs --

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingHit>,
}

#[derive(Debug, Deserialize)]
struct GeocodingHit {
    latitude: f64,
    longitude: f64,
    name: Option<String>,
    country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    #[serde(default)]
    hourly: HourlyBlock,
}

#[derive(Debug, Default, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<f64>,
    #[serde(default)]
    relative_humidity_2m: Vec<f64>,
    #[serde(default)]
    precipitation: Vec<f64>,
    #[serde(default)]
    weathercode: Vec<u16>,
    #[serde(default)]
    cloudcover: Vec<f64>,
}

pub struct OpenMeteoGeocoder;

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn search(&self, city: &str) -> AppResult<Option<GeoMatch>> {
        let url = format!(
            "{}?name={}&count=1",
            GEOCODING_URL,
            urlencoding::encode(city)
        );

        let response = get_client().get(&url).send().await.map_err(|e| {
            eprintln!("[Weather] Geocoding network error: {}", e);
            AppError::Network(format!("Geocoding request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Geocoding API returned error: {}",
                response.status()
            )));
        }

        let body: GeocodingResponse = response.json().await?;
        let city = city.to_string();
        Ok(body.results.into_iter().next().map(|hit| GeoMatch {
            latitude: hit.latitude,
            longitude: hit.longitude,
            name: hit.name.unwrap_or(city),
            country_code: hit.country_code.unwrap_or_default(),
        }))
    }
}

pub struct OpenMeteoHourly;

#[async_trait]
impl HourlyProvider for OpenMeteoHourly {
    async fn fetch_day(
        &self,
        latitude: f64,
        longitude: f64,
        date: &str,
        zone: &str,
        source: DataSource,
    ) -> AppResult<HourlySeries> {
        let base = match source {
            DataSource::Archive => ARCHIVE_URL,
            DataSource::Forecast => FORECAST_URL,
        };

        let response = get_client()
            .get(base)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("timezone", zone.to_string()),
                ("start_date", date.to_string()),
                ("end_date", date.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                eprintln!("[Weather] Hourly network error: {}", e);
                AppError::Network(format!("Weather request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Weather API returned error: {}",
                response.status()
            )));
        }

        let body: HourlyResponse = response.json().await?;
        let hourly = body.hourly;
        Ok(HourlySeries {
            time: hourly.time,
            temperature_2m: hourly.temperature_2m,
            relative_humidity_2m: hourly.relative_humidity_2m,
            precipitation: hourly.precipitation,
            weathercode: hourly.weathercode,
            cloudcover: hourly.cloudcover,
        })
    }
}
