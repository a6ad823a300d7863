//! RestCountries and Frankfurter HTTP clients.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{CountryInfoProvider, RateProvider, RateQuote};
use crate::shared::error::{AppError, AppResult};

const RESTCOUNTRIES_URL: &str = "https://restcountries.com/v3.1/alpha";
const FRANKFURTER_URL: &str = "https://api.frankfurter.app";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Lazy static HTTP client to reuse the connection pool
static CLIENT: OnceLock<Client> = OnceLock::new();

fn get_client() -> &'static Client {
    CLIENT.get_or_init(|| {
        Client::builder()
            .user_agent("zonelens/currency")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

#[derive(Debug, Deserialize)]
struct CountryInfo {
    #[serde(default)]
    currencies: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    date: Option<String>,
    #[serde(default)]
    rates: std::collections::HashMap<String, f64>,
}

pub struct RestCountriesClient;

#[async_trait]
impl CountryInfoProvider for RestCountriesClient {
    async fn primary_currency(&self, country_code: &str) -> AppResult<String> {
        let code = country_code.trim().to_ascii_uppercase();
        let url = format!("{}/{}", RESTCOUNTRIES_URL, urlencoding::encode(&code));

        let response = get_client().get(&url).send().await.map_err(|e| {
            eprintln!("[Currency] RestCountries network error: {}", e);
            AppError::Network(format!("Country lookup failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Country API returned error: {}",
                response.status()
            )));
        }

        let body: Vec<CountryInfo> = response.json().await?;
        let info = body.into_iter().next().ok_or_else(|| {
            eprintln!("[Currency] No country info for code: {}", code);
            AppError::MissingCurrencyCode
        })?;

        // First listed currency is taken as the country's primary one.
        info.currencies
            .keys()
            .next()
            .cloned()
            .ok_or_else(|| {
                eprintln!("[Currency] No currency info for country code: {}", code);
                AppError::MissingCurrencyCode
            })
    }
}

pub struct FrankfurterClient;

#[async_trait]
impl RateProvider for FrankfurterClient {
    async fn convert(
        &self,
        amount: f64,
        from: &str,
        to: &str,
        date: Option<&str>,
    ) -> AppResult<RateQuote> {
        // A dated path asks for the historical rate; /latest otherwise.
        let url = match date {
            Some(d) => format!("{}/{}", FRANKFURTER_URL, d),
            None => format!("{}/latest", FRANKFURTER_URL),
        };

        let response = get_client()
            .get(&url)
            .query(&[
                ("amount", amount.to_string()),
                ("from", from.to_string()),
                ("to", to.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                eprintln!("[Currency] Frankfurter network error: {}", e);
                AppError::Network(format!("Rate request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Rate API returned error: {}",
                response.status()
            )));
        }

        let body: RatesResponse = response.json().await?;
        let resolved_date = body
            .date
            .unwrap_or_else(|| date.unwrap_or("unknown date").to_string());

        let converted = body.rates.get(to).copied().ok_or_else(|| AppError::RateNotFound {
            currency: to.to_string(),
            date: resolved_date.clone(),
        })?;

        Ok(RateQuote {
            converted,
            date: resolved_date,
        })
    }
}
