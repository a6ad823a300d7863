//! Currency conversion keyed by timezones.
//!
//! Each zone resolves to its owning country, the country to its primary
//! currency (cached for the process lifetime), and the pair to a historical
//! or latest rate from the FX provider.

pub mod client;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::core::features::zones::ZoneResolver;
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{ConvertCurrencyRequest, CurrencyConversion};

#[derive(Debug, Clone)]
pub struct RateQuote {
    pub converted: f64,
    /// The date the provider actually used, which is authoritative.
    pub date: String,
}

#[async_trait]
pub trait CountryInfoProvider: Send + Sync {
    /// Primary currency code for an ISO alpha country code.
    async fn primary_currency(&self, country_code: &str) -> AppResult<String>;
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Convert `amount` from one currency to another, on `date` when given,
    /// otherwise at the latest available rate.
    async fn convert(&self, amount: f64, from: &str, to: &str, date: Option<&str>)
        -> AppResult<RateQuote>;
}

pub struct CurrencyService<C, R> {
    resolver: Arc<ZoneResolver>,
    countries: C,
    rates: R,
    /// country code → currency code; append-only for the process lifetime.
    cache: RwLock<HashMap<String, String>>,
}

impl<C: CountryInfoProvider, R: RateProvider> CurrencyService<C, R> {
    pub fn new(resolver: Arc<ZoneResolver>, countries: C, rates: R) -> Self {
        Self {
            resolver,
            countries,
            rates,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Currency owning `zone`, paying the network cost only on the first
    /// lookup per country.
    pub async fn currency_for_zone(&self, zone: &str) -> AppResult<String> {
        let country = self.resolver.country_from_zone(zone)?.to_ascii_uppercase();

        if let Some(hit) = self
            .cache
            .read()
            .ok()
            .and_then(|cache| cache.get(&country).cloned())
        {
            return Ok(hit);
        }

        let code = self.countries.primary_currency(&country).await?;
        println!("[Currency] {} -> {} (cached)", country, code);
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(country, code.clone());
        }
        Ok(code)
    }

    /// Full zone-keyed conversion: resolve both currencies, then price the
    /// amount with the FX provider.
    pub async fn convert(&self, request: &ConvertCurrencyRequest) -> AppResult<CurrencyConversion> {
        let amount = parse_amount(&request.amount)?;
        let from_cur = self.currency_for_zone(&request.from_zone).await?;
        let to_cur = self.currency_for_zone(&request.to_zone).await?;
        self.convert_codes(amount, &from_cur, &to_cur, request.date.as_deref())
            .await
    }

    /// Conversion between already-resolved currency codes. Identical codes
    /// short-circuit to an exact identity result without any rate call.
    pub async fn convert_codes(
        &self,
        amount: f64,
        from_cur: &str,
        to_cur: &str,
        date: Option<&str>,
    ) -> AppResult<CurrencyConversion> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AppError::InvalidAmount(amount.to_string()));
        }

        let from_cur = from_cur.trim().to_ascii_uppercase();
        let to_cur = to_cur.trim().to_ascii_uppercase();
        if from_cur.is_empty() || to_cur.is_empty() {
            return Err(AppError::MissingCurrencyCode);
        }

        if from_cur == to_cur {
            return Ok(CurrencyConversion {
                amount,
                from_currency: from_cur,
                to_currency: to_cur,
                converted: amount,
                rate_date: "same currency".to_string(),
            });
        }

        let quote = self.rates.convert(amount, &from_cur, &to_cur, date).await?;
        println!(
            "[Currency] {} {} -> {} {} on {}",
            amount, from_cur, quote.converted, to_cur, quote.date
        );

        Ok(CurrencyConversion {
            amount,
            from_currency: from_cur,
            to_currency: to_cur,
            converted: quote.converted,
            rate_date: quote.date,
        })
    }
}

fn parse_amount(raw: &str) -> AppResult<f64> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidAmount(raw.to_string()))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(AppError::InvalidAmount(raw.to_string()));
    }
    Ok(amount)
}
