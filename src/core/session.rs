//! Conversion session: the single object owning shared services and the
//! mutable presentation state the original kept in globals.
//!
//! Each action catches every error arising within it and renders a short
//! message local to that action; a failure in one action never disturbs the
//! state another action produced.

use std::sync::Arc;

use chrono::{Local, NaiveTime};

use crate::core::features::currency::client::{FrankfurterClient, RestCountriesClient};
use crate::core::features::currency::{CountryInfoProvider, CurrencyService, RateProvider};
use crate::core::features::time_bucket::{self, ThemeMode, TimeBucket};
use crate::core::features::time_converter::{self, TIME_FORMAT};
use crate::core::features::weather::client::{OpenMeteoGeocoder, OpenMeteoHourly};
use crate::core::features::weather::{ConditionTag, Geocoder, HourlyProvider, WeatherService};
use crate::core::features::zones::ZoneResolver;
use crate::shared::types::{ConversionResult, ConvertCurrencyRequest};

pub struct Session<G, W, C, R> {
    weather: WeatherService<G, W>,
    currency: CurrencyService<C, R>,
    result: Option<ConversionResult>,
    bucket: TimeBucket,
    mode: ThemeMode,
    condition: ConditionTag,
}

/// Session wired to the live Open-Meteo / RestCountries / Frankfurter stack.
pub type LiveSession = Session<OpenMeteoGeocoder, OpenMeteoHourly, RestCountriesClient, FrankfurterClient>;

impl LiveSession {
    pub fn live(resolver: Arc<ZoneResolver>) -> Self {
        Session::new(
            WeatherService::new(OpenMeteoGeocoder, OpenMeteoHourly),
            CurrencyService::new(resolver, RestCountriesClient, FrankfurterClient),
        )
    }
}

impl<G, W, C, R> Session<G, W, C, R>
where
    G: Geocoder,
    W: HourlyProvider,
    C: CountryInfoProvider,
    R: RateProvider,
{
    pub fn new(weather: WeatherService<G, W>, currency: CurrencyService<C, R>) -> Self {
        let (bucket, mode) = time_bucket::classify(Local::now().time());
        Self {
            weather,
            currency,
            result: None,
            bucket,
            mode,
            condition: ConditionTag::Clear,
        }
    }

    /// Run the main conversion and refresh the bucket from the converted time.
    pub fn convert(&mut self, time_str: &str, from_zone: &str, to_zone: &str) -> String {
        match time_converter::convert(time_str, from_zone, to_zone) {
            Ok(res) => {
                if let Ok(dt) = time_converter::parse_timestamp(&res.converted) {
                    self.apply_bucket(dt.time());
                }
                let message = format!(
                    "📍 {} : {}\n🎯 {} : {}",
                    from_zone, res.original, to_zone, res.converted
                );
                self.result = Some(res);
                message
            }
            Err(e) => {
                // Internal distinction is for logs; the user sees one message.
                eprintln!("[Session] Conversion failed: {}", e);
                "Error: Invalid input or timezone".to_string()
            }
        }
    }

    /// Fetch hourly weather for the target zone and render a compact summary.
    /// The condition tag overrides only the weather dimension; the bucket is
    /// re-derived from the converted result when one exists, else the input.
    pub async fn weather(&mut self, time_str: &str, zone: &str) -> String {
        let time_str = time_str.trim();
        if time_str.is_empty() {
            return "Error: Enter datetime (YYYY-MM-DD HH:MM:SS)".to_string();
        }
        if zone.is_empty() {
            return "Error: Select a target timezone for weather.".to_string();
        }
        if time_converter::parse_timestamp(time_str).is_err() {
            return "Error: Invalid datetime format.".to_string();
        }

        match self.weather.fetch(time_str, zone).await {
            Ok(report) => {
                self.condition = report.condition;

                let bucket_source = self
                    .result
                    .as_ref()
                    .map(|r| r.converted.clone())
                    .unwrap_or_else(|| time_str.to_string());
                if let Ok(dt) = time_converter::parse_timestamp(&bucket_source) {
                    self.apply_bucket(dt.time());
                }

                let display_time = report.sample.time.replace('T', " ");
                format!(
                    "🌤 {}, {} @ {}\n🌡 Temp: {}°C   💧 Humidity: {}%\n🌈 Condition: {}",
                    report.city,
                    report.country,
                    display_time,
                    report.sample.temperature,
                    report.sample.humidity,
                    report.condition.title()
                )
            }
            Err(e) => format!("Weather error: {}", e),
        }
    }

    /// Convert an amount between the currencies owning two zones.
    pub async fn currency(&mut self, request: &ConvertCurrencyRequest) -> String {
        match self.currency.convert(request).await {
            Ok(conv) => format!(
                "💱 {} {} → {} {} (rate date: {})",
                conv.amount, conv.from_currency, conv.converted, conv.to_currency, conv.rate_date
            ),
            Err(e) => format!("Currency error: {}", e),
        }
    }

    /// Clear result and condition; re-derive the bucket from local time.
    pub fn reset(&mut self) {
        self.result = None;
        self.condition = ConditionTag::Clear;
        self.apply_bucket(Local::now().time());
    }

    /// Prefill values for the "current local" action: the local timestamp in
    /// canonical format plus the system IANA zone (UTC when undetectable).
    pub fn now_prefill(&self) -> (String, String) {
        let now = Local::now().format(TIME_FORMAT).to_string();
        let zone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
        (now, zone)
    }

    /// The two orthogonal backdrop dimensions, composed at render time.
    pub fn backdrop(&self) -> (TimeBucket, ConditionTag) {
        (self.bucket, self.condition)
    }

    pub fn theme(&self) -> ThemeMode {
        self.mode
    }

    pub fn last_result(&self) -> Option<&ConversionResult> {
        self.result.as_ref()
    }

    fn apply_bucket(&mut self, t: NaiveTime) {
        let (bucket, mode) = time_bucket::classify(t);
        self.bucket = bucket;
        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::currency::RateQuote;
    use crate::core::features::weather::{DataSource, GeoMatch, HourlySeries};
    use crate::shared::error::{AppError, AppResult};
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDateTime};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubGeocoder;

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn search(&self, city: &str) -> AppResult<Option<GeoMatch>> {
            Ok(Some(GeoMatch {
                latitude: 35.69,
                longitude: 139.69,
                name: city.to_string(),
                country_code: "JP".to_string(),
            }))
        }
    }

    /// Records which endpoint each request routed to and answers with a full
    /// clear-sky day.
    struct RecordingHourly {
        sources: Mutex<Vec<DataSource>>,
    }

    impl RecordingHourly {
        fn new() -> Self {
            Self {
                sources: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl HourlyProvider for RecordingHourly {
        async fn fetch_day(
            &self,
            _latitude: f64,
            _longitude: f64,
            date: &str,
            _zone: &str,
            source: DataSource,
        ) -> AppResult<HourlySeries> {
            self.sources.lock().unwrap().push(source);
            let time: Vec<String> = (0..24).map(|h| format!("{}T{:02}:00", date, h)).collect();
            Ok(HourlySeries {
                temperature_2m: vec![20.0; 24],
                relative_humidity_2m: vec![50.0; 24],
                precipitation: vec![0.0; 24],
                weathercode: vec![0; 24],
                cloudcover: vec![10.0; 24],
                time,
            })
        }
    }

    struct StubCurrencies;

    #[async_trait]
    impl CountryInfoProvider for StubCurrencies {
        async fn primary_currency(&self, country_code: &str) -> AppResult<String> {
            match country_code {
                "US" => Ok("USD".to_string()),
                "JP" => Ok("JPY".to_string()),
                _ => Err(AppError::MissingCurrencyCode),
            }
        }
    }

    struct StubRates {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RateProvider for StubRates {
        async fn convert(
            &self,
            amount: f64,
            _from: &str,
            _to: &str,
            _date: Option<&str>,
        ) -> AppResult<RateQuote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RateQuote {
                converted: amount * 157.0,
                date: "2024-06-14".to_string(),
            })
        }
    }

    fn session() -> Session<StubGeocoder, RecordingHourly, StubCurrencies, StubRates> {
        let resolver = Arc::new(ZoneResolver::new());
        Session::new(
            WeatherService::new(StubGeocoder, RecordingHourly::new()),
            CurrencyService::new(
                resolver,
                StubCurrencies,
                StubRates {
                    calls: AtomicUsize::new(0),
                },
            ),
        )
    }

    #[test]
    fn convert_updates_result_and_bucket() {
        let mut session = session();
        let msg = session.convert("2024-06-15 14:30:00", "America/New_York", "Asia/Tokyo");
        assert!(msg.contains("2024-06-16 03:30:00"));
        assert_eq!(session.last_result().unwrap().converted, "2024-06-16 03:30:00");
        // 03:30 in Tokyo is pre-dawn with the light palette.
        assert_eq!(session.backdrop().0, TimeBucket::PreDawn);
        assert_eq!(session.theme(), ThemeMode::Light);
    }

    #[test]
    fn failed_convert_keeps_previous_result() {
        let mut session = session();
        session.convert("2024-06-15 14:30:00", "America/New_York", "Asia/Tokyo");
        let msg = session.convert("garbage", "America/New_York", "Asia/Tokyo");
        assert_eq!(msg, "Error: Invalid input or timezone");
        assert_eq!(session.last_result().unwrap().converted, "2024-06-16 03:30:00");
    }

    #[tokio::test]
    async fn weather_routes_past_to_archive_and_future_to_forecast() {
        let mut session = session();
        let yesterday = (Local::now() - Duration::days(2))
            .format("%Y-%m-%d 14:00:00")
            .to_string();
        let tomorrow = (Local::now() + Duration::days(1))
            .format("%Y-%m-%d 14:00:00")
            .to_string();

        session.weather(&yesterday, "Asia/Tokyo").await;
        session.weather(&tomorrow, "Asia/Tokyo").await;

        let sources = session.weather.hourly().sources.lock().unwrap().clone();
        assert_eq!(sources, vec![DataSource::Archive, DataSource::Forecast]);
    }

    #[tokio::test]
    async fn weather_sets_condition_but_bucket_follows_converted_result() {
        let mut session = session();
        session.convert("2024-06-15 14:30:00", "America/New_York", "Asia/Tokyo");

        let tomorrow = (Local::now() + Duration::days(1))
            .format("%Y-%m-%d 14:00:00")
            .to_string();
        let msg = session.weather(&tomorrow, "Asia/Tokyo").await;
        assert!(msg.contains("Condition: Clear"), "unexpected message: {}", msg);

        // Condition came from the sample; the bucket still mirrors the
        // converted 03:30 result, not the weather timestamp.
        assert_eq!(session.backdrop(), (TimeBucket::PreDawn, ConditionTag::Clear));
    }

    #[tokio::test]
    async fn weather_validation_messages() {
        let mut session = session();
        assert_eq!(
            session.weather("  ", "Asia/Tokyo").await,
            "Error: Enter datetime (YYYY-MM-DD HH:MM:SS)"
        );
        assert_eq!(
            session.weather("2024-06-15 14:00:00", "").await,
            "Error: Select a target timezone for weather."
        );
        assert_eq!(
            session.weather("15/06/2024", "Asia/Tokyo").await,
            "Error: Invalid datetime format."
        );
    }

    #[tokio::test]
    async fn currency_action_renders_result() {
        let mut session = session();
        let req = ConvertCurrencyRequest {
            amount: "1.0".to_string(),
            from_zone: "America/New_York".to_string(),
            to_zone: "Asia/Tokyo".to_string(),
            date: Some("2024-06-15".to_string()),
        };
        let msg = session.currency(&req).await;
        assert!(msg.contains("157"), "unexpected message: {}", msg);
        assert!(msg.contains("USD"));
        assert!(msg.contains("JPY"));
    }

    #[tokio::test]
    async fn currency_failure_does_not_touch_conversion_state() {
        let mut session = session();
        session.convert("2024-06-15 14:30:00", "America/New_York", "Asia/Tokyo");
        let req = ConvertCurrencyRequest {
            amount: "NaN-ish".to_string(),
            from_zone: "America/New_York".to_string(),
            to_zone: "Asia/Tokyo".to_string(),
            date: None,
        };
        let msg = session.currency(&req).await;
        assert!(msg.starts_with("Currency error:"));
        assert_eq!(session.last_result().unwrap().converted, "2024-06-16 03:30:00");
    }

    #[test]
    fn reset_clears_result_and_condition() {
        let mut session = session();
        session.convert("2024-06-15 14:30:00", "America/New_York", "Asia/Tokyo");
        session.reset();
        assert!(session.last_result().is_none());
        assert_eq!(session.backdrop().1, ConditionTag::Clear);
    }

    #[test]
    fn now_prefill_is_canonical_format() {
        let session = session();
        let (now, zone) = session.now_prefill();
        assert!(NaiveDateTime::parse_from_str(&now, TIME_FORMAT).is_ok());
        assert!(!zone.is_empty());
    }
}
