/// External data providers for the site monitoring service.
///
/// Every provider is modeled as a capability trait with two implementations:
/// a live HTTP client and a fixed fallback. The caller picks which one to
/// wire in, and the `*_or_*` helpers implement the service's fail-fast
/// policy — a fetch failure is logged and replaced with a documented safe
/// default, never propagated to the analysis or alert stages.
///
/// Submodules:
/// - `usgs` — rain-gauge provider (NWIS instantaneous values, param 00045).
/// - `nws` — forecast-hourly provider (api.weather.gov).
/// - `open_meteo` — 7-day daily precipitation forecast.

pub mod nws;
pub mod open_meteo;
pub mod usgs;

use chrono::NaiveDate;

use crate::logging;
use crate::model::{PrecipitationRecord, ProviderError};

// ---------------------------------------------------------------------------
// Capability traits
// ---------------------------------------------------------------------------

/// 24-hour cumulative rainfall for a gauge station.
pub trait RainGauge {
    fn rainfall_24h(&self, station_id: &str) -> Result<f64, ProviderError>;
}

/// Seven forward-looking daily precipitation records for a location.
pub trait ForecastProvider {
    fn daily_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<PrecipitationRecord>, ProviderError>;
}

/// Near-term hourly conditions relevant to crane and lightning safety.
pub trait HourlyForecast {
    fn hourly_snapshot(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<HourlySnapshot, ProviderError>;
}

/// Condensed near-term forecast used to build the telemetry snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySnapshot {
    pub temperature_f: i32,
    pub wind_speed_mph: u32,
    /// Estimated maximum gust over the near-term window, mph.
    pub max_gust_mph: u32,
    pub precip_prob_pct: u8,
    /// "STABLE" or "RISK"; "UNKNOWN" when the provider was unreachable.
    pub lightning_forecast: String,
}

impl HourlySnapshot {
    /// The safe default when the hourly provider is unreachable: zero wind,
    /// zero precipitation probability, lightning state unknown.
    pub fn unknown() -> Self {
        HourlySnapshot {
            temperature_f: 0,
            wind_speed_mph: 0,
            max_gust_mph: 0,
            precip_prob_pct: 0,
            lightning_forecast: "UNKNOWN".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixed-fallback implementations
// ---------------------------------------------------------------------------

/// Synthetic 7-day forecast used when the live forecast provider is down.
/// Deliberately unremarkable values so a provider outage never looks like
/// a weather emergency on the dashboard.
pub const FALLBACK_FORECAST_IN: [f64; 7] = [0.10, 0.25, 0.00, 0.15, 0.30, 0.05, 0.00];
pub const FALLBACK_FORECAST_PROB: [u8; 7] = [40, 60, 10, 50, 70, 30, 10];

/// Builds the synthetic fallback series for the 7 days after `today`.
pub fn fallback_forecast_series(today: NaiveDate) -> Vec<PrecipitationRecord> {
    (0..7)
        .map(|i| {
            PrecipitationRecord::forecast(
                today + chrono::Duration::days(i as i64 + 1),
                FALLBACK_FORECAST_IN[i],
                FALLBACK_FORECAST_PROB[i],
            )
        })
        .collect()
}

/// Rain gauge that always reports zero rainfall.
pub struct FallbackGauge;

impl RainGauge for FallbackGauge {
    fn rainfall_24h(&self, _station_id: &str) -> Result<f64, ProviderError> {
        Ok(0.0)
    }
}

/// Forecast provider that always returns the synthetic series.
pub struct FallbackForecast {
    pub today: NaiveDate,
}

impl ForecastProvider for FallbackForecast {
    fn daily_forecast(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<Vec<PrecipitationRecord>, ProviderError> {
        Ok(fallback_forecast_series(self.today))
    }
}

/// Hourly provider that always returns the unknown snapshot.
pub struct FallbackHourly;

impl HourlyForecast for FallbackHourly {
    fn hourly_snapshot(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> Result<HourlySnapshot, ProviderError> {
        Ok(HourlySnapshot::unknown())
    }
}

// ---------------------------------------------------------------------------
// Fail-fast helpers
// ---------------------------------------------------------------------------

/// Fetches the 24h rainfall total, defaulting to 0.0 on any failure.
pub fn rainfall_or_default(gauge: &dyn RainGauge, station_id: &str) -> f64 {
    match gauge.rainfall_24h(station_id) {
        Ok(total) => total,
        Err(e) => {
            logging::log_provider_failure(
                logging::DataSource::Usgs,
                station_id,
                "24h rainfall fetch",
                &e,
            );
            0.0
        }
    }
}

/// Fetches the 7-day forecast, substituting the synthetic fallback series
/// on any failure.
pub fn forecast_or_fallback(
    provider: &dyn ForecastProvider,
    latitude: f64,
    longitude: f64,
    today: NaiveDate,
) -> Vec<PrecipitationRecord> {
    match provider.daily_forecast(latitude, longitude) {
        Ok(records) => records,
        Err(e) => {
            logging::log_provider_failure(
                logging::DataSource::Meteo,
                &format!("{:.3},{:.3}", latitude, longitude),
                "7-day forecast fetch",
                &e,
            );
            fallback_forecast_series(today)
        }
    }
}

/// Fetches the hourly snapshot, defaulting to the unknown snapshot on any
/// failure.
pub fn hourly_or_unknown(
    provider: &dyn HourlyForecast,
    latitude: f64,
    longitude: f64,
) -> HourlySnapshot {
    match provider.hourly_snapshot(latitude, longitude) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            logging::log_provider_failure(
                logging::DataSource::Nws,
                &format!("{:.3},{:.3}", latitude, longitude),
                "hourly forecast fetch",
                &e,
            );
            HourlySnapshot::unknown()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrecipKind;

    struct FailingGauge;
    impl RainGauge for FailingGauge {
        fn rainfall_24h(&self, _station_id: &str) -> Result<f64, ProviderError> {
            Err(ProviderError::Unavailable("connection refused".to_string()))
        }
    }

    struct FailingForecast;
    impl ForecastProvider for FailingForecast {
        fn daily_forecast(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> Result<Vec<PrecipitationRecord>, ProviderError> {
            Err(ProviderError::HttpError(503))
        }
    }

    struct FailingHourly;
    impl HourlyForecast for FailingHourly {
        fn hourly_snapshot(
            &self,
            _latitude: f64,
            _longitude: f64,
        ) -> Result<HourlySnapshot, ProviderError> {
            Err(ProviderError::ParseError("truncated body".to_string()))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
    }

    #[test]
    fn test_fallback_series_covers_the_next_seven_days() {
        let series = fallback_forecast_series(today());
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2026, 8, 30).unwrap());
        assert_eq!(series[6].date, NaiveDate::from_ymd_opt(2026, 9, 5).unwrap());
        assert!(series.iter().all(|r| r.kind == PrecipKind::Forecast));
        assert!(series.iter().all(|r| r.probability_pct.is_some()));
    }

    #[test]
    fn test_gauge_failure_defaults_to_zero_rainfall() {
        assert_eq!(rainfall_or_default(&FailingGauge, "02091500"), 0.0);
    }

    #[test]
    fn test_forecast_failure_substitutes_synthetic_series() {
        let records = forecast_or_fallback(&FailingForecast, 35.726, -77.916, today());
        assert_eq!(records, fallback_forecast_series(today()));
    }

    #[test]
    fn test_hourly_failure_yields_unknown_snapshot() {
        let snapshot = hourly_or_unknown(&FailingHourly, 35.726, -77.916);
        assert_eq!(snapshot, HourlySnapshot::unknown());
        assert_eq!(snapshot.lightning_forecast, "UNKNOWN");
    }

    #[test]
    fn test_fallback_implementations_never_fail() {
        assert_eq!(FallbackGauge.rainfall_24h("02091500").unwrap(), 0.0);
        assert_eq!(
            FallbackForecast { today: today() }
                .daily_forecast(35.726, -77.916)
                .unwrap()
                .len(),
            7,
        );
        assert_eq!(
            FallbackHourly.hourly_snapshot(35.726, -77.916).unwrap(),
            HourlySnapshot::unknown(),
        );
    }
}
