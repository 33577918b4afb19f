/// Open-Meteo Daily Forecast Client
///
/// Retrieves the 7-day daily precipitation forecast (totals in inches plus
/// maximum daily probability of precipitation) for the site coordinates.
/// No API key required.
///
/// API documentation: https://open-meteo.com/en/docs

use chrono::NaiveDate;
use serde::Deserialize;

use crate::ingest::ForecastProvider;
use crate::model::{PrecipitationRecord, ProviderError};

const OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com";

// ============================================================================
// Open-Meteo Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyBlock,
}

/// Column-oriented daily block: parallel arrays, one entry per day.
#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    precipitation_sum: Vec<Option<f64>>,
    precipitation_probability_max: Vec<Option<f64>>,
}

// ============================================================================
// Client
// ============================================================================

/// Live 7-day forecast client over the Open-Meteo forecast endpoint.
pub struct OpenMeteoForecast {
    client: reqwest::blocking::Client,
}

impl OpenMeteoForecast {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        OpenMeteoForecast { client }
    }
}

impl ForecastProvider for OpenMeteoForecast {
    fn daily_forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<PrecipitationRecord>, ProviderError> {
        let url = build_forecast_url(latitude, longitude);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpError(response.status().as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        parse_forecast_response(&body)
    }
}

/// Builds the forecast request URL: 7 days, precipitation in inches.
pub fn build_forecast_url(latitude: f64, longitude: f64) -> String {
    format!(
        "{}/v1/forecast?latitude={:.4}&longitude={:.4}\
         &daily=precipitation_sum,precipitation_probability_max\
         &forecast_days=7&precipitation_unit=inch&timezone=auto",
        OPEN_METEO_BASE_URL, latitude, longitude,
    )
}

/// Parses the column-oriented daily block into forecast records.
///
/// Missing values (nulls in the arrays) are treated as zero rather than
/// dropping the day — the dual-window table expects contiguous dates.
pub fn parse_forecast_response(body: &str) -> Result<Vec<PrecipitationRecord>, ProviderError> {
    let response: ForecastResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;

    let daily = &response.daily;
    if daily.time.is_empty() {
        return Err(ProviderError::NoDataAvailable("empty daily block".to_string()));
    }

    let mut records = Vec::with_capacity(daily.time.len());
    for (i, day) in daily.time.iter().enumerate() {
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|e| ProviderError::ParseError(format!("bad date '{}': {}", day, e)))?;
        let amount_in = daily
            .precipitation_sum
            .get(i)
            .copied()
            .flatten()
            .unwrap_or(0.0);
        let probability = daily
            .precipitation_probability_max
            .get(i)
            .copied()
            .flatten()
            .map(|p| p.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0);
        records.push(PrecipitationRecord::forecast(date, amount_in, probability));
    }

    Ok(records)
}

// ============================================================================
// Tests
// ============================================================================
