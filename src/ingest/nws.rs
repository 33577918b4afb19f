/// NWS Hourly Forecast Client
///
/// Two-step fetch against api.weather.gov: resolve the gridpoint for a
/// lat/lon via the points endpoint, then pull the hourly forecast it
/// links to. Produces the condensed `HourlySnapshot` used for crane and
/// lightning safety.
///
/// API documentation: https://www.weather.gov/documentation/services-web-api

use serde::Deserialize;

use crate::ingest::{HourlyForecast, HourlySnapshot};
use crate::model::ProviderError;

const NWS_BASE_URL: &str = "https://api.weather.gov";

/// Number of hourly periods considered for the gust estimate.
const GUST_WINDOW_PERIODS: usize = 12;

/// Margin added to the max sustained wind to estimate gusts, mph.
/// The hourly product reports sustained wind only.
const GUST_MARGIN_MPH: u32 = 5;

// ============================================================================
// api.weather.gov Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    #[serde(rename = "forecastHourly")]
    forecast_hourly: String,
}

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    properties: HourlyProperties,
}

#[derive(Debug, Deserialize)]
struct HourlyProperties {
    periods: Vec<HourlyPeriod>,
}

#[derive(Debug, Deserialize)]
struct HourlyPeriod {
    temperature: i32,
    /// e.g. "10 mph"
    #[serde(rename = "windSpeed")]
    wind_speed: String,
    #[serde(rename = "shortForecast")]
    short_forecast: String,
    #[serde(rename = "probabilityOfPrecipitation")]
    precip_probability: Option<ProbabilityValue>,
}

#[derive(Debug, Deserialize)]
struct ProbabilityValue {
    value: Option<f64>,
}

// ============================================================================
// Client
// ============================================================================

/// Live hourly-forecast client over api.weather.gov.
pub struct NwsHourlyForecast {
    client: reqwest::blocking::Client,
}

impl NwsHourlyForecast {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        NwsHourlyForecast { client }
    }

    fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/geo+json")
            .send()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpError(response.status().as_u16()));
        }

        response
            .text()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))
    }
}

impl HourlyForecast for NwsHourlyForecast {
    fn hourly_snapshot(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<HourlySnapshot, ProviderError> {
        let points_url = format!("{}/points/{:.4},{:.4}", NWS_BASE_URL, latitude, longitude);
        let hourly_url = parse_points_response(&self.get_text(&points_url)?)?;
        parse_hourly_response(&self.get_text(&hourly_url)?)
    }
}

/// Extracts the hourly forecast URL from a points response.
pub fn parse_points_response(body: &str) -> Result<String, ProviderError> {
    let response: PointsResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;
    Ok(response.properties.forecast_hourly)
}

/// Condenses an hourly forecast response into the snapshot.
///
/// Current conditions (temperature, wind, precip probability, thunderstorm
/// flag) come from the first period; the gust estimate is the maximum
/// sustained wind over the first 12 periods plus a fixed margin.
pub fn parse_hourly_response(body: &str) -> Result<HourlySnapshot, ProviderError> {
    let response: HourlyResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;

    let periods = &response.properties.periods;
    let first = periods
        .first()
        .ok_or_else(|| ProviderError::NoDataAvailable("no hourly periods".to_string()))?;

    let max_wind = periods
        .iter()
        .take(GUST_WINDOW_PERIODS)
        .map(|p| parse_wind_mph(&p.wind_speed))
        .max()
        .unwrap_or(0);

    let precip_prob_pct = first
        .precip_probability
        .as_ref()
        .and_then(|p| p.value)
        .map(|v| v.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0);

    let lightning_forecast = if first.short_forecast.to_lowercase().contains("thunderstorm") {
        "RISK".to_string()
    } else {
        "STABLE".to_string()
    };

    Ok(HourlySnapshot {
        temperature_f: first.temperature,
        wind_speed_mph: parse_wind_mph(&first.wind_speed),
        max_gust_mph: max_wind + GUST_MARGIN_MPH,
        precip_prob_pct,
        lightning_forecast,
    })
}

/// Parses wind strings like "10 mph" or "5 to 10 mph" (the higher bound).
fn parse_wind_mph(wind: &str) -> u32 {
    wind.split_whitespace()
        .filter_map(|tok| tok.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

// ============================================================================
// Tests
// ============================================================================
