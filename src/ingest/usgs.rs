/// USGS NWIS Rain Gauge Client
///
/// Retrieves 24-hour precipitation totals from the USGS instantaneous
/// values API (parameter 00045, precipitation in inches per interval).
/// The daily total is the sum of the positive interval values.
///
/// API documentation: https://waterservices.usgs.gov/rest/IV-Service.html

use serde::Deserialize;

use crate::ingest::RainGauge;
use crate::model::ProviderError;

const NWIS_BASE_URL: &str = "https://waterservices.usgs.gov";

/// USGS parameter code for precipitation, inches per reporting interval.
pub const PARAM_PRECIP: &str = "00045";

// ============================================================================
// NWIS IV Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct IvResponse {
    value: IvBody,
}

#[derive(Debug, Deserialize)]
struct IvBody {
    #[serde(rename = "timeSeries")]
    time_series: Vec<IvTimeSeries>,
}

#[derive(Debug, Deserialize)]
struct IvTimeSeries {
    values: Vec<IvValueSet>,
}

#[derive(Debug, Deserialize)]
struct IvValueSet {
    value: Vec<IvPoint>,
}

#[derive(Debug, Deserialize)]
struct IvPoint {
    /// Numeric value as a string; USGS uses -999999 as a sentinel.
    value: String,
}

// ============================================================================
// Client
// ============================================================================

/// Live rain-gauge client over the NWIS IV endpoint.
pub struct UsgsRainGauge {
    client: reqwest::blocking::Client,
}

impl UsgsRainGauge {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        UsgsRainGauge { client }
    }
}

impl RainGauge for UsgsRainGauge {
    fn rainfall_24h(&self, station_id: &str) -> Result<f64, ProviderError> {
        let url = build_iv_url(station_id);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpError(response.status().as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        parse_iv_total(&body)
    }
}

/// Builds the IV request URL for the trailing day of precipitation data.
pub fn build_iv_url(station_id: &str) -> String {
    format!(
        "{}/nwis/iv/?format=json&sites={}&parameterCd={}&period=P1D",
        NWIS_BASE_URL, station_id, PARAM_PRECIP,
    )
}

/// Parses an IV response body and sums the positive interval values,
/// rounded to 2 decimal places.
///
/// Negative values are sentinels (-999999) or ice-affected readings and
/// are excluded from the total.
pub fn parse_iv_total(body: &str) -> Result<f64, ProviderError> {
    let response: IvResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ParseError(e.to_string()))?;

    let series = response
        .value
        .time_series
        .first()
        .ok_or_else(|| ProviderError::NoDataAvailable("no timeSeries in response".to_string()))?;

    let total: f64 = series
        .values
        .iter()
        .flat_map(|set| &set.value)
        .filter_map(|point| point.value.parse::<f64>().ok())
        .filter(|v| *v > 0.0)
        .sum();

    Ok((total * 100.0).round() / 100.0)
}

// ============================================================================
// Tests
// ============================================================================
