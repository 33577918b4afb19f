/// Core data types for the site workability monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic and no I/O — only types and the error taxonomy.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Precipitation records
// ---------------------------------------------------------------------------

/// Whether a daily precipitation value is an observed total or a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipKind {
    Actual,
    Forecast,
}

impl std::fmt::Display for PrecipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrecipKind::Actual => write!(f, "Actual"),
            PrecipKind::Forecast => write!(f, "Forecast"),
        }
    }
}

/// One daily precipitation value for the site.
///
/// Records are immutable once created; the history store only ever appends
/// them. `probability_pct` is populated for forecast records only — observed
/// totals have no probability.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecipitationRecord {
    pub date: NaiveDate,
    /// Daily precipitation in inches. Never negative.
    pub amount_in: f64,
    pub kind: PrecipKind,
    pub probability_pct: Option<u8>,
}

impl PrecipitationRecord {
    /// An observed daily total.
    pub fn actual(date: NaiveDate, amount_in: f64) -> Self {
        PrecipitationRecord {
            date,
            amount_in,
            kind: PrecipKind::Actual,
            probability_pct: None,
        }
    }

    /// A forward-looking forecast value with its probability of precipitation.
    pub fn forecast(date: NaiveDate, amount_in: f64, probability_pct: u8) -> Self {
        PrecipitationRecord {
            date,
            amount_in,
            kind: PrecipKind::Forecast,
            probability_pct: Some(probability_pct),
        }
    }
}

// ---------------------------------------------------------------------------
// Telemetry snapshot
// ---------------------------------------------------------------------------

/// 24-hour precipitation state for the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationState {
    /// Observed rainfall total over the trailing 24 hours, in inches.
    pub actual_24h: f64,
    /// Probability of precipitation from the near-term forecast, percent.
    pub forecast_prob: u8,
    /// "SATURATED" or "DRYING", derived from the 24h total.
    pub soil_status: String,
}

/// Stormwater Pollution Prevention Plan compliance state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwpppState {
    pub disturbed_acres: f64,
    /// Fill level of sediment basin SB-3, percent of capacity.
    pub sb3_capacity_pct: f64,
    /// Remaining freeboard in the basin, feet.
    pub freeboard_feet: f64,
    /// "OPTIMAL" or "MONITOR".
    pub silt_fence_integrity: String,
    /// Accumulated sediment as a percentage of basin volume.
    pub sediment_pct: f64,
}

/// Crane operating conditions from the hourly forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraneSafety {
    /// Sustained wind speed, mph.
    pub wind_speed: u32,
    /// Estimated maximum gust, mph.
    pub max_gust: u32,
    /// "GO" or "STOP".
    pub status: String,
}

/// Lightning risk state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightningState {
    /// "STABLE", "RISK", or "UNKNOWN".
    pub forecast: String,
    /// Detected strikes within 50 miles in the current window.
    pub recent_strikes_50mi: u32,
}

/// The versioned site telemetry snapshot.
///
/// Serializes one-to-one with the remote status record. Owned exclusively by
/// the telemetry publisher; every other module reads it and never writes it.
/// The version token travels alongside the value (see `publish::Versioned`),
/// not inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteTelemetry {
    pub project_name: String,
    /// Wall-clock timestamp of the last successful publish,
    /// e.g. "2026-08-29 06:00 EST".
    pub last_updated: String,
    pub precipitation: PrecipitationState,
    pub swppp: SwpppState,
    pub crane_safety: CraneSafety,
    pub lightning: LightningState,
}

// ---------------------------------------------------------------------------
// Workability
// ---------------------------------------------------------------------------

/// Soil workability status bands, in ascending order of severity.
///
/// Derived purely from the antecedent precipitation index; the derive order
/// gives `Optimal < Saturated < Critical < Restricted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkabilityStatus {
    Optimal,
    Saturated,
    Critical,
    Restricted,
}

impl std::fmt::Display for WorkabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkabilityStatus::Optimal => write!(f, "OPTIMAL"),
            WorkabilityStatus::Saturated => write!(f, "SATURATED"),
            WorkabilityStatus::Critical => write!(f, "CRITICAL"),
            WorkabilityStatus::Restricted => write!(f, "RESTRICTED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// Alert severity levels, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertLevel {
    Info,
    Warning,
    Danger,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Info => write!(f, "INFO"),
            AlertLevel::Warning => write!(f, "WARN"),
            AlertLevel::Danger => write!(f, "DANGER"),
        }
    }
}

/// One safety/compliance alert. Transient — regenerated every evaluation
/// cycle and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the precipitation history store.
#[derive(Debug, PartialEq)]
pub enum HistoryError {
    /// A record for this calendar day already exists. The store rejects the
    /// append rather than overwriting — history is append-only.
    DuplicateDate(NaiveDate),
    /// A row in the delimited history log could not be parsed.
    MalformedRow { line: usize, reason: String },
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::DuplicateDate(date) => {
                write!(f, "duplicate history record for {}", date)
            }
            HistoryError::MalformedRow { line, reason } => {
                write!(f, "malformed history row at line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for HistoryError {}

/// Errors raised by the telemetry publisher's remote I/O.
///
/// `Conflict` is the optimistic-concurrency signal: another writer committed
/// between our read and our conditional write. It is never fatal — the caller
/// retries on its own next scheduled cycle.
#[derive(Debug)]
pub enum PublishError {
    /// The remote version token changed since we read it.
    Conflict { expected: String },
    /// The remote store rejected or failed the request.
    Store(String),
    /// History append failed after the status record committed. The status
    /// record is already updated; the history log stays one row behind until
    /// the next successful cycle.
    HistoryAppend(String),
}

impl std::fmt::Display for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishError::Conflict { expected } => {
                write!(f, "version conflict: token {} is no longer current", expected)
            }
            PublishError::Store(msg) => write!(f, "remote store error: {}", msg),
            PublishError::HistoryAppend(msg) => {
                write!(f, "history append failed after status commit: {}", msg)
            }
        }
    }
}

impl std::error::Error for PublishError {}

/// Errors from external data providers (USGS, NWS, Open-Meteo).
///
/// These never reach the analysis or alert stages: the ingest layer absorbs
/// them and substitutes the documented safe defaults.
#[derive(Debug)]
pub enum ProviderError {
    /// Non-2xx HTTP response.
    HttpError(u16),
    /// The response body could not be deserialized.
    ParseError(String),
    /// Transport failure — DNS, timeout, connection refused.
    Unavailable(String),
    /// The response parsed but contained no usable values.
    NoDataAvailable(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::HttpError(code) => write!(f, "HTTP error: {}", code),
            ProviderError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ProviderError::Unavailable(msg) => write!(f, "Provider unavailable: {}", msg),
            ProviderError::NoDataAvailable(what) => {
                write!(f, "No data available: {}", what)
            }
        }
    }
}

impl std::error::Error for ProviderError {}
