//! Telemetry publishing under optimistic concurrency.
//!
//! The remote status record and history log are the only shared mutable
//! state in the service. Both are modeled as versioned resources: a read
//! returns the raw body plus an opaque version token, and a write commits
//! only if the token is still current. A concurrent writer surfaces as
//! `PublishError::Conflict` — the publisher never retries; the invoker
//! runs on a fixed schedule and a missed cycle is acceptable.
//!
//! The status record and history append cannot be made atomic across two
//! HTTP resources, so the publisher commits status first, then history.
//! If the history append fails the log stays one row behind until the next
//! successful cycle; `PublishError::HistoryAppend` reports exactly that.

use std::sync::Mutex;

use chrono::NaiveDate;

use crate::history::{HISTORY_HEADER, HistoryRow, parse_history_log};
use crate::ingest::HourlySnapshot;
use crate::model::{PublishError, SiteTelemetry};

// ---------------------------------------------------------------------------
// Versioned resource abstraction
// ---------------------------------------------------------------------------

/// A value read from a versioned resource, paired with the token that
/// identifies the revision it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub token: String,
}

/// A single addressable remote resource supporting conditional updates.
///
/// `write` succeeds only if `expected_token` still names the current
/// revision; otherwise it fails with `Conflict` and changes nothing.
pub trait VersionedResource {
    fn read(&self) -> Result<Versioned<String>, PublishError>;
    fn write(&self, body: &str, expected_token: &str) -> Result<String, PublishError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (tests, development)
// ---------------------------------------------------------------------------

/// In-memory versioned resource. The token is a revision counter; every
/// committed write bumps it.
pub struct InMemoryResource {
    state: Mutex<(String, u64)>,
}

impl InMemoryResource {
    pub fn new(initial_body: impl Into<String>) -> Self {
        InMemoryResource {
            state: Mutex::new((initial_body.into(), 0)),
        }
    }
}

impl VersionedResource for InMemoryResource {
    fn read(&self) -> Result<Versioned<String>, PublishError> {
        let state = self.state.lock().expect("resource mutex poisoned");
        Ok(Versioned {
            value: state.0.clone(),
            token: state.1.to_string(),
        })
    }

    fn write(&self, body: &str, expected_token: &str) -> Result<String, PublishError> {
        let mut state = self.state.lock().expect("resource mutex poisoned");
        if state.1.to_string() != expected_token {
            return Err(PublishError::Conflict {
                expected: expected_token.to_string(),
            });
        }
        state.0 = body.to_string();
        state.1 += 1;
        Ok(state.1.to_string())
    }
}

// ---------------------------------------------------------------------------
// HTTP implementation (ETag / If-Match)
// ---------------------------------------------------------------------------

/// Versioned resource over HTTP conditional requests: the ETag is the
/// version token, writes send `If-Match`, and a 412 Precondition Failed
/// maps to `Conflict`.
pub struct HttpEtagResource {
    client: reqwest::blocking::Client,
    url: String,
    bearer_token: Option<String>,
}

impl HttpEtagResource {
    pub fn new(
        client: reqwest::blocking::Client,
        url: impl Into<String>,
        bearer_token: Option<String>,
    ) -> Self {
        HttpEtagResource {
            client,
            url: url.into(),
            bearer_token,
        }
    }

    fn authorize(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl VersionedResource for HttpEtagResource {
    fn read(&self) -> Result<Versioned<String>, PublishError> {
        let response = self
            .authorize(self.client.get(&self.url))
            .send()
            .map_err(|e| PublishError::Store(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PublishError::Store(format!("GET {}: HTTP {}", self.url, response.status())));
        }

        let token = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| PublishError::Store(format!("GET {}: no ETag header", self.url)))?;

        let value = response
            .text()
            .map_err(|e| PublishError::Store(e.to_string()))?;

        Ok(Versioned { value, token })
    }

    fn write(&self, body: &str, expected_token: &str) -> Result<String, PublishError> {
        let response = self
            .authorize(self.client.put(&self.url))
            .header(reqwest::header::IF_MATCH, expected_token)
            .body(body.to_string())
            .send()
            .map_err(|e| PublishError::Store(e.to_string()))?;

        if response.status() == reqwest::StatusCode::PRECONDITION_FAILED {
            return Err(PublishError::Conflict {
                expected: expected_token.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(PublishError::Store(format!("PUT {}: HTTP {}", self.url, response.status())));
        }

        // Servers return the new ETag on a successful conditional PUT.
        Ok(response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Snapshot derivation
// ---------------------------------------------------------------------------

/// Baseline SB-3 fill percentage in dry conditions.
const SB3_BASE_PCT: f64 = 58.0;

/// Basin freeboard at the baseline fill level, feet.
const SB3_FULL_FREEBOARD_FT: f64 = 3.4;

/// Gust speed (mph) at or above which crane status goes to STOP.
const CRANE_STOP_GUST_MPH: u32 = 30;

/// Fresh inputs for one publish cycle, already defaulted by the ingest
/// layer — nothing in here can be an error.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleInputs {
    pub today: NaiveDate,
    /// Display timestamp for the record, e.g. "2026-08-29 06:00 EST".
    pub timestamp: String,
    pub rainfall_24h: f64,
    pub hourly: HourlySnapshot,
}

/// Merges fresh readings into the shape of the existing record.
///
/// Static site facts (project name, disturbed acreage, sediment level,
/// strike count) carry over from the current record; everything weather-
/// driven is recomputed. Pure — exposed for direct testing.
pub fn derive_next_telemetry(current: &SiteTelemetry, inputs: &CycleInputs) -> SiteTelemetry {
    let rain = inputs.rainfall_24h;
    // Freeboard tracks the uncapped estimate: once inflow exceeds basin
    // capacity the reported fill pegs at 100% but the freeboard keeps
    // dropping to 0.0.
    let sb3_raw = SB3_BASE_PCT + rain * 10.0;
    let sb3_capacity_pct = sb3_raw.min(100.0);
    let freeboard_feet =
        (((SB3_FULL_FREEBOARD_FT - sb3_raw / 30.0).max(0.0)) * 10.0).round() / 10.0;

    let mut next = current.clone();
    next.last_updated = inputs.timestamp.clone();
    next.precipitation.actual_24h = rain;
    next.precipitation.forecast_prob = inputs.hourly.precip_prob_pct;
    next.precipitation.soil_status =
        if rain > 0.1 { "SATURATED" } else { "DRYING" }.to_string();
    next.swppp.sb3_capacity_pct = sb3_capacity_pct;
    next.swppp.freeboard_feet = freeboard_feet;
    next.swppp.silt_fence_integrity =
        if rain > 0.5 { "MONITOR" } else { "OPTIMAL" }.to_string();
    next.crane_safety.wind_speed = inputs.hourly.wind_speed_mph;
    next.crane_safety.max_gust = inputs.hourly.max_gust_mph;
    next.crane_safety.status = if inputs.hourly.max_gust_mph < CRANE_STOP_GUST_MPH {
        "GO"
    } else {
        "STOP"
    }
    .to_string();
    next.lightning.forecast = inputs.hourly.lightning_forecast.clone();
    next
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// Result of a successful publish cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitResult {
    pub telemetry: SiteTelemetry,
    /// Token of the newly committed status revision.
    pub token: String,
    /// The history row appended for today.
    pub appended: HistoryRow,
}

/// Writes telemetry snapshots to the remote status record and appends the
/// daily precipitation row to the remote history log.
pub struct TelemetryPublisher<'a> {
    status: &'a dyn VersionedResource,
    history: &'a dyn VersionedResource,
}

impl<'a> TelemetryPublisher<'a> {
    pub fn new(status: &'a dyn VersionedResource, history: &'a dyn VersionedResource) -> Self {
        TelemetryPublisher { status, history }
    }

    /// Reads the current status record and its version token.
    pub fn read_current(&self) -> Result<Versioned<SiteTelemetry>, PublishError> {
        let raw = self.status.read()?;
        let value: SiteTelemetry = serde_json::from_str(&raw.value)
            .map_err(|e| PublishError::Store(format!("status record parse: {}", e)))?;
        Ok(Versioned { value, token: raw.token })
    }

    /// Publishes a new snapshot computed from `inputs`, conditional on
    /// `current.token` still being the live revision.
    ///
    /// On token mismatch the status write fails with `Conflict` and nothing
    /// is committed — the caller re-reads and retries on its next cycle.
    /// The history append follows the status commit; its failure leaves the
    /// status record updated and is reported as `HistoryAppend`.
    pub fn publish(
        &self,
        current: &Versioned<SiteTelemetry>,
        inputs: &CycleInputs,
    ) -> Result<CommitResult, PublishError> {
        let telemetry = derive_next_telemetry(&current.value, inputs);
        let body = serde_json::to_string_pretty(&telemetry)
            .map_err(|e| PublishError::Store(format!("status record serialize: {}", e)))?;

        let token = self.status.write(&body, &current.token)?;

        let appended = HistoryRow {
            date: inputs.today,
            forecast_prob: inputs.hourly.precip_prob_pct,
            precip_actual: inputs.rainfall_24h,
            sb3_capacity_pct: telemetry.swppp.sb3_capacity_pct,
            max_gust: inputs.hourly.max_gust_mph,
        };
        self.append_history(&appended)?;

        Ok(CommitResult { telemetry, token, appended })
    }

    /// Convenience wrapper: read then publish in one call.
    pub fn run_cycle(&self, inputs: &CycleInputs) -> Result<CommitResult, PublishError> {
        let current = self.read_current()?;
        self.publish(&current, inputs)
    }

    fn append_history(&self, row: &HistoryRow) -> Result<(), PublishError> {
        let log = self
            .history
            .read()
            .map_err(|e| PublishError::HistoryAppend(e.to_string()))?;

        let rows = parse_history_log(&log.value)
            .map_err(|e| PublishError::HistoryAppend(e.to_string()))?;
        if rows.iter().any(|r| r.date == row.date) {
            return Err(PublishError::HistoryAppend(format!(
                "row for {} already exists",
                row.date,
            )));
        }

        let mut body = if log.value.trim().is_empty() {
            format!("{}\n", HISTORY_HEADER)
        } else {
            let mut existing = log.value.clone();
            if !existing.ends_with('\n') {
                existing.push('\n');
            }
            existing
        };
        body.push_str(&row.to_line());
        body.push('\n');

        self.history
            .write(&body, &log.token)
            .map_err(|e| PublishError::HistoryAppend(e.to_string()))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
