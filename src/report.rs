//! Read-only rendering boundary.
//!
//! One evaluation cycle condensed into the accessors the presentation
//! layer needs: workability index, status, recommended actions, alert
//! outcome, and the 14-day dual-window precipitation table. The report
//! takes no input from the presentation layer beyond the optional engine
//! parameters (trailing window length, decay, thresholds).

use crate::alert::{AlertOutcome, generate_alerts};
use crate::analysis::api::{DEFAULT_DECAY, DEFAULT_WINDOW_DAYS, compute_api};
use crate::analysis::workability::{WorkabilityThresholds, classify, recommended_actions};
use crate::history::{HistorySeries, PrecipTableRow};
use crate::model::{Alert, PrecipitationRecord, SiteTelemetry, WorkabilityStatus};

/// Tunable engine parameters exposed at the rendering boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportParams {
    pub window_days: usize,
    pub decay: f64,
    pub thresholds: WorkabilityThresholds,
}

impl Default for ReportParams {
    fn default() -> Self {
        ReportParams {
            window_days: DEFAULT_WINDOW_DAYS,
            decay: DEFAULT_DECAY,
            thresholds: WorkabilityThresholds::default(),
        }
    }
}

/// A fully evaluated site report for one cycle. Derived on demand —
/// nothing here is a source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteReport {
    api: f64,
    status: WorkabilityStatus,
    outcome: AlertOutcome,
    table: Vec<PrecipTableRow>,
}

impl SiteReport {
    /// Evaluates the full pipeline: history → index → status → alerts,
    /// plus the dual-window table from history and forecast records.
    pub fn build(
        history: &HistorySeries,
        telemetry: &SiteTelemetry,
        forecast: &[PrecipitationRecord],
        params: &ReportParams,
    ) -> SiteReport {
        let api = compute_api(history, params.window_days, params.decay);
        let status = classify(api, &params.thresholds);
        let outcome = generate_alerts(telemetry, api, status);
        let table = history.merge_dual_window(forecast);
        SiteReport { api, status, outcome, table }
    }

    /// The antecedent precipitation index, rounded to 3 decimals.
    pub fn workability_index(&self) -> f64 {
        self.api
    }

    pub fn status(&self) -> WorkabilityStatus {
        self.status
    }

    /// Recommended field actions for the current status.
    pub fn actions(&self) -> &'static [&'static str] {
        recommended_actions(self.status)
    }

    /// The full alert outcome, including the distinct all-clear state.
    pub fn alert_outcome(&self) -> &AlertOutcome {
        &self.outcome
    }

    /// The alerts as a flat list; empty when all clear.
    pub fn alerts(&self) -> &[Alert] {
        self.outcome.alerts()
    }

    /// The dual-window precipitation table (≤14 rows).
    pub fn precipitation_table(&self) -> &[PrecipTableRow] {
        &self.table
    }
}
