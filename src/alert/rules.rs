//! Alert rule evaluation.
//!
//! A small, fixed rule set over the telemetry snapshot and workability
//! status. Rules are evaluated independently and unconditionally — every
//! matching rule fires, in a fixed order, so the output is deterministic
//! and auditable. Adding a rule is a code change here, not configuration.

use crate::model::{Alert, AlertLevel, SiteTelemetry, WorkabilityStatus};

/// Gust speed (mph) above which crane operations must stop.
pub const CRANE_GUST_LIMIT_MPH: u32 = 25;

/// Sediment basin fill percentage above which pump-out is scheduled.
pub const SB3_PUMPOUT_PCT: f64 = 80.0;

/// Result of one evaluation cycle.
///
/// The calm state is a distinct variant rather than an empty list so the
/// presentation layer can render "no active alerts" unambiguously.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertOutcome {
    Active(Vec<Alert>),
    AllClear,
}

impl AlertOutcome {
    /// The alerts, empty when all clear. Convenience for callers that only
    /// iterate.
    pub fn alerts(&self) -> &[Alert] {
        match self {
            AlertOutcome::Active(alerts) => alerts,
            AlertOutcome::AllClear => &[],
        }
    }
}

/// Evaluates the alert rules against a telemetry snapshot.
///
/// Evaluation order (fixed):
///   1. wind — gust above the crane limit
///   2. lightning — any recent strikes within 50 miles
///   3. workability escalation — Restricted or Critical (mutually exclusive)
///   4. sediment basin — SB-3 above the pump-out threshold
///
/// `api` appears in alert text only; the classification itself happened
/// upstream in `analysis::workability`.
pub fn generate_alerts(
    telemetry: &SiteTelemetry,
    api: f64,
    status: WorkabilityStatus,
) -> AlertOutcome {
    let mut alerts = Vec::new();

    if telemetry.crane_safety.max_gust > CRANE_GUST_LIMIT_MPH {
        alerts.push(Alert {
            level: AlertLevel::Danger,
            title: "High wind".to_string(),
            message: format!(
                "Gusts to {} mph exceed the {} mph crane limit — suspend crane operations.",
                telemetry.crane_safety.max_gust, CRANE_GUST_LIMIT_MPH,
            ),
        });
    }

    if telemetry.lightning.recent_strikes_50mi > 0 {
        alerts.push(Alert {
            level: AlertLevel::Warning,
            title: "Lightning detected".to_string(),
            message: format!(
                "{} strike(s) within 50 miles — prepare evacuation protocol.",
                telemetry.lightning.recent_strikes_50mi,
            ),
        });
    }

    // Only the matching tier fires — Restricted does not also emit the
    // Critical warning.
    match status {
        WorkabilityStatus::Restricted => alerts.push(Alert {
            level: AlertLevel::Danger,
            title: "Site restricted".to_string(),
            message: format!(
                "Soil moisture index {:.3} — earthwork prohibited until soils drain.",
                api,
            ),
        }),
        WorkabilityStatus::Critical => alerts.push(Alert {
            level: AlertLevel::Warning,
            title: "Workability critical".to_string(),
            message: format!(
                "Soil moisture index {:.3} — limit grading and inspect controls.",
                api,
            ),
        }),
        WorkabilityStatus::Optimal | WorkabilityStatus::Saturated => {}
    }

    if telemetry.swppp.sb3_capacity_pct > SB3_PUMPOUT_PCT {
        alerts.push(Alert {
            level: AlertLevel::Warning,
            title: "Basin SB-3 capacity".to_string(),
            message: format!(
                "Basin at {:.0}% of capacity — schedule pump-out.",
                telemetry.swppp.sb3_capacity_pct,
            ),
        });
    }

    if alerts.is_empty() {
        AlertOutcome::AllClear
    } else {
        AlertOutcome::Active(alerts)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
