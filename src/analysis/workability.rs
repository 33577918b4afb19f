//! Workability classification.
//!
//! Maps the antecedent precipitation index to an ordered status band and
//! a fixed list of recommended field actions. Bands are inclusive-lower /
//! exclusive-upper, except Restricted which is closed above.

use crate::model::WorkabilityStatus;

/// API thresholds separating the workability bands, ascending.
///
/// Explicit parameters rather than module constants so tests and callers
/// can classify against arbitrary boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkabilityThresholds {
    /// Below this the soil is workable without restriction.
    pub saturated: f64,
    /// At or above `saturated` and below this: drying, plan around wet areas.
    pub critical: f64,
    /// At or above this the site is restricted.
    pub restricted: f64,
}

impl Default for WorkabilityThresholds {
    fn default() -> Self {
        WorkabilityThresholds {
            saturated: 0.30,
            critical: 0.60,
            restricted: 0.85,
        }
    }
}

/// Classifies an API value into a workability status.
///
/// Pure, total, deterministic:
///   api < saturated   → Optimal
///   api < critical    → Saturated
///   api < restricted  → Critical
///   otherwise         → Restricted
pub fn classify(api: f64, thresholds: &WorkabilityThresholds) -> WorkabilityStatus {
    if api < thresholds.saturated {
        WorkabilityStatus::Optimal
    } else if api < thresholds.critical {
        WorkabilityStatus::Saturated
    } else if api < thresholds.restricted {
        WorkabilityStatus::Critical
    } else {
        WorkabilityStatus::Restricted
    }
}

/// `classify` with the service's standard thresholds.
pub fn classify_default(api: f64) -> WorkabilityStatus {
    classify(api, &WorkabilityThresholds::default())
}

/// Recommended field actions for a status. Static lookup — the action lists
/// are fixed operating procedure, not computed.
pub fn recommended_actions(status: WorkabilityStatus) -> &'static [&'static str] {
    match status {
        WorkabilityStatus::Optimal => &[
            "Full earthwork and grading operations cleared",
            "Proceed with scheduled hauling and compaction",
        ],
        WorkabilityStatus::Saturated => &[
            "Limit heavy equipment to stabilized haul roads",
            "Stage grading work away from low-lying areas",
            "Inspect perimeter controls before end of shift",
        ],
        WorkabilityStatus::Critical => &[
            "Suspend mass grading; spot work only with superintendent approval",
            "Walk silt fence lines and basin outfalls",
            "Verify pump availability for sediment basins",
        ],
        WorkabilityStatus::Restricted => &[
            "No earthwork — soil disturbance prohibited",
            "All equipment to stabilized staging areas",
            "Full SWPPP inspection required before restart",
        ],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
