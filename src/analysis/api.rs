//! Antecedent precipitation index (API).
//!
//! The API is a recency-weighted sum of recent daily rainfall used as a
//! proxy for soil saturation: each trailing day's total is weighted by
//! `decay^i`, where `i` counts days back from the most recent included day.
//! Older rain contributes less; a decay of 0.85 roughly matches the
//! drainage behavior of the site's sandy-loam soils.

use crate::history::HistorySeries;

/// Default trailing window, in days.
pub const DEFAULT_WINDOW_DAYS: usize = 5;

/// Default daily decay factor. Must be in (0, 1).
pub const DEFAULT_DECAY: f64 = 0.85;

/// Computes the antecedent precipitation index over the trailing `days`
/// records of `history`.
///
/// Each record is weighted by `decay^i` where `i` is the number of
/// calendar days between it and the most recent included day: the most
/// recent day has weight `decay^0 = 1`, a day two calendar days back
/// `decay^2` even if the day between has no record (a missing day is
/// zero rainfall, and zero rain still decays what fell before it).
/// The result is rounded to 3 decimal places.
///
/// Total over its domain: an empty history yields 0.0, and days outside
/// the trailing window never influence the result. The index is
/// monotonically non-decreasing in every day's rainfall amount.
pub fn compute_api(history: &HistorySeries, days: usize, decay: f64) -> f64 {
    let window = history.trailing_window(days);
    let Some(latest) = window.last().map(|r| r.date) else {
        return 0.0;
    };

    let sum: f64 = window
        .iter()
        .map(|record| {
            let age_days = (latest - record.date).num_days() as i32;
            record.amount_in * decay.powi(age_days)
        })
        .sum();

    round3(sum)
}

/// `compute_api` with the service defaults (5-day window, 0.85 decay).
pub fn compute_api_default(history: &HistorySeries) -> f64 {
    compute_api(history, DEFAULT_WINDOW_DAYS, DEFAULT_DECAY)
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
