/// Safety and compliance alerting.
///
/// Submodules:
/// - `rules` — the fixed, auditable rule set evaluated each cycle.

pub mod rules;

pub use rules::{AlertOutcome, generate_alerts};
