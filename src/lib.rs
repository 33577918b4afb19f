//! Workability and alert engine for construction site monitoring.
//!
//! Ingests daily precipitation and site telemetry, derives a soil
//! workability signal from recent rainfall (the antecedent precipitation
//! index), classifies operational risk, and emits prioritized safety and
//! compliance alerts. Maintains a rolling 14-day precipitation timeline
//! (trailing actuals plus forward forecast) for reporting.
//!
//! The analysis and alert modules are pure; the only shared mutable state
//! is the remote status record and history log, written by `publish` under
//! optimistic concurrency.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod history;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod publish;
pub mod report;
