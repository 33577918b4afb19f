/// Workability analysis for the site monitoring service.
///
/// Pure, synchronous computations over the precipitation history. No I/O,
/// no shared state — safe to call from any thread without coordination.
///
/// Submodules:
/// - `api` — antecedent precipitation index (decayed rainfall sum).
/// - `workability` — threshold classification and recommended actions.

pub mod api;
pub mod workability;
