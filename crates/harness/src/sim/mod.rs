//! Simulation control.
//!
//! Provides pre-flight input validation and memory preload, the clock/reset sequencer, the run
//! controller that owns the per-cycle loop, and verdict classification.

/// Run controller and per-cycle loop.
pub mod controller;
/// Input validation and memory preload.
pub mod loader;
/// Clock and reset sequencing.
pub mod sequencer;
/// Verdict classification.
pub mod verdict;
