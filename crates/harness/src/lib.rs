//! Cycle-driven test harness for simulated hardware cores.
//!
//! This crate is the control plane around an externally supplied hardware model (the DUT). It provides:
//! 1. **Signal bus:** A name table that maps logical signals (clock, reset, UART lanes, GPIO, debug) onto the model.
//! 2. **UART channel:** A host-side UART peer that feeds input words to the DUT and collects its output bytes.
//! 3. **End detection:** Debug-register and GPIO-mailbox strategies that decide when a run has finished.
//! 4. **Simulation:** Clock/reset sequencing, the run loop, and pass/fail/timeout classification.
//! 5. **Tracing and reporting:** Optional VCD and execution-trace sinks, console report, and HPC display.

/// Common types and constants (errors, timing constants).
pub mod common;
/// Harness configuration (core presets, protocol and detection strategies, run options).
pub mod config;
/// End-of-test detection strategies.
pub mod detect;
/// Device-under-test contract, signal name table, and the scripted model.
pub mod dut;
/// Hardware performance counter display.
pub mod hpc;
/// Console report of the run verdict.
pub mod report;
/// Pre-flight loading, clock/reset sequencing, run control, and verdicts.
pub mod sim;
/// Waveform and execution-trace sinks.
pub mod trace;
/// Host-side UART peer strategies.
pub mod uart;

/// Hardware-shape configuration; use `HarnessConfig::default()` or deserialize from JSON.
pub use crate::config::{HarnessConfig, RunConfig};
/// Library error type.
pub use crate::common::error::HarnessError;
/// Device-under-test contract implemented by hardware models.
pub use crate::dut::Dut;
/// Run controller; owns the DUT for the lifetime of a run.
pub use crate::sim::controller::RunController;
/// Final run result.
pub use crate::sim::verdict::{RunVerdict, Verdict};
