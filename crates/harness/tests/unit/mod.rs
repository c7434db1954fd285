//! # Harness Components
//!
//! Tests grouped by the component they exercise, from configuration parsing up to full runs
//! through the controller.

/// Harness and run configuration parsing.
pub mod config;
/// Full runs through the controller: ordering, termination, determinism.
pub mod controller;
/// End-of-test detection strategies.
pub mod detect;
/// Pre-flight validation and memory preload.
pub mod loader;
/// Verdict classification table.
pub mod verdict;
