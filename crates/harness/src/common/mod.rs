//! Common types shared across the harness.
//!
//! Holds the timing constants of the test protocol and the library error type.

/// Timing constants used by the sequencer, detectors, and verdict logic.
pub mod constants;
/// Error type for configuration and pre-flight failures.
pub mod error;

pub use constants::*;
pub use error::HarnessError;
