//! Shared test infrastructure.

/// Signal-logging DUT wrapper.
pub mod recording;
