//! Timing and protocol constants.
//!
//! These values are part of the test protocol agreed with the software running on the DUT
//! and with the regression scripts that drive the harness; they are not tunable per run.

/// Number of edge-pairs reset is held asserted at the start of every run.
pub const RESET_CYCLES: u64 = 5;

/// Grace period (in cycles) after the trigger cycle before a run is force-terminated.
pub const TRIGGER_DELAY: u64 = 100;

/// Length (in cycles) of the reset window re-asserted by `--reset`.
pub const RESET_DELAY: u64 = 50;

/// Default UART cycles-per-bit programmed into the DUT's host UART.
pub const DEFAULT_UART_NCYCLE: u64 = 50;

/// Result code reported when the mailbox detector times out.
pub const TIMEOUT_RESULT: u64 = 0xFFFF_FFFF;

/// Number of send lanes used by the parallel UART protocol (one per byte of a 32-bit word).
pub const UART_PARALLEL_LANES: usize = 4;
