//! End-of-test detection.
//!
//! A detector watches DUT outputs once per cycle, after the rising edge, and moves from
//! `Running` to `Ended` exactly once. It provides:
//! 1. **State:** `DetectorState` and the values captured at the end (`Detection`).
//! 2. **Strategies:** Debug-register polling (`debug`) and GPIO mailbox polling (`mailbox`).
//! 3. **Dispatch:** `DetectorDispatch`, chosen from the configured `DetectionStrategy`.

/// Debug-register polling.
pub mod debug;
/// GPIO mailbox polling.
pub mod mailbox;

pub use debug::DebugRegisterDetector;
pub use mailbox::MailboxDetector;

use crate::config::{DetectionStrategy, GpioLayout};
use crate::dut::{Dut, SignalBus};

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationCause {
    /// The test software signalled its end.
    SoftwareTrigger,
    /// The cycle budget (`trigger + TRIGGER_DELAY`) ran out.
    Timeout,
    /// The hardware model requested termination on its own.
    HostFinish,
}

impl std::fmt::Display for TerminationCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::SoftwareTrigger => "software trigger",
            Self::Timeout => "test-cycle timeout",
            Self::HostFinish => "host finish",
        })
    }
}

/// Values captured when a run ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection {
    /// Why the run ended.
    pub cause: TerminationCause,
    /// Result code reported by the software (0 = pass).
    pub result: u64,
    /// Retired-instruction count.
    pub instret: u64,
    /// Cycle count reported by the software, when the strategy provides one.
    pub cycle: Option<u64>,
}

/// Detector state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorState {
    /// No end condition observed yet.
    Running,
    /// The run has ended; further polls return the same detection.
    Ended(Detection),
}

impl DetectorState {
    /// Whether the run is still going.
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// End-of-test detection strategy.
pub trait EndDetector {
    /// Inspects the DUT after the rising edge of cycle `cycle` and returns the new state.
    ///
    /// Once `Ended`, the state never changes again.
    fn poll<D: Dut + ?Sized>(&mut self, bus: &SignalBus<'_, D>, cycle: u64) -> DetectorState;

    /// Current state without polling.
    fn state(&self) -> DetectorState;

    /// Best-effort values for a run cut short by the hardware model itself.
    fn snapshot<D: Dut + ?Sized>(&self, bus: &SignalBus<'_, D>) -> Detection;
}

/// Static dispatch over the detection strategies.
#[derive(Debug)]
pub enum DetectorDispatch {
    /// Debug-register polling.
    Debug(DebugRegisterDetector),
    /// GPIO mailbox polling.
    Mailbox(MailboxDetector),
}

impl DetectorDispatch {
    /// Builds the detector for `strategy`; `timeout_cycle` is `trigger + TRIGGER_DELAY` when armed.
    pub fn new(strategy: DetectionStrategy, gpio: &GpioLayout, timeout_cycle: Option<u64>) -> Self {
        match strategy {
            DetectionStrategy::DebugRegister => {
                Self::Debug(DebugRegisterDetector::new(timeout_cycle))
            }
            DetectionStrategy::GpioMailbox => {
                Self::Mailbox(MailboxDetector::new(gpio.clone(), timeout_cycle))
            }
        }
    }
}

impl EndDetector for DetectorDispatch {
    fn poll<D: Dut + ?Sized>(&mut self, bus: &SignalBus<'_, D>, cycle: u64) -> DetectorState {
        match self {
            Self::Debug(d) => d.poll(bus, cycle),
            Self::Mailbox(d) => d.poll(bus, cycle),
        }
    }

    fn state(&self) -> DetectorState {
        match self {
            Self::Debug(d) => d.state(),
            Self::Mailbox(d) => d.state(),
        }
    }

    fn snapshot<D: Dut + ?Sized>(&self, bus: &SignalBus<'_, D>) -> Detection {
        match self {
            Self::Debug(d) => d.snapshot(bus),
            Self::Mailbox(d) => d.snapshot(bus),
        }
    }
}
