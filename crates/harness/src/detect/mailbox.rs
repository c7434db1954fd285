//! GPIO mailbox end detection.
//!
//! The test software reports through two GPIO output words: an event word with one bit per
//! event (cycle count ready, instret ready, end) and a payload word valid in the same cycle.
//! Mailbox values are transient, so each one is latched the first time its bit is seen and
//! later assertions of that bit are ignored.

use crate::common::TIMEOUT_RESULT;
use crate::config::GpioLayout;
use crate::detect::{Detection, DetectorState, EndDetector, TerminationCause};
use crate::dut::{Dut, SignalBus};

/// Mailbox detector.
#[derive(Debug, Clone)]
pub struct MailboxDetector {
    layout: GpioLayout,
    timeout_cycle: Option<u64>,
    cycle: Option<u64>,
    instret: Option<u64>,
    state: DetectorState,
}

impl MailboxDetector {
    /// Creates a detector for `layout`, force-ending the run once the cycle exceeds
    /// `timeout_cycle`.
    pub const fn new(layout: GpioLayout, timeout_cycle: Option<u64>) -> Self {
        Self {
            layout,
            timeout_cycle,
            cycle: None,
            instret: None,
            state: DetectorState::Running,
        }
    }

    /// Cycle count latched from the mailbox, if reported yet.
    pub const fn latched_cycle(&self) -> Option<u64> {
        self.cycle
    }

    /// Retired-instruction count latched from the mailbox, if reported yet.
    pub const fn latched_instret(&self) -> Option<u64> {
        self.instret
    }

    fn detection(&self, cause: TerminationCause, result: u64) -> Detection {
        Detection {
            cause,
            result,
            instret: self.instret.unwrap_or(0),
            cycle: self.cycle,
        }
    }
}

impl EndDetector for MailboxDetector {
    fn poll<D: Dut + ?Sized>(&mut self, bus: &SignalBus<'_, D>, cycle: u64) -> DetectorState {
        if !self.state.is_running() {
            return self.state;
        }

        let payload = bus.gpio_payload();
        if self.cycle.is_none() && bus.gpio_bit(self.layout.cycle_bit) {
            tracing::debug!(cycle, value = payload, "mailbox cycle latched");
            self.cycle = Some(payload);
        }
        if self.instret.is_none() && bus.gpio_bit(self.layout.instret_bit) {
            tracing::debug!(cycle, value = payload, "mailbox instret latched");
            self.instret = Some(payload);
        }
        if bus.gpio_bit(self.layout.end_bit) {
            self.state = DetectorState::Ended(
                self.detection(TerminationCause::SoftwareTrigger, payload),
            );
        }

        if self.timeout_cycle.is_some_and(|limit| cycle > limit) {
            self.state = DetectorState::Ended(self.detection(TerminationCause::Timeout, TIMEOUT_RESULT));
        }
        self.state
    }

    fn state(&self) -> DetectorState {
        self.state
    }

    fn snapshot<D: Dut + ?Sized>(&self, _bus: &SignalBus<'_, D>) -> Detection {
        match self.state {
            DetectorState::Ended(detection) => detection,
            DetectorState::Running => self.detection(TerminationCause::HostFinish, TIMEOUT_RESULT),
        }
    }
}
