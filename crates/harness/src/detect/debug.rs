//! Debug-register end detection.
//!
//! Polls core 0's debug outputs. The test software ends by writing 1 to `x31`, with its result
//! code in `x30`; the retired-instruction counter is read from the `instret` CSR.

use crate::detect::{Detection, DetectorState, EndDetector, TerminationCause};
use crate::dut::signals::DebugRegister;
use crate::dut::{Dut, SignalBus};

/// Core whose debug registers are polled.
const CORE: usize = 0;

/// Debug-register detector.
#[derive(Debug, Clone)]
pub struct DebugRegisterDetector {
    timeout_cycle: Option<u64>,
    state: DetectorState,
}

impl DebugRegisterDetector {
    /// Creates a detector that force-ends the run once the cycle exceeds `timeout_cycle`.
    pub const fn new(timeout_cycle: Option<u64>) -> Self {
        Self {
            timeout_cycle,
            state: DetectorState::Running,
        }
    }

    fn capture<D: Dut + ?Sized>(bus: &SignalBus<'_, D>, cause: TerminationCause) -> Detection {
        Detection {
            cause,
            result: bus.debug(CORE, DebugRegister::Result),
            instret: bus.debug(CORE, DebugRegister::Instret),
            cycle: None,
        }
    }
}

impl EndDetector for DebugRegisterDetector {
    fn poll<D: Dut + ?Sized>(&mut self, bus: &SignalBus<'_, D>, cycle: u64) -> DetectorState {
        if !self.state.is_running() {
            return self.state;
        }
        if bus.debug(CORE, DebugRegister::EndFlag) == 1 {
            self.state = DetectorState::Ended(Self::capture(bus, TerminationCause::SoftwareTrigger));
        } else if self.timeout_cycle.is_some_and(|limit| cycle > limit) {
            self.state = DetectorState::Ended(Self::capture(bus, TerminationCause::Timeout));
        }
        self.state
    }

    fn state(&self) -> DetectorState {
        self.state
    }

    fn snapshot<D: Dut + ?Sized>(&self, bus: &SignalBus<'_, D>) -> Detection {
        match self.state {
            DetectorState::Ended(detection) => detection,
            DetectorState::Running => Self::capture(bus, TerminationCause::HostFinish),
        }
    }
}
