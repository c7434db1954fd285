//! Clock/reset sequencer.
//!
//! Drives the two-phase evaluation protocol: one call toggles the clock low, evaluates, then
//! high, evaluates, dumping the waveform at `2c` and `2c+1`. Reset is pulsed for
//! `RESET_CYCLES` edge-pairs at the start of every run and, when configured, re-asserted for
//! the window `[R, R + RESET_DELAY)`.

use std::io;

use crate::common::{RESET_CYCLES, RESET_DELAY};
use crate::dut::{Dut, SignalBus};
use crate::trace::TraceSinks;

/// Clock/reset sequencer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockResetSequencer {
    reset_at: Option<u64>,
    reset_high: bool,
}

impl ClockResetSequencer {
    /// Creates a sequencer; `reset_at` is the cycle at which reset is re-asserted, if any.
    pub const fn new(reset_at: Option<u64>) -> Self {
        Self {
            reset_at,
            reset_high: false,
        }
    }

    /// Whether the re-assert window covers `cycle`.
    pub fn in_reset_window(&self, cycle: u64) -> bool {
        self.reset_at
            .is_some_and(|start| cycle >= start && cycle < start.saturating_add(RESET_DELAY))
    }

    /// Holds reset for `RESET_CYCLES` edge-pairs starting at `*cycle`, then releases it.
    ///
    /// Advances `*cycle` by one per edge-pair. No retirement lines are written during the pulse.
    ///
    /// # Errors
    ///
    /// Propagates waveform write errors.
    pub fn pulse_reset<D: Dut>(
        &mut self,
        bus: &mut SignalBus<'_, D>,
        sinks: &mut TraceSinks,
        cycle: &mut u64,
    ) -> io::Result<()> {
        for _ in 0..RESET_CYCLES {
            bus.set_reset(true);
            Self::toggle(bus, sinks, *cycle, false)?;
            *cycle += 1;
        }
        bus.set_reset(false);
        self.reset_high = false;
        Ok(())
    }

    /// Performs one falling-edge and one rising-edge evaluation for `cycle`.
    ///
    /// # Errors
    ///
    /// Propagates trace write errors.
    pub fn advance_cycle<D: Dut>(
        &mut self,
        bus: &mut SignalBus<'_, D>,
        sinks: &mut TraceSinks,
        cycle: u64,
    ) -> io::Result<u64> {
        Self::toggle(bus, sinks, cycle, true)?;
        Ok(cycle)
    }

    /// Drives reset for the next cycle according to the re-assert window.
    pub fn apply_reset_window<D: Dut + ?Sized>(&mut self, bus: &mut SignalBus<'_, D>, cycle: u64) {
        let asserted = self.in_reset_window(cycle);
        if asserted != self.reset_high {
            tracing::debug!(cycle, asserted, "reset window edge");
            self.reset_high = asserted;
        }
        bus.set_reset(asserted);
    }

    fn toggle<D: Dut>(
        bus: &mut SignalBus<'_, D>,
        sinks: &mut TraceSinks,
        cycle: u64,
        retire: bool,
    ) -> io::Result<()> {
        bus.set_clock(false);
        bus.dut_mut().evaluate();
        sinks.dump_waveform(2 * cycle, bus.dut())?;
        if retire {
            sinks.write_retirements(bus)?;
        }

        bus.set_clock(true);
        bus.dut_mut().evaluate();
        sinks.dump_waveform(2 * cycle + 1, bus.dut())
    }
}
