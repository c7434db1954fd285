//! Execution-trace dump (ETD).
//!
//! One line per retirement lane per cycle, written only when the lane's `done` signal is set:
//! hart, pc, and instruction in 8-digit hex, start and end cycle in 8-digit decimal, data
//! address in 8-digit hex. Every field is followed by a single space.

use std::io::{self, Write};

use crate::dut::signals::EtdField;
use crate::dut::{Dut, SignalBus};

/// Execution-trace writer over any output.
#[derive(Debug)]
pub struct EtdWriter<W: Write> {
    out: W,
    lines: u64,
}

impl<W: Write> EtdWriter<W> {
    /// Wraps `out`.
    pub const fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    /// Lines written so far.
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    /// Writes one line for every lane whose `done` signal is set.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn write_cycle<D: Dut + ?Sized>(&mut self, bus: &SignalBus<'_, D>) -> io::Result<()> {
        for lane in 0..bus.map().etd_lanes() {
            if bus.etd(lane, EtdField::Done) != 1 {
                continue;
            }
            writeln!(
                self.out,
                "{:08x} {:08x} {:08x} {:08} {:08} {:08x} ",
                bus.etd(lane, EtdField::Hart),
                bus.etd(lane, EtdField::Pc),
                bus.etd(lane, EtdField::Instr),
                bus.etd(lane, EtdField::Tstart),
                bus.etd(lane, EtdField::Tend),
                bus.etd(lane, EtdField::Daddr),
            )?;
            self.lines += 1;
        }
        Ok(())
    }

    /// Flushes the output.
    ///
    /// # Errors
    ///
    /// Propagates flush errors.
    pub fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Releases the output.
    pub fn into_inner(self) -> W {
        self.out
    }
}
