//! Trace sinks.
//!
//! Optional, cycle-scoped recorders fed by the sequencer. Sinks receive a read-only view of the
//! DUT; they never drive signals. It provides:
//! 1. **Waveform:** `WaveformSink`, with a VCD implementation (`vcd`), dumped at `2c` and `2c+1`.
//! 2. **Execution trace:** `EtdWriter`, one line per retiring lane per cycle (`etd`).
//! 3. **Ownership:** `TraceSinks`, the scoped set of sinks for one run, flushed by `finish`.

/// Execution-trace writer.
pub mod etd;
/// VCD waveform writer.
pub mod vcd;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub use etd::EtdWriter;
pub use vcd::VcdWriter;

use crate::dut::{Dut, SignalBus, SignalMap};

/// Time-stamped signal snapshot stream.
pub trait WaveformSink {
    /// Records the DUT's current signal values at `timestamp`.
    ///
    /// # Errors
    ///
    /// Propagates write errors from the underlying output.
    fn dump(&mut self, timestamp: u64, dut: &dyn Dut) -> io::Result<()>;

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Propagates write errors from the underlying output.
    fn finish(&mut self) -> io::Result<()>;
}

/// The trace sinks of one run.
#[derive(Default)]
pub struct TraceSinks {
    waveform: Option<Box<dyn WaveformSink>>,
    etd: Option<EtdWriter<Box<dyn Write>>>,
}

impl std::fmt::Debug for TraceSinks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceSinks")
            .field("waveform", &self.waveform.is_some())
            .field("etd", &self.etd.is_some())
            .finish()
    }
}

fn create(path: &Path) -> io::Result<BufWriter<File>> {
    File::create(path).map(BufWriter::new)
}

impl TraceSinks {
    /// No sinks.
    pub fn none() -> Self {
        Self::default()
    }

    /// Opens the VCD and execution-trace files that were requested. The VCD declares every
    /// signal in `map`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if an output file cannot be created.
    pub fn open(vcd: Option<&Path>, etd: Option<&Path>, map: &SignalMap) -> io::Result<Self> {
        let mut sinks = Self::none();
        if let Some(path) = vcd {
            let writer = VcdWriter::new(create(path)?, map.names());
            sinks = sinks.with_waveform(Box::new(writer));
        }
        if let Some(path) = etd {
            sinks = sinks.with_etd(Box::new(create(path)?));
        }
        Ok(sinks)
    }

    /// Attaches a waveform sink.
    #[must_use]
    pub fn with_waveform(mut self, sink: Box<dyn WaveformSink>) -> Self {
        self.waveform = Some(sink);
        self
    }

    /// Attaches an execution-trace output.
    #[must_use]
    pub fn with_etd(mut self, out: Box<dyn Write>) -> Self {
        self.etd = Some(EtdWriter::new(out));
        self
    }

    /// Whether a waveform sink is attached.
    pub const fn has_waveform(&self) -> bool {
        self.waveform.is_some()
    }

    /// Dumps the waveform at `timestamp`, if a waveform sink is attached.
    ///
    /// # Errors
    ///
    /// Propagates write errors from the sink.
    pub fn dump_waveform(&mut self, timestamp: u64, dut: &dyn Dut) -> io::Result<()> {
        match self.waveform.as_mut() {
            Some(sink) => sink.dump(timestamp, dut),
            None => Ok(()),
        }
    }

    /// Writes this cycle's retirement lines, if an execution-trace output is attached.
    ///
    /// # Errors
    ///
    /// Propagates write errors from the output.
    pub fn write_retirements<D: Dut + ?Sized>(&mut self, bus: &SignalBus<'_, D>) -> io::Result<()> {
        match self.etd.as_mut() {
            Some(etd) => etd.write_cycle(bus),
            None => Ok(()),
        }
    }

    /// Flushes and releases every sink.
    ///
    /// # Errors
    ///
    /// Returns the first flush error; every sink is still released.
    pub fn finish(&mut self) -> io::Result<()> {
        let waveform = self.waveform.take().map_or(Ok(()), |mut sink| sink.finish());
        let etd = self.etd.take().map_or(Ok(()), |mut etd| etd.finish());
        waveform.and(etd)
    }
}
