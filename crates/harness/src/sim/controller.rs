//! Run controller.
//!
//! Owns the DUT for the lifetime of a run and drives the per-cycle loop. Each iteration, in
//! this order:
//! 1. **Edges:** falling-edge evaluate (waveform, retirement trace), rising-edge evaluate (waveform).
//! 2. **Reset window:** drive reset for the next cycle.
//! 3. **UART:** service the send lanes and echo a received byte.
//! 4. **End check:** poll the detector.
//! 5. **Count:** increment the cycle counter.
//!
//! The loop stops when the detector reports an end or the model requests termination. An end the
//! detector already latched takes precedence over a termination request seen on the same check.
//! Reordering any two steps changes what the DUT observes, so the order is fixed here and nowhere
//! else.

use std::io::Write;

use crate::common::error::HarnessError;
use crate::config::{HarnessConfig, RunConfig};
use crate::detect::{DetectorDispatch, DetectorState, EndDetector, TerminationCause};
use crate::dut::{Dut, SignalBus, SignalMap};
use crate::hpc;
use crate::sim::loader;
use crate::sim::sequencer::ClockResetSequencer;
use crate::sim::verdict::{Expectations, RunVerdict};
use crate::trace::TraceSinks;
use crate::uart::{UartChannel, UartDispatch, UartSource};

/// Run controller: the DUT plus every per-run component.
#[derive(Debug)]
pub struct RunController<D: Dut> {
    dut: D,
    harness: HarnessConfig,
    run: RunConfig,
    map: SignalMap,
    sequencer: ClockResetSequencer,
    uart: UartDispatch,
    detector: DetectorDispatch,
    sinks: TraceSinks,
    cycle: u64,
}

impl<D: Dut> RunController<D> {
    /// Assembles a controller from already-validated inputs.
    ///
    /// `uart_source` is the validated UART input (see [`loader::validate`]); the DUT is expected to
    /// have its memories preloaded already.
    pub fn new(
        dut: D,
        harness: HarnessConfig,
        run: RunConfig,
        uart_source: Option<UartSource>,
        sinks: TraceSinks,
    ) -> Self {
        let map = Self::map_for(&harness);
        let uart = UartDispatch::new(
            harness.uart_protocol,
            uart_source,
            run.uart_echo(),
            harness.gpio.uart_write_bit,
        );
        let detector = DetectorDispatch::new(harness.detection, &harness.gpio, run.timeout_cycle());
        Self {
            dut,
            sequencer: ClockResetSequencer::new(run.reset),
            harness,
            run,
            map,
            uart,
            detector,
            sinks,
            cycle: 0,
        }
    }

    /// Validates inputs, preloads memories, opens the requested trace files, and assembles the
    /// controller.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for missing or malformed inputs, or an I/O error if a trace
    /// file cannot be created. The DUT is dropped on every error path.
    pub fn prepare(mut dut: D, harness: HarnessConfig, run: RunConfig) -> Result<Self, HarnessError> {
        let uart_source = loader::validate(&run)?;
        loader::preload(&mut dut, &harness, &run)?;
        let sinks = TraceSinks::open(
            run.vcd.as_deref(),
            run.etd.as_deref(),
            &Self::map_for(&harness),
        )?;
        Ok(Self::new(dut, harness, run, uart_source, sinks))
    }

    /// Signal table for `harness`: its core, GPIO layout, and the protocol's send lanes.
    pub fn map_for(harness: &HarnessConfig) -> SignalMap {
        let lanes = UartDispatch::send_lanes(harness.uart_protocol);
        SignalMap::new(&harness.core, &harness.gpio, lanes)
    }

    /// Runs the simulation to completion, echoing UART output bytes to `echo`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Output`] if a trace file or `echo` cannot be written.
    pub fn run<W: Write>(&mut self, echo: &mut W) -> Result<RunVerdict, HarnessError> {
        let mut bus = SignalBus::new(&mut self.dut, &self.map);
        bus.configure_uart(self.run.uart_ncycle());

        tracing::info!(
            core = %self.harness.core.name,
            protocol = ?self.harness.uart_protocol,
            detection = ?self.harness.detection,
            boot = %self.run.boot.display(),
            "starting run"
        );

        self.sequencer
            .pulse_reset(&mut bus, &mut self.sinks, &mut self.cycle)?;
        tracing::info!(cycle = self.cycle, "reset released");

        let detection = loop {
            if let DetectorState::Ended(detection) = self.detector.state() {
                break detection;
            }
            if bus.host_requested_finish() {
                let mut detection = self.detector.snapshot(&bus);
                detection.cause = TerminationCause::HostFinish;
                break detection;
            }

            let cycle = self
                .sequencer
                .advance_cycle(&mut bus, &mut self.sinks, self.cycle)?;
            self.sequencer.apply_reset_window(&mut bus, cycle);
            if let Some(byte) = self.uart.service_cycle(&mut bus) {
                echo.write_all(&[byte])?;
            }
            let state = self.detector.poll(&bus, cycle);
            self.cycle += 1;
            if let DetectorState::Ended(detection) = state {
                break detection;
            }
        };

        self.sinks.finish()?;
        echo.flush()?;

        let verdict = RunVerdict::new(
            detection,
            self.cycle,
            &Expectations::from_run(&self.run, self.harness.core.ncorecommit),
        );
        tracing::info!(
            cause = %verdict.cause,
            result = verdict.result,
            instret = verdict.instret,
            cycles = verdict.cycles,
            uart_bytes_sent = self.uart.bytes_sent(),
            "run finished"
        );
        Ok(verdict)
    }

    /// Writes the hardware performance counters of every core to `out`.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `out`.
    pub fn display_hpc<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        let bus = SignalBus::new(&mut self.dut, &self.map);
        hpc::display(&bus, self.harness.core.family.as_str(), out)
    }

    /// Cycles elapsed so far, including the reset pulse.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// The DUT.
    pub const fn dut(&self) -> &D {
        &self.dut
    }

    /// The UART channel.
    pub const fn uart(&self) -> &UartDispatch {
        &self.uart
    }

    /// The end-condition detector.
    pub const fn detector(&self) -> &DetectorDispatch {
        &self.detector
    }

    /// The signal name table.
    pub const fn signal_map(&self) -> &SignalMap {
        &self.map
    }

    /// Run configuration.
    pub const fn run_config(&self) -> &RunConfig {
        &self.run
    }

    /// Releases the DUT.
    pub fn into_dut(self) -> D {
        self.dut
    }
}
