//! Device-under-test contract.
//!
//! The DUT is an externally generated, cycle-accurate hardware model. The harness never looks
//! inside it: it sets input signals, evaluates, reads output signals, and preloads memories.
//! This module provides:
//! 1. **`Dut` trait:** The signal-level contract every hardware model implements.
//! 2. **Signal table:** Logical signal names built once from the core configuration (`signals`).
//! 3. **Scripted model:** A JSON-described behavioral model for tests and dry runs (`scripted`).

use std::io;
use std::path::Path;

/// JSON-described behavioral DUT.
pub mod scripted;
/// Logical signal name table and typed bus adapter.
pub mod signals;

pub use scripted::ScriptedDut;
pub use signals::{SignalBus, SignalMap};

/// One signal as seen by a trace sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignalSample<'a> {
    /// Flat signal name in the model's namespace.
    pub name: &'a str,
    /// Width in bits (1..=64).
    pub width: u32,
    /// Current value, zero-extended.
    pub value: u64,
}

/// Hardware model driven by the harness.
///
/// Implementations wrap a generated simulation model. Signal names are the model's flat port
/// names (e.g. `io_b_host_uart_port_0_send_0_valid`); reading an unknown signal yields 0.
pub trait Dut {
    /// Drives an input signal. The value takes effect at the next `evaluate`.
    fn set_signal(&mut self, name: &str, value: u64);
    /// Reads the current value of a signal.
    fn get_signal(&self, name: &str) -> u64;
    /// Advances combinational and sequential state one half-cycle.
    fn evaluate(&mut self);
    /// Loads a hex byte stream into the memory at `scope` before the first evaluation.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the image cannot be read.
    fn preload_memory(&mut self, scope: &str, path: &Path) -> io::Result<()>;
    /// Whether the model itself has requested termination (e.g. `$finish`).
    fn host_requested_finish(&self) -> bool {
        false
    }
    /// Visits every signal for waveform capture, in a stable order.
    fn for_each_signal(&self, visit: &mut dyn FnMut(SignalSample<'_>));
}

impl<D: Dut + ?Sized> Dut for Box<D> {
    fn set_signal(&mut self, name: &str, value: u64) {
        (**self).set_signal(name, value);
    }

    fn get_signal(&self, name: &str) -> u64 {
        (**self).get_signal(name)
    }

    fn evaluate(&mut self) {
        (**self).evaluate();
    }

    fn preload_memory(&mut self, scope: &str, path: &Path) -> io::Result<()> {
        (**self).preload_memory(scope, path)
    }

    fn host_requested_finish(&self) -> bool {
        (**self).host_requested_finish()
    }

    fn for_each_signal(&self, visit: &mut dyn FnMut(SignalSample<'_>)) {
        (**self).for_each_signal(visit);
    }
}
