//! Host-side UART peer.
//!
//! The harness plays the role of the UART peer on the other end of the DUT's host UART port.
//! Each cycle, between the rising edge and the end-condition check, the channel:
//! 1. **Sends:** Feeds words from the UART input file into the DUT's send lanes, honouring the
//!    strategy's readiness rule, and deasserts every send-valid flag otherwise.
//! 2. **Receives:** Returns the byte on the receive lane when its valid flag is asserted.
//!
//! End of input is terminal but not an error: the send lanes stay idle for the rest of the run.

/// Single-lane protocol gated by UART idle status and a GPIO write-request bit.
pub mod idle_gated;
/// Four-lane protocol loading one 32-bit word per handshake.
pub mod parallel;
/// Validated UART input words.
pub mod source;

pub use idle_gated::IdleGatedUart;
pub use parallel::ParallelUart;
pub use source::UartSource;

use crate::config::UartProtocol;
use crate::dut::{Dut, SignalBus};

/// Host-side UART peer strategy.
pub trait UartChannel {
    /// Services one cycle: drives the send lanes and samples the receive lane.
    ///
    /// Returns the byte received from the DUT this cycle, if any.
    fn service_cycle<D: Dut + ?Sized>(&mut self, bus: &mut SignalBus<'_, D>) -> Option<u8>;

    /// Whether the input source is exhausted (or was never configured).
    fn input_exhausted(&self) -> bool;

    /// Number of bytes handed to the DUT so far.
    fn bytes_sent(&self) -> u64;

    /// Valid flags last driven on the send lanes.
    fn lanes_valid(&self) -> &[bool];
}

/// Static dispatch over the two UART strategies.
#[derive(Debug)]
pub enum UartDispatch {
    /// Four-lane parallel handshake.
    Parallel(ParallelUart),
    /// Single-lane idle-gated handshake.
    IdleGated(IdleGatedUart),
}

impl UartDispatch {
    /// Builds the channel for `protocol`.
    ///
    /// `source` is `None` when no UART input file was given; the send lanes are then never driven.
    /// `echo` enables sampling of the receive lane. `write_bit` is the GPIO write-request bit used
    /// by the idle-gated protocol.
    pub fn new(protocol: UartProtocol, source: Option<UartSource>, echo: bool, write_bit: u32) -> Self {
        match protocol {
            UartProtocol::Parallel => Self::Parallel(ParallelUart::new(source, echo)),
            UartProtocol::IdleGated => {
                Self::IdleGated(IdleGatedUart::new(source, echo, write_bit))
            }
        }
    }

    /// Number of send lanes this strategy drives.
    pub const fn send_lanes(protocol: UartProtocol) -> usize {
        match protocol {
            UartProtocol::Parallel => parallel::LANES,
            UartProtocol::IdleGated => 1,
        }
    }
}

impl UartChannel for UartDispatch {
    fn service_cycle<D: Dut + ?Sized>(&mut self, bus: &mut SignalBus<'_, D>) -> Option<u8> {
        match self {
            Self::Parallel(uart) => uart.service_cycle(bus),
            Self::IdleGated(uart) => uart.service_cycle(bus),
        }
    }

    fn input_exhausted(&self) -> bool {
        match self {
            Self::Parallel(uart) => uart.input_exhausted(),
            Self::IdleGated(uart) => uart.input_exhausted(),
        }
    }

    fn bytes_sent(&self) -> u64 {
        match self {
            Self::Parallel(uart) => uart.bytes_sent(),
            Self::IdleGated(uart) => uart.bytes_sent(),
        }
    }

    fn lanes_valid(&self) -> &[bool] {
        match self {
            Self::Parallel(uart) => uart.lanes_valid(),
            Self::IdleGated(uart) => uart.lanes_valid(),
        }
    }
}
