//! Four-lane parallel UART handshake.
//!
//! Each 32-bit input word is split little-endian across four send lanes, all asserted valid
//! in the same cycle. A new word is loaded whenever the peer's lane-3 ready signal reads low;
//! on every other cycle all four valid flags are deasserted.

use crate::common::UART_PARALLEL_LANES;
use crate::dut::{Dut, SignalBus};
use crate::uart::{UartChannel, UartSource};

/// Number of send lanes (one per byte of a word).
pub const LANES: usize = UART_PARALLEL_LANES;

/// Lane whose ready signal gates the handshake.
const GATE_LANE: usize = LANES - 1;

/// Parallel UART peer.
#[derive(Debug, Clone)]
pub struct ParallelUart {
    source: Option<UartSource>,
    echo: bool,
    valid: [bool; LANES],
    sent: u64,
    exhausted_logged: bool,
}

impl ParallelUart {
    /// Creates the peer; see [`UartDispatch::new`](crate::uart::UartDispatch::new).
    pub const fn new(source: Option<UartSource>, echo: bool) -> Self {
        Self {
            source,
            echo,
            valid: [false; LANES],
            sent: 0,
            exhausted_logged: false,
        }
    }

    fn drive<D: Dut + ?Sized>(&mut self, bus: &mut SignalBus<'_, D>) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        let word = if bus.send_ready(GATE_LANE) {
            None
        } else {
            source.next_word()
        };
        match word {
            Some(word) => {
                for (lane, byte) in word.to_le_bytes().into_iter().enumerate() {
                    bus.send_byte(lane, byte);
                    self.valid[lane] = true;
                }
                self.sent += LANES as u64;
                tracing::trace!(word, "uart word sent");
            }
            None => {
                for lane in 0..LANES {
                    bus.clear_send(lane);
                    self.valid[lane] = false;
                }
                if source.is_exhausted() && !self.exhausted_logged {
                    self.exhausted_logged = true;
                    tracing::debug!(sent = self.sent, "uart input exhausted");
                }
            }
        }
    }
}

impl UartChannel for ParallelUart {
    fn service_cycle<D: Dut + ?Sized>(&mut self, bus: &mut SignalBus<'_, D>) -> Option<u8> {
        self.drive(bus);
        if !self.echo {
            return None;
        }
        let byte = bus.received();
        if let Some(byte) = byte {
            tracing::trace!(byte, "uart byte received");
        }
        byte
    }

    fn input_exhausted(&self) -> bool {
        self.source.as_ref().is_none_or(UartSource::is_exhausted)
    }

    fn bytes_sent(&self) -> u64 {
        self.sent
    }

    fn lanes_valid(&self) -> &[bool] {
        &self.valid
    }
}
