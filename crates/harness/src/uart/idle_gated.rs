//! Single-lane idle-gated UART handshake.
//!
//! One byte is sent per handshake, and only on a cycle where all of the following hold: input
//! remains, the host UART reports its transmitter idle, and the DUT software raises the GPIO
//! write-request bit. The word read from the input is masked to its low byte.

use crate::dut::{Dut, SignalBus};
use crate::uart::{UartChannel, UartSource};

/// Idle-gated UART peer.
#[derive(Debug, Clone)]
pub struct IdleGatedUart {
    source: Option<UartSource>,
    echo: bool,
    write_bit: u32,
    valid: [bool; 1],
    sent: u64,
    exhausted_logged: bool,
}

impl IdleGatedUart {
    /// Creates the peer; see [`UartDispatch::new`](crate::uart::UartDispatch::new).
    pub const fn new(source: Option<UartSource>, echo: bool, write_bit: u32) -> Self {
        Self {
            source,
            echo,
            write_bit,
            valid: [false],
            sent: 0,
            exhausted_logged: false,
        }
    }
}

impl UartChannel for IdleGatedUart {
    fn service_cycle<D: Dut + ?Sized>(&mut self, bus: &mut SignalBus<'_, D>) -> Option<u8> {
        if let Some(source) = self.source.as_mut() {
            let requested = bus.uart_idle() && bus.gpio_bit(self.write_bit);
            match requested.then(|| source.next_word()).flatten() {
                Some(word) => {
                    let byte = (word & 0xFF) as u8;
                    bus.send_byte(0, byte);
                    self.valid[0] = true;
                    self.sent += 1;
                    tracing::trace!(byte, "uart byte sent");
                }
                None => {
                    bus.clear_send(0);
                    self.valid[0] = false;
                    if source.is_exhausted() && !self.exhausted_logged {
                        self.exhausted_logged = true;
                        tracing::debug!(sent = self.sent, "uart input exhausted");
                    }
                }
            }
        }

        if self.echo { bus.received() } else { None }
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
