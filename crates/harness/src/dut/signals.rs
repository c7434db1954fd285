//! Signal bus adapter.
//!
//! Maps logical signals onto the DUT's flat port namespace. It provides:
//! 1. **Name table:** `SignalMap`, built once per run from the core configuration and GPIO layout,
//!    keyed by (core family, lane or core index, signal kind).
//! 2. **Typed access:** `SignalBus`, a borrow of the DUT plus the table with one accessor per
//!    logical signal, so protocol code never formats names on the hot path.

use crate::config::{CoreConfig, GpioLayout};
use crate::dut::Dut;
use crate::hpc::HpcCounter;

/// Debug register exposed per core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugRegister {
    /// `x31`: software sets it to 1 when the test program ends.
    EndFlag,
    /// `x30`: result code of the test program (0 = pass).
    Result,
    /// `instret` CSR: retired-instruction counter.
    Instret,
}

impl DebugRegister {
    const fn suffix(self) -> &'static str {
        match self {
            Self::EndFlag => "x_31",
            Self::Result => "x_30",
            Self::Instret => "csr_riscv_instret",
        }
    }
}

/// Field of one execution-trace (retirement) lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EtdField {
    /// Lane retired an instruction this cycle.
    Done,
    /// Hart id.
    Hart,
    /// Program counter.
    Pc,
    /// Instruction word.
    Instr,
    /// Cycle the instruction entered the pipeline.
    Tstart,
    /// Cycle the instruction retired.
    Tend,
    /// Data address accessed, if any.
    Daddr,
}

impl EtdField {
    /// All fields, in trace-line order after `Done`.
    pub const ALL: [Self; 7] = [
        Self::Done,
        Self::Hart,
        Self::Pc,
        Self::Instr,
        Self::Tstart,
        Self::Tend,
        Self::Daddr,
    ];

    const fn suffix(self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Hart => "hart",
            Self::Pc => "pc",
            Self::Instr => "instr",
            Self::Tstart => "tstart",
            Self::Tend => "tend",
            Self::Daddr => "daddr",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Inputs programming the DUT's host UART.
#[derive(Clone, Debug, PartialEq, Eq)]
struct UartConfigNames {
    en: String,
    is8bit: String,
    parity: String,
    stop: String,
    ncycle: String,
}

/// Flat names of every logical signal the harness touches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalMap {
    clock: String,
    reset: String,
    uart_config: UartConfigNames,
    send_valid: Vec<String>,
    send_data: Vec<String>,
    send_ready: Vec<String>,
    rec_valid: String,
    rec_data: String,
    rec_ready: String,
    uart_idle: String,
    gpio_event: String,
    gpio_payload: String,
    debug: Vec<[String; 3]>,
    etd: Vec<Vec<String>>,
    hpc: Vec<Vec<String>>,
}

/// Width assumed for a signal the model does not size: one bit for the clock, reset, and
/// handshake or status flags, 32 bits otherwise.
pub fn default_width(name: &str) -> u32 {
    let single_bit = ["_valid", "_ready", "_done", "_en", "_idle"];
    if name == "clock" || name == "reset" || single_bit.iter().any(|s| name.ends_with(s)) {
        1
    } else {
        32
    }
}

/// Host UART port prefix in the generated model.
const UART_PORT: &str = "io_b_host_uart_port_0";
/// Host UART configuration prefix in the generated model.
const UART_CONFIG: &str = "io_i_host_uart_config_0";

impl SignalMap {
    /// Builds the name table for `core`, with `send_lanes` UART send lanes.
    pub fn new(core: &CoreConfig, gpio: &GpioLayout, send_lanes: usize) -> Self {
        let family = core.family.as_str();
        let lane = |kind: &str| -> Vec<String> {
            (0..send_lanes)
                .map(|i| format!("{UART_PORT}_send_{i}_{kind}"))
                .collect()
        };
        let debug = (0..core.ncore)
            .map(|n| {
                [
                    DebugRegister::EndFlag,
                    DebugRegister::Result,
                    DebugRegister::Instret,
                ]
                .map(|reg| format!("io_o_dbg_{family}_{n}_{}", reg.suffix()))
            })
            .collect();
        let etd = (0..core.ncommit)
            .map(|c| {
                EtdField::ALL
                    .iter()
                    .map(|field| format!("io_o_etd_{c}_{}", field.suffix()))
                    .collect()
            })
            .collect();
        let hpc = (0..core.ncore)
            .map(|n| {
                HpcCounter::ALL
                    .iter()
                    .map(|counter| format!("io_o_dbg_{family}_{n}_hpc_{}", counter.suffix()))
                    .collect()
            })
            .collect();

        Self {
            clock: "clock".to_string(),
            reset: "reset".to_string(),
            uart_config: UartConfigNames {
                en: format!("{UART_CONFIG}_en"),
                is8bit: format!("{UART_CONFIG}_is8bit"),
                parity: format!("{UART_CONFIG}_parity"),
                stop: format!("{UART_CONFIG}_stop"),
                ncycle: format!("{UART_CONFIG}_ncycle"),
            },
            send_valid: lane("valid"),
            send_data: lane("data"),
            send_ready: lane("ready"),
            rec_valid: format!("{UART_PORT}_rec_0_valid"),
            rec_data: format!("{UART_PORT}_rec_0_data"),
            rec_ready: format!("{UART_PORT}_rec_0_ready"),
            uart_idle: "io_o_host_uart_status_0_idle".to_string(),
            gpio_event: gpio.event_signal.clone(),
            gpio_payload: gpio.payload_signal.clone(),
            debug,
            etd,
            hpc,
        }
    }

    /// Every name in the table, in declaration order. Names may repeat when two logical
    /// signals share a port (e.g. GPIO event and payload on one word).
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        let cfg = &self.uart_config;
        let lanes = self
            .send_valid
            .iter()
            .zip(&self.send_data)
            .zip(&self.send_ready)
            .flat_map(|((valid, data), ready)| [valid, data, ready]);
        [
            &self.clock,
            &self.reset,
            &cfg.en,
            &cfg.is8bit,
            &cfg.parity,
            &cfg.stop,
            &cfg.ncycle,
        ]
        .into_iter()
        .chain(lanes)
        .chain([
            &self.rec_valid,
            &self.rec_data,
            &self.rec_ready,
            &self.uart_idle,
            &self.gpio_event,
            &self.gpio_payload,
        ])
        .chain(self.debug.iter().flatten())
        .chain(self.etd.iter().flatten())
        .chain(self.hpc.iter().flatten())
        .map(String::as_str)
    }

    /// Number of UART send lanes in the table.
    pub fn send_lanes(&self) -> usize {
        self.send_valid.len()
    }

    /// Number of execution-trace lanes in the table.
    pub fn etd_lanes(&self) -> usize {
        self.etd.len()
    }

    /// Number of cores with debug signals in the table.
    pub fn cores(&self) -> usize {
        self.debug.len()
    }

    /// Clock input name.
    pub fn clock(&self) -> &str {
        &self.clock
    }

    /// Reset input name.
    pub fn reset(&self) -> &str {
        &self.reset
    }

    /// Send-lane valid input name.
    pub fn send_valid(&self, lane: usize) -> Option<&str> {
        self.send_valid.get(lane).map(String::as_str)
    }

    /// Send-lane data input name.
    pub fn send_data(&self, lane: usize) -> Option<&str> {
        self.send_data.get(lane).map(String::as_str)
    }

    /// Send-lane ready output name.
    pub fn send_ready(&self, lane: usize) -> Option<&str> {
        self.send_ready.get(lane).map(String::as_str)
    }

    /// Receive-lane valid output name.
    pub fn rec_valid(&self) -> &str {
        &self.rec_valid
    }

    /// Receive-lane data output name.
    pub fn rec_data(&self) -> &str {
        &self.rec_data
    }

    /// Debug register name of core `n`.
    pub fn debug(&self, n: usize, reg: DebugRegister) -> Option<&str> {
        self.debug.get(n).map(|names| names[reg as usize].as_str())
    }

    /// Execution-trace field name of lane `lane`.
    pub fn etd(&self, lane: usize, field: EtdField) -> Option<&str> {
        self.etd.get(lane).map(|names| names[field.index()].as_str())
    }

    /// HPC counter name of core `n`.
    pub fn hpc(&self, n: usize, counter: HpcCounter) -> Option<&str> {
        self.hpc.get(n).map(|names| names[counter.index()].as_str())
    }
}

/// Typed view of the DUT through the signal table.
///
/// Reads of signals the table does not name (an out-of-range lane or core) yield 0;
/// writes to them are dropped.
#[derive(Debug)]
pub struct SignalBus<'a, D: Dut + ?Sized> {
    dut: &'a mut D,
    map: &'a SignalMap,
}

impl<'a, D: Dut + ?Sized> SignalBus<'a, D> {
    /// Borrows `dut` for signal access through `map`.
    pub const fn new(dut: &'a mut D, map: &'a SignalMap) -> Self {
        Self { dut, map }
    }

    /// Underlying name table.
    pub const fn map(&self) -> &SignalMap {
        self.map
    }

    /// Read-only access to the DUT.
    pub fn dut(&self) -> &D {
        &*self.dut
    }

    /// Mutable access to the DUT (used for evaluation).
    pub fn dut_mut(&mut self) -> &mut D {
        &mut *self.dut
    }

    fn read(&self, name: Option<&str>) -> u64 {
        name.map_or(0, |n| self.dut.get_signal(n))
    }

    fn write(&mut self, name: Option<&str>, value: u64) {
        if let Some(n) = name {
            self.dut.set_signal(n, value);
        }
    }

    /// Drives the clock input.
    pub fn set_clock(&mut self, high: bool) {
        self.dut.set_signal(&self.map.clock, u64::from(high));
    }

    /// Drives the reset input.
    pub fn set_reset(&mut self, asserted: bool) {
        self.dut.set_signal(&self.map.reset, u64::from(asserted));
    }

    /// Programs the host UART: enabled, 8-bit, parity, one stop bit, `ncycle` cycles per bit.
    /// The receive lane is held ready.
    pub fn configure_uart(&mut self, ncycle: u64) {
        let cfg = &self.map.uart_config;
        self.dut.set_signal(&cfg.en, 1);
        self.dut.set_signal(&cfg.is8bit, 1);
        self.dut.set_signal(&cfg.parity, 1);
        self.dut.set_signal(&cfg.stop, 1);
        self.dut.set_signal(&cfg.ncycle, ncycle);
        self.dut.set_signal(&self.map.rec_ready, 1);
    }

    /// Drives one send lane with `data` and asserts its valid flag.
    pub fn send_byte(&mut self, lane: usize, data: u8) {
        let map = self.map;
        self.write(map.send_data(lane), u64::from(data));
        self.write(map.send_valid(lane), 1);
    }

    /// Deasserts the valid flag of one send lane.
    pub fn clear_send(&mut self, lane: usize) {
        let map = self.map;
        self.write(map.send_valid(lane), 0);
    }

    /// Whether the peer reports `lane` as ready.
    pub fn send_ready(&self, lane: usize) -> bool {
        self.read(self.map.send_ready(lane)) != 0
    }

    /// Byte on the receive lane, if its valid flag is asserted.
    pub fn received(&self) -> Option<u8> {
        (self.dut.get_signal(&self.map.rec_valid) != 0)
            .then(|| (self.dut.get_signal(&self.map.rec_data) & 0xFF) as u8)
    }

    /// Whether the host UART reports its transmitter idle.
    pub fn uart_idle(&self) -> bool {
        self.dut.get_signal(&self.map.uart_idle) != 0
    }

    /// GPIO event word.
    pub fn gpio_event(&self) -> u64 {
        self.dut.get_signal(&self.map.gpio_event)
    }

    /// Whether `bit` of the GPIO event word is set.
    pub fn gpio_bit(&self, bit: u32) -> bool {
        bit < 64 && (self.gpio_event() >> bit) & 1 == 1
    }

    /// GPIO payload word.
    pub fn gpio_payload(&self) -> u64 {
        self.dut.get_signal(&self.map.gpio_payload)
    }

    /// Debug register of core `n`.
    pub fn debug(&self, n: usize, reg: DebugRegister) -> u64 {
        self.read(self.map.debug(n, reg))
    }

    /// Execution-trace field of lane `lane`.
    pub fn etd(&self, lane: usize, field: EtdField) -> u64 {
        self.read(self.map.etd(lane, field))
    }

    /// HPC counter of core `n`.
    pub fn hpc(&self, n: usize, counter: HpcCounter) -> u64 {
        self.read(self.map.hpc(n, counter))
    }

    /// Whether the model has requested termination.
    pub fn host_requested_finish(&self) -> bool {
        self.dut.host_requested_finish()
    }
}
