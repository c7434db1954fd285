//! Scripted behavioral DUT.
//!
//! A stand-in hardware model whose outputs follow a script instead of RTL. It performs:
//! 1. **Signal storage:** Every signal the harness drives or the script assigns, with its width.
//! 2. **Edge detection:** Script actions fire on rising clock edges, counted from the first edge.
//! 3. **Events:** Per-edge output assignments, either held or pulsed for a single cycle.
//! 4. **Wires:** Signal-to-signal copies sampled on every rising edge (e.g. UART send to receive).
//! 5. **Memories:** Hex byte streams loaded by `preload_memory`, kept per scope.
//!
//! Scripts are JSON:
//!
//! ```json
//! {
//!   "widths": { "io_o_gpio_0": 8 },
//!   "initial": { "io_o_host_uart_status_0_idle": 1 },
//!   "events": [
//!     { "cycle": 40, "set": { "io_o_gpio_0": 1, "io_o_gpio_1": 1234 }, "pulse": true }
//!   ],
//!   "wires": [ { "from": "io_b_host_uart_port_0_send_0_data", "to": "io_b_host_uart_port_0_rec_0_data" } ],
//!   "finish_at": 5000
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::{HarnessError, InputKind};
use crate::dut::signals::default_width;
use crate::dut::{Dut, SignalSample};

/// Output assignment applied on one rising edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScriptEvent {
    /// Rising-edge index (0 = first edge of the reset pulse)
    pub cycle: u64,

    /// Signal values to assign
    #[serde(default)]
    pub set: BTreeMap<String, u64>,

    /// Return the assigned signals to 0 on the next rising edge
    #[serde(default)]
    pub pulse: bool,
}

/// Copy of one signal onto another, sampled on every rising edge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScriptWire {
    /// Source signal
    pub from: String,
    /// Destination signal
    pub to: String,
}

/// JSON description of a scripted model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Script {
    /// Explicit signal widths in bits
    #[serde(default)]
    pub widths: BTreeMap<String, u32>,

    /// Values present before the first evaluation
    #[serde(default)]
    pub initial: BTreeMap<String, u64>,

    /// Per-edge output assignments
    #[serde(default)]
    pub events: Vec<ScriptEvent>,

    /// Per-edge signal copies
    #[serde(default)]
    pub wires: Vec<ScriptWire>,

    /// Rising-edge index from which the model requests termination
    #[serde(default)]
    pub finish_at: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    width: u32,
    value: u64,
}

const fn mask(width: u32) -> u64 {
    if width >= 64 { u64::MAX } else { (1 << width) - 1 }
}

/// Behavioral model driven by a [`Script`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedDut {
    signals: BTreeMap<String, Slot>,
    widths: BTreeMap<String, u32>,
    events: BTreeMap<u64, Vec<ScriptEvent>>,
    wires: Vec<ScriptWire>,
    finish_at: Option<u64>,
    pulsed: Vec<String>,
    memories: HashMap<String, Vec<u8>>,
    last_clock: u64,
    edges: u64,
    evaluations: u64,
}

impl ScriptedDut {
    /// Creates a model with no script: every output stays 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model from a parsed script.
    pub fn from_script(script: Script) -> Self {
        let mut dut = Self {
            widths: script.widths,
            wires: script.wires,
            finish_at: script.finish_at,
            ..Self::default()
        };
        for (name, value) in script.initial {
            dut.store(&name, value);
        }
        for event in script.events {
            dut.events.entry(event.cycle).or_default().push(event);
        }
        dut
    }

    /// Loads a script from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not a valid script.
    pub fn from_json_file(path: &Path) -> Result<Self, HarnessError> {
        if !path.exists() {
            return Err(HarnessError::MissingFile {
                kind: InputKind::Model,
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let script: Script = serde_json::from_str(&text).map_err(|source| HarnessError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_script(script))
    }

    /// Holds `set` from rising edge `cycle` on.
    #[must_use]
    pub fn with_event(mut self, cycle: u64, set: &[(&str, u64)]) -> Self {
        self.push_event(cycle, set, false);
        self
    }

    /// Asserts `set` on rising edge `cycle` only.
    #[must_use]
    pub fn with_pulse(mut self, cycle: u64, set: &[(&str, u64)]) -> Self {
        self.push_event(cycle, set, true);
        self
    }

    /// Copies `from` onto `to` on every rising edge.
    #[must_use]
    pub fn with_wire(mut self, from: &str, to: &str) -> Self {
        self.wires.push(ScriptWire {
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    /// Sets a signal before the first evaluation.
    #[must_use]
    pub fn with_initial(mut self, name: &str, value: u64) -> Self {
        self.store(name, value);
        self
    }

    /// Requests termination from rising edge `cycle` on.
    #[must_use]
    pub const fn with_finish_at(mut self, cycle: u64) -> Self {
        self.finish_at = Some(cycle);
        self
    }

    /// Number of rising edges seen so far.
    pub const fn rising_edges(&self) -> u64 {
        self.edges
    }

    /// Number of `evaluate` calls so far.
    pub const fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Bytes preloaded into `scope`, if any.
    pub fn memory(&self, scope: &str) -> Option<&[u8]> {
        self.memories.get(scope).map(Vec::as_slice)
    }

    fn push_event(&mut self, cycle: u64, set: &[(&str, u64)], pulse: bool) {
        let event = ScriptEvent {
            cycle,
            set: set.iter().map(|&(n, v)| (n.to_string(), v)).collect(),
            pulse,
        };
        self.events.entry(cycle).or_default().push(event);
    }

    fn width_of(&self, name: &str) -> u32 {
        self.widths
            .get(name)
            .copied()
            .unwrap_or_else(|| default_width(name))
    }

    fn store(&mut self, name: &str, value: u64) {
        if let Some(slot) = self.signals.get_mut(name) {
            slot.value = value & mask(slot.width);
            return;
        }
        let width = self.width_of(name);
        let _ = self.signals.insert(
            name.to_string(),
            Slot {
                width,
                value: value & mask(width),
            },
        );
    }

    fn load(&self, name: &str) -> u64 {
        self.signals.get(name).map_or(0, |slot| slot.value)
    }

    fn rising_edge(&mut self) {
        for name in std::mem::take(&mut self.pulsed) {
            self.store(&name, 0);
        }

        let copies: Vec<(String, u64)> = self
            .wires
            .iter()
            .map(|w| (w.to.clone(), self.load(&w.from)))
            .collect();
        for (to, value) in copies {
            self.store(&to, value);
        }

        if let Some(events) = self.events.remove(&self.edges) {
            for event in events {
                for (name, value) in &event.set {
                    self.store(name, *value);
                    if event.pulse {
                        self.pulsed.push(name.clone());
                    }
                }
            }
        }

        self.edges += 1;
    }
}

/// Parses a hex byte stream: whitespace-separated hex bytes, `@address` markers and `//` comments ignored.
fn parse_hex_bytes(text: &str) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for line in text.lines() {
        let line = line.split("//").next().unwrap_or_default();
        for token in line.split_whitespace() {
            if token.starts_with('@') {
                continue;
            }
            let byte = u8::from_str_radix(token, 16).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("bad hex byte {token:?}: {e}"),
                )
            })?;
            bytes.push(byte);
        }
    }
    Ok(bytes)
}

impl Dut for ScriptedDut {
    fn set_signal(&mut self, name: &str, value: u64) {
        self.store(name, value);
    }

    fn get_signal(&self, name: &str) -> u64 {
        self.load(name)
    }

    fn evaluate(&mut self) {
        self.evaluations += 1;
        let clock = self.load("clock");
        if clock == 1 && self.last_clock == 0 {
            self.rising_edge();
        }
        self.last_clock = clock;
    }

    fn preload_memory(&mut self, scope: &str, path: &Path) -> io::Result<()> {
        let text = fs::read_to_string(path)?;
        let bytes = parse_hex_bytes(&text)?;
        tracing::debug!(scope, bytes = bytes.len(), "preloaded memory");
        let _ = self.memories.insert(scope.to_string(), bytes);
        Ok(())
    }

    fn host_requested_finish(&self) -> bool {
        self.finish_at.is_some_and(|at| self.edges > at)
    }

    fn for_each_signal(&self, visit: &mut dyn FnMut(SignalSample<'_>)) {
        for (name, slot) in &self.signals {
            visit(SignalSample {
                name,
                width: slot.width,
                value: slot.value,
            });
        }
    }
}
