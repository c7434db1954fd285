//! Configuration system for the harness.
//!
//! This module defines the two configuration layers used to parameterize a run. It provides:
//! 1. **Defaults:** Memory scope names, GPIO mailbox layout, and the default core preset.
//! 2. **Core presets:** Family name and commit-lane counts for each supported core configuration.
//! 3. **Strategies:** UART protocol and end-detection strategy selection.
//! 4. **Run options:** Per-run inputs (`RunConfig`) parsed once by the CLI.
//!
//! `HarnessConfig` describes the shape of the hardware model and is fixed for a family of runs; it is
//! supplied as JSON (`--config`) or taken from `HarnessConfig::default()`. `RunConfig` carries the
//! per-run inputs from the command line.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::error::{HarnessError, InputKind};
use crate::common::{DEFAULT_UART_NCYCLE, TRIGGER_DELAY};

/// Default configuration constants for the harness.
mod defaults {
    /// Core preset used when none is configured.
    pub const CORE: &str = "P32AU1V000";

    /// Scope of the boot RAM inside the generated model.
    pub const BOOT_SCOPE: &str = "TOP.CheeseSim.m_cheese.m_boot.m_ram.m_ram";

    /// Scope of the ROM inside the generated model.
    pub const ROM_SCOPE: &str = "TOP.CheeseSim.m_cheese.m_rom.m_ram.m_ram";

    /// GPIO output word carrying mailbox event bits.
    pub const GPIO_EVENT_SIGNAL: &str = "io_o_gpio_0";

    /// GPIO output word carrying the mailbox payload.
    pub const GPIO_PAYLOAD_SIGNAL: &str = "io_o_gpio_1";

    /// Event bit: payload holds the cycle count.
    pub const GPIO_CYCLE_BIT: u32 = 0;

    /// Event bit: payload holds the retired-instruction count.
    pub const GPIO_INSTRET_BIT: u32 = 1;

    /// Event bit: software has finished, payload holds the result code.
    pub const GPIO_END_BIT: u32 = 2;

    /// Request bit: software is ready to accept the next UART byte.
    pub const GPIO_UART_WRITE_BIT: u32 = 3;
}

/// Core family; selects the prefix of the debug signal names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoreFamily {
    /// Single-issue in-order core.
    Aubrac,
    /// Dual-issue core.
    Abondance,
    /// No core attached (debug signals read as absent).
    None,
}

impl CoreFamily {
    /// Name used in generated signal names (`io_o_dbg_<family>_<n>_...`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aubrac => "aubrac",
            Self::Abondance => "abondance",
            Self::None => "none",
        }
    }
}

impl fmt::Display for CoreFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core configuration preset.
///
/// Deserializes from the preset name (e.g. `"C32AB1V000"`).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct CoreConfig {
    /// Preset name, upper-case.
    pub name: String,
    /// Core family.
    pub family: CoreFamily,
    /// Data width in bits.
    pub ndatabit: u32,
    /// Number of execution-trace (retirement) lanes.
    pub ncommit: usize,
    /// Maximum instructions one core can retire per cycle; bounds the instret tolerance.
    pub ncorecommit: u64,
    /// Number of cores exposing debug and HPC signals.
    pub ncore: usize,
}

impl CoreConfig {
    /// Looks up a core preset by name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::UnknownCore`] if the name is not a known preset.
    pub fn preset(name: &str) -> Result<Self, HarnessError> {
        let upper = name.to_ascii_uppercase();
        let (family, ncommit) = match upper.as_str() {
            "P32AU1V000" | "C32AU1V000" | "C32AU1V020" | "C32AU1V021" => (CoreFamily::Aubrac, 1),
            "P32AB1V000" | "C32AB1V000" | "C32AB1V020" | "C32AB1V021" => {
                (CoreFamily::Abondance, 2)
            }
            "NONE" => (CoreFamily::None, 0),
            _ => return Err(HarnessError::UnknownCore(name.to_string())),
        };
        Ok(Self {
            name: upper,
            family,
            ndatabit: 32,
            ncommit,
            ncorecommit: ncommit as u64,
            ncore: usize::from(family != CoreFamily::None),
        })
    }
}

impl TryFrom<String> for CoreConfig {
    type Error = HarnessError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::preset(&name)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            name: defaults::CORE.to_string(),
            family: CoreFamily::Aubrac,
            ndatabit: 32,
            ncommit: 1,
            ncorecommit: 1,
            ncore: 1,
        }
    }
}

/// Host-side UART protocol variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UartProtocol {
    /// Four byte lanes loaded in parallel with one 32-bit word, gated by lane 3's ready signal.
    #[default]
    Parallel,
    /// One byte lane, gated by the peer's idle status and a GPIO write-request bit.
    IdleGated,
}

/// End-of-test detection strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionStrategy {
    /// Poll the core's debug registers (x31 end flag, x30 result, instret CSR).
    #[default]
    DebugRegister,
    /// Poll event bits and payload of the GPIO mailbox.
    GpioMailbox,
}

/// Bit layout of the GPIO mailbox and the UART write-request bit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GpioLayout {
    /// Output word carrying event bits
    #[serde(default = "GpioLayout::default_event_signal")]
    pub event_signal: String,

    /// Output word carrying the payload of the current event
    #[serde(default = "GpioLayout::default_payload_signal")]
    pub payload_signal: String,

    /// Cycle-count-ready bit
    #[serde(default = "GpioLayout::default_cycle_bit")]
    pub cycle_bit: u32,

    /// Instret-ready bit
    #[serde(default = "GpioLayout::default_instret_bit")]
    pub instret_bit: u32,

    /// End bit
    #[serde(default = "GpioLayout::default_end_bit")]
    pub end_bit: u32,

    /// UART write-request bit (idle-gated protocol only)
    #[serde(default = "GpioLayout::default_uart_write_bit")]
    pub uart_write_bit: u32,
}

impl GpioLayout {
    fn default_event_signal() -> String {
        defaults::GPIO_EVENT_SIGNAL.to_string()
    }

    fn default_payload_signal() -> String {
        defaults::GPIO_PAYLOAD_SIGNAL.to_string()
    }

    fn default_cycle_bit() -> u32 {
        defaults::GPIO_CYCLE_BIT
    }

    fn default_instret_bit() -> u32 {
        defaults::GPIO_INSTRET_BIT
    }

    fn default_end_bit() -> u32 {
        defaults::GPIO_END_BIT
    }

    fn default_uart_write_bit() -> u32 {
        defaults::GPIO_UART_WRITE_BIT
    }
}

impl Default for GpioLayout {
    fn default() -> Self {
        Self {
            event_signal: Self::default_event_signal(),
            payload_signal: Self::default_payload_signal(),
            cycle_bit: defaults::GPIO_CYCLE_BIT,
            instret_bit: defaults::GPIO_INSTRET_BIT,
            end_bit: defaults::GPIO_END_BIT,
            uart_write_bit: defaults::GPIO_UART_WRITE_BIT,
        }
    }
}

/// Hardware-shape configuration of the harness.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HarnessConfig {
    /// Core preset
    #[serde(default)]
    pub core: CoreConfig,

    /// UART protocol variant
    #[serde(default)]
    pub uart_protocol: UartProtocol,

    /// End-of-test detection strategy
    #[serde(default)]
    pub detection: DetectionStrategy,

    /// GPIO mailbox layout
    #[serde(default)]
    pub gpio: GpioLayout,

    /// Memory scope receiving the boot image
    #[serde(default = "HarnessConfig::default_boot_scope")]
    pub boot_scope: String,

    /// Memory scope receiving the ROM image
    #[serde(default = "HarnessConfig::default_rom_scope")]
    pub rom_scope: String,
}

impl HarnessConfig {
    fn default_boot_scope() -> String {
        defaults::BOOT_SCOPE.to_string()
    }

    fn default_rom_scope() -> String {
        defaults::ROM_SCOPE.to_string()
    }

    /// Loads a configuration from a JSON file; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not valid JSON for this schema.
    pub fn from_json_file(path: &Path) -> Result<Self, HarnessError> {
        if !path.exists() {
            return Err(HarnessError::MissingFile {
                kind: InputKind::Config,
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| HarnessError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            core: CoreConfig::default(),
            uart_protocol: UartProtocol::default(),
            detection: DetectionStrategy::default(),
            gpio: GpioLayout::default(),
            boot_scope: Self::default_boot_scope(),
            rom_scope: Self::default_rom_scope(),
        }
    }
}

/// Per-run options, parsed once from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Boot image (hex byte stream)
    pub boot: PathBuf,

    /// Optional ROM image (hex byte stream)
    #[serde(default)]
    pub rom: Option<PathBuf>,

    /// Optional VCD waveform output
    #[serde(default)]
    pub vcd: Option<PathBuf>,

    /// Test mode: classify the run as SUCCESS/WRONG_INFO/TIMEOUT/FAILED
    #[serde(default)]
    pub test: bool,

    /// Expected cycle count; also arms the timeout when non-zero
    #[serde(default)]
    pub trigger: Option<u64>,

    /// Expected retired-instruction count
    #[serde(default)]
    pub ninst: Option<u64>,

    /// Cycle at which reset is re-asserted for `RESET_DELAY` cycles
    #[serde(default)]
    pub reset: Option<u64>,

    /// UART input word file
    #[serde(default)]
    pub uart_in: Option<PathBuf>,

    /// UART cycles-per-bit; also enables echoing of UART output
    #[serde(default)]
    pub uart_cycle: Option<u64>,

    /// Optional execution-trace output
    #[serde(default)]
    pub etd: Option<PathBuf>,

    /// Print hardware performance counters after the report
    #[serde(default)]
    pub hpc: bool,
}

impl RunConfig {
    /// Creates a run configuration with only the boot image set.
    pub fn new(boot: impl Into<PathBuf>) -> Self {
        Self {
            boot: boot.into(),
            ..Self::default()
        }
    }

    /// Trigger cycle count if it arms the timeout (`T > 0`).
    pub fn armed_trigger(&self) -> Option<u64> {
        self.trigger.filter(|&t| t > 0)
    }

    /// Cycle after which the run is force-terminated, if a trigger is armed.
    pub fn timeout_cycle(&self) -> Option<u64> {
        self.armed_trigger().map(|t| t.saturating_add(TRIGGER_DELAY))
    }

    /// UART cycles-per-bit programmed into the DUT.
    pub fn uart_ncycle(&self) -> u64 {
        self.uart_cycle.unwrap_or(DEFAULT_UART_NCYCLE)
    }

    /// Whether bytes received from the DUT are echoed to the output stream.
    pub const fn uart_echo(&self) -> bool {
        self.uart_cycle.is_some()
    }
}
