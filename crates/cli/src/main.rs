//! DUT test harness CLI.
//!
//! This binary runs one simulation of a hardware model under the harness. It performs:
//! 1. **Setup:** Builds the harness configuration (JSON file, then flag overrides) and the run options.
//! 2. **Run:** Validates inputs, preloads memories, and drives the model until it ends; UART output goes to stdout.
//! 3. **Report:** Prints the verdict (test mode) or a summary, then the HPC counters with `--hpc`.
//!
//! Configuration errors exit with code 1. Test verdicts never change the exit code.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use dutsim_core::config::{CoreConfig, DetectionStrategy, UartProtocol};
use dutsim_core::dut::ScriptedDut;
use dutsim_core::report;
use dutsim_core::{HarnessConfig, HarnessError, RunConfig, RunController};

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    author,
    version,
    about = "Cycle-driven test harness for simulated hardware cores",
    long_about = "Drive a hardware model through reset and the per-cycle loop, feed it UART input, detect the end of the test program, and classify the run.\n\nExamples:\n  sim --boot boot.hex --test --trigger 12000 --ninst 4000\n  sim --boot boot.hex --model model.json --uart-in input.txt --uart-cycle 8\n  sim --boot boot.hex --config harness.json --vcd run.vcd --etd run.etd"
)]
struct Cli {
    /// Boot image (hex byte stream).
    #[arg(long)]
    boot: PathBuf,

    /// ROM image (hex byte stream).
    #[arg(long)]
    rom: Option<PathBuf>,

    /// Write a VCD waveform to this file.
    #[arg(long)]
    vcd: Option<PathBuf>,

    /// Test mode: classify the run as SUCCESS, WRONG_INFO, TIMEOUT, or FAILED.
    #[arg(long)]
    test: bool,

    /// Expected cycle count; the run is cut off 100 cycles after it.
    #[arg(long)]
    trigger: Option<u64>,

    /// Expected retired-instruction count.
    #[arg(long)]
    ninst: Option<u64>,

    /// Re-assert reset for 50 cycles starting at this cycle.
    #[arg(long)]
    reset: Option<u64>,

    /// UART input: whitespace-separated decimal words.
    #[arg(long = "uart-in")]
    uart_in: Option<PathBuf>,

    /// UART cycles per bit; also echoes UART output to stdout.
    #[arg(long = "uart-cycle")]
    uart_cycle: Option<u64>,

    /// Write the execution trace to this file.
    #[arg(long)]
    etd: Option<PathBuf>,

    /// Print hardware performance counters after the report.
    #[arg(long)]
    hpc: bool,

    /// Scripted model description (JSON). Without it every model output reads 0.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Harness configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Core preset, overriding the configuration file (e.g. C32AB1V000).
    #[arg(long)]
    core: Option<String>,

    /// UART protocol, overriding the configuration file.
    #[arg(long, value_enum)]
    protocol: Option<ProtocolArg>,

    /// End-detection strategy, overriding the configuration file.
    #[arg(long = "detect", value_enum)]
    detection: Option<DetectionArg>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProtocolArg {
    /// Four lanes, one 32-bit word per handshake.
    Parallel,
    /// One lane, gated by UART idle and the GPIO write request.
    IdleGated,
}

impl From<ProtocolArg> for UartProtocol {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Parallel => Self::Parallel,
            ProtocolArg::IdleGated => Self::IdleGated,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DetectionArg {
    /// Debug registers x31/x30 and the instret CSR.
    DebugRegister,
    /// GPIO mailbox event bits and payload.
    GpioMailbox,
}

impl From<DetectionArg> for DetectionStrategy {
    fn from(arg: DetectionArg) -> Self {
        match arg {
            DetectionArg::DebugRegister => Self::DebugRegister,
            DetectionArg::GpioMailbox => Self::GpioMailbox,
        }
    }
}

impl Cli {
    fn harness_config(&self) -> Result<HarnessConfig, HarnessError> {
        let mut harness = match &self.config {
            Some(path) => HarnessConfig::from_json_file(path)?,
            None => HarnessConfig::default(),
        };
        if let Some(name) = &self.core {
            harness.core = CoreConfig::preset(name)?;
        }
        if let Some(protocol) = self.protocol {
            harness.uart_protocol = protocol.into();
        }
        if let Some(detection) = self.detection {
            harness.detection = detection.into();
        }
        Ok(harness)
    }

    fn run_config(&self) -> RunConfig {
        RunConfig {
            boot: self.boot.clone(),
            rom: self.rom.clone(),
            vcd: self.vcd.clone(),
            test: self.test,
            trigger: self.trigger,
            ninst: self.ninst,
            reset: self.reset,
            uart_in: self.uart_in.clone(),
            uart_cycle: self.uart_cycle,
            etd: self.etd.clone(),
            hpc: self.hpc,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        let _ = report::write_error(&mut io::stderr(), &e, io::stderr().is_terminal());
        process::exit(e.exit_code());
    }
}

/// Runs one simulation and prints its report.
///
/// UART output and the report share stdout; logs go to stderr.
fn run(cli: &Cli) -> Result<(), HarnessError> {
    let harness = cli.harness_config()?;
    let run = cli.run_config();

    let dut = match &cli.model {
        Some(path) => ScriptedDut::from_json_file(path)?,
        None => {
            tracing::warn!("no --model given: every model output reads 0");
            ScriptedDut::new()
        }
    };
    if cli.model.is_none() && run.armed_trigger().is_none() {
        tracing::warn!("no model and no --trigger: the run will not end on its own");
    }

    let mut controller = RunController::prepare(dut, harness, run)?;

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut out = stdout.lock();
    let verdict = controller.run(&mut out)?;
    report::write_report(&mut out, controller.run_config(), &verdict, color)?;
    if controller.run_config().hpc {
        controller.display_hpc(&mut out)?;
    }
    out.flush()?;
    Ok(())
}
