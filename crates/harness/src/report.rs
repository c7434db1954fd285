//! Console report.
//!
//! In test mode the report opens with a coloured `TEST REPORT: <label>.` line; otherwise with a
//! plain simulation header. Both are followed by the same block: input files, expected
//! instructions and cycles when those checks failed, and the observed counts.

use std::io::{self, Write};

use owo_colors::{OwoColorize, Style};

use crate::config::RunConfig;
use crate::sim::verdict::{RunVerdict, Verdict};

fn verdict_style(verdict: Verdict) -> Style {
    match verdict {
        Verdict::Success => Style::new().bold().green(),
        Verdict::WrongInfo => Style::new().bold().yellow(),
        Verdict::Timeout | Verdict::Failed => Style::new().bold().red(),
    }
}

/// Writes the report of a finished run to `out`; `color` enables ANSI styling.
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn write_report<W: Write>(
    out: &mut W,
    run: &RunConfig,
    verdict: &RunVerdict,
    color: bool,
) -> io::Result<()> {
    writeln!(out)?;
    match verdict.verdict {
        Some(label) => {
            let line = format!("TEST REPORT: {label}.");
            if color {
                writeln!(out, "{}", line.style(verdict_style(label)))?;
            } else {
                writeln!(out, "{line}")?;
            }
        }
        None => {
            let line = "SIMULATION REPORT";
            if color {
                writeln!(out, "{}", line.bold().white())?;
            } else {
                writeln!(out, "{line}")?;
            }
        }
    }

    writeln!(out, "BOOT file: {}", run.boot.display())?;
    if let Some(rom) = &run.rom {
        writeln!(out, "ROM file: {}", rom.display())?;
    }
    if let Some(vcd) = &run.vcd {
        writeln!(out, "VCD file: {}", vcd.display())?;
    }
    writeln!(out, "End cause: {}", verdict.cause)?;
    if !verdict.checks.instret_ok {
        if let Some(ninst) = run.ninst {
            writeln!(out, "Expected instructions: {ninst}")?;
        }
    }
    writeln!(out, "Retired instructions: {}", verdict.instret)?;
    if !verdict.checks.cycle_ok {
        if let Some(trigger) = run.trigger {
            writeln!(out, "Expected cycles: {trigger}")?;
        }
    }
    writeln!(out, "Real cycles: {}", verdict.observed_cycles)?;
    if verdict.observed_cycles != verdict.cycles {
        writeln!(out, "Simulated cycles: {}", verdict.cycles)?;
    }
    Ok(())
}

/// Writes a configuration error in the report's style.
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn write_error<W: Write>(out: &mut W, error: &dyn std::fmt::Display, color: bool) -> io::Result<()> {
    let line = format!("Error: {error}.");
    if color {
        writeln!(out, "{}", line.bold().red())
    } else {
        writeln!(out, "{line}")
    }
}
