//! Pre-flight input validation and memory preload.
//!
//! Every input file is checked before the DUT is evaluated for the first time. It performs:
//! 1. **Validation:** Boot, ROM, and UART input files must exist; UART tokens must be integers.
//! 2. **Preload:** Boot image into the boot scope, then the ROM image into the ROM scope.

use std::path::Path;

use crate::common::error::{HarnessError, InputKind};
use crate::config::{HarnessConfig, RunConfig};
use crate::dut::Dut;
use crate::uart::UartSource;

fn require_file(kind: InputKind, path: &Path) -> Result<(), HarnessError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(HarnessError::MissingFile {
            kind,
            path: path.to_path_buf(),
        })
    }
}

/// Validates the run's input files and loads the UART input, if one was given.
///
/// # Errors
///
/// Returns an error for a missing boot/ROM/UART file or a malformed UART token.
pub fn validate(run: &RunConfig) -> Result<Option<UartSource>, HarnessError> {
    require_file(InputKind::Boot, &run.boot)?;
    if let Some(rom) = &run.rom {
        require_file(InputKind::Rom, rom)?;
    }
    run.uart_in
        .as_deref()
        .map(UartSource::from_file)
        .transpose()
}

/// Preloads the boot image and, if given, the ROM image.
///
/// # Errors
///
/// Returns [`HarnessError::Io`] if the model cannot read an image.
pub fn preload<D: Dut + ?Sized>(
    dut: &mut D,
    harness: &HarnessConfig,
    run: &RunConfig,
) -> Result<(), HarnessError> {
    let load = |dut: &mut D, scope: &str, path: &Path| {
        dut.preload_memory(scope, path)
            .map_err(|source| HarnessError::Io {
                path: path.to_path_buf(),
                source,
            })
    };
    load(dut, &harness.boot_scope, &run.boot)?;
    if let Some(rom) = &run.rom {
        load(dut, &harness.rom_scope, rom)?;
    }
    Ok(())
}
