//! # Pre-flight Tests
//!
//! Input validation and memory preload performed by `RunController::prepare` before the model
//! is evaluated.

use dutsim_core::common::error::InputKind;
use dutsim_core::dut::ScriptedDut;
use dutsim_core::{HarnessConfig, HarnessError, RunConfig, RunController};
use pretty_assertions::assert_eq;

use crate::common::harness::Workspace;

fn prepare(run: RunConfig) -> Result<RunController<ScriptedDut>, HarnessError> {
    RunController::prepare(ScriptedDut::new(), HarnessConfig::default(), run)
}

fn missing_kind(result: Result<RunController<ScriptedDut>, HarnessError>) -> InputKind {
    match result {
        Err(HarnessError::MissingFile { kind, .. }) => kind,
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("missing input accepted"),
    }
}

#[test]
fn test_missing_boot_file() {
    let ws = Workspace::new();
    let result = prepare(RunConfig::new(ws.path("boot.hex")));
    assert_eq!(missing_kind(result), InputKind::Boot);
}

#[test]
fn test_missing_rom_file() {
    let ws = Workspace::new();
    let mut run = RunConfig::new(ws.file("boot.hex", "13 00 00 00\n"));
    run.rom = Some(ws.path("rom.hex"));
    assert_eq!(missing_kind(prepare(run)), InputKind::Rom);
}

#[test]
fn test_missing_uart_input_file() {
    let ws = Workspace::new();
    let mut run = RunConfig::new(ws.file("boot.hex", "13 00 00 00\n"));
    run.uart_in = Some(ws.path("uart.txt"));
    let err = prepare(run).unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("UART file does not exist"));
}

#[test]
fn test_malformed_uart_token_rejected_before_run() {
    let ws = Workspace::new();
    let mut run = RunConfig::new(ws.file("boot.hex", "13 00 00 00\n"));
    run.uart_in = Some(ws.file("uart.txt", "10 20 0x30\n"));
    match prepare(run) {
        Err(HarnessError::MalformedUartToken { index, token, .. }) => {
            assert_eq!(index, 2);
            assert_eq!(token, "0x30");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_missing_trace_file_is_not_required() {
    let ws = Workspace::new();
    let mut run = RunConfig::new(ws.file("boot.hex", "13 00 00 00\n"));
    run.vcd = Some(ws.path("out.vcd"));
    run.etd = Some(ws.path("out.etd"));
    let _controller = prepare(run).unwrap();
    assert!(ws.path("out.vcd").exists());
    assert!(ws.path("out.etd").exists());
}

#[test]
fn test_images_preloaded_into_scopes() {
    let ws = Workspace::new();
    let harness = HarnessConfig::default();
    let mut run = RunConfig::new(ws.file("boot.hex", "@0000\n13 00 00 00 // nop\n"));
    run.rom = Some(ws.file("rom.hex", "ef be ad de\n"));
    run.uart_in = Some(ws.file("uart.txt", "1 2 3"));

    let controller = RunController::prepare(ScriptedDut::new(), harness.clone(), run).unwrap();
    let dut = controller.dut();
    assert_eq!(dut.memory(&harness.boot_scope), Some(&[0x13, 0x00, 0x00, 0x00][..]));
    assert_eq!(dut.memory(&harness.rom_scope), Some(&[0xef, 0xbe, 0xad, 0xde][..]));
    assert_eq!(dut.evaluations(), 0);
}

#[test]
fn test_unreadable_boot_image_is_io_error() {
    let ws = Workspace::new();
    let run = RunConfig::new(ws.file("boot.hex", "not hex\n"));
    assert!(matches!(prepare(run), Err(HarnessError::Io { .. })));
}
