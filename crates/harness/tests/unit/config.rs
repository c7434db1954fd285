//! # Configuration Tests
//!
//! Core presets, harness configuration JSON, and run option helpers.

use dutsim_core::HarnessError;
use dutsim_core::common::TRIGGER_DELAY;
use dutsim_core::config::*;
use pretty_assertions::assert_eq;

use crate::common::harness::Workspace;

#[test]
fn test_default_harness_config() {
    let config = HarnessConfig::default();
    assert_eq!(config.core.name, "P32AU1V000");
    assert_eq!(config.core.family, CoreFamily::Aubrac);
    assert_eq!(config.uart_protocol, UartProtocol::Parallel);
    assert_eq!(config.detection, DetectionStrategy::DebugRegister);
    assert_eq!(config.boot_scope, "TOP.CheeseSim.m_cheese.m_boot.m_ram.m_ram");
    assert_eq!(config.rom_scope, "TOP.CheeseSim.m_cheese.m_rom.m_ram.m_ram");
    assert_eq!(config.gpio.end_bit, 2);
}

#[test]
fn test_core_presets() {
    let aubrac = CoreConfig::preset("c32au1v020").unwrap();
    assert_eq!(aubrac.name, "C32AU1V020");
    assert_eq!(aubrac.family, CoreFamily::Aubrac);
    assert_eq!(aubrac.ncommit, 1);

    let abondance = CoreConfig::preset("P32AB1V000").unwrap();
    assert_eq!(abondance.family, CoreFamily::Abondance);
    assert_eq!(abondance.ncommit, 2);
    assert_eq!(abondance.ncorecommit, 2);

    let none = CoreConfig::preset("none").unwrap();
    assert_eq!(none.ncommit, 0);
    assert_eq!(none.ncore, 0);
}

#[test]
fn test_unknown_core_preset() {
    assert!(matches!(
        CoreConfig::preset("X64"),
        Err(HarnessError::UnknownCore(name)) if name == "X64"
    ));
}

#[test]
fn test_harness_config_from_json() {
    let ws = Workspace::new();
    let path = ws.file(
        "harness.json",
        r#"{
            "core": "C32AB1V000",
            "uart_protocol": "idle-gated",
            "detection": "gpio-mailbox",
            "gpio": { "end_bit": 5, "payload_signal": "io_o_gpio_2" }
        }"#,
    );
    let config = HarnessConfig::from_json_file(&path).unwrap();
    assert_eq!(config.core.family, CoreFamily::Abondance);
    assert_eq!(config.uart_protocol, UartProtocol::IdleGated);
    assert_eq!(config.detection, DetectionStrategy::GpioMailbox);
    assert_eq!(config.gpio.end_bit, 5);
    assert_eq!(config.gpio.payload_signal, "io_o_gpio_2");
    // Unspecified fields keep their defaults.
    assert_eq!(config.gpio.cycle_bit, 0);
    assert_eq!(config.gpio.event_signal, "io_o_gpio_0");
    assert_eq!(config.boot_scope, HarnessConfig::default().boot_scope);
}

#[test]
fn test_harness_config_unknown_core_in_json() {
    let ws = Workspace::new();
    let path = ws.file("harness.json", r#"{ "core": "Z99" }"#);
    assert!(matches!(
        HarnessConfig::from_json_file(&path),
        Err(HarnessError::Json { .. })
    ));
}

#[test]
fn test_harness_config_missing_file() {
    let ws = Workspace::new();
    let err = HarnessConfig::from_json_file(&ws.path("absent.json")).unwrap_err();
    assert!(matches!(err, HarnessError::MissingFile { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_run_config_trigger_arming() {
    let mut run = RunConfig::new("boot.hex");
    assert_eq!(run.timeout_cycle(), None);

    run.trigger = Some(0);
    assert_eq!(run.armed_trigger(), None);
    assert_eq!(run.timeout_cycle(), None);

    run.trigger = Some(200);
    assert_eq!(run.timeout_cycle(), Some(200 + TRIGGER_DELAY));
}

#[test]
fn test_run_config_timeout_cycle_saturates() {
    let mut run = RunConfig::new("boot.hex");
    run.trigger = Some(u64::MAX);
    assert_eq!(run.timeout_cycle(), Some(u64::MAX));
    run.trigger = Some(u64::MAX - TRIGGER_DELAY + 1);
    assert_eq!(run.timeout_cycle(), Some(u64::MAX));
}

#[test]
fn test_run_config_uart_cycle() {
    let mut run = RunConfig::new("boot.hex");
    assert_eq!(run.uart_ncycle(), 50);
    assert!(!run.uart_echo());

    run.uart_cycle = Some(8);
    assert_eq!(run.uart_ncycle(), 8);
    assert!(run.uart_echo());
}
