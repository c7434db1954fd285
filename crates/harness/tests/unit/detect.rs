//! # End Detection Tests
//!
//! Both detection strategies driven through full runs: software end, timeout, first-observation
//! latching of mailbox values, and termination requested by the model itself.

use dutsim_core::common::{TIMEOUT_RESULT, TRIGGER_DELAY};
use dutsim_core::config::DetectionStrategy;
use dutsim_core::detect::TerminationCause;
use dutsim_core::dut::ScriptedDut;
use dutsim_core::{HarnessConfig, RunConfig, Verdict};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::harness::{END_FLAG, GPIO_EVENT, GPIO_PAYLOAD, INSTRET, RESULT, run_scenario};

fn mailbox() -> HarnessConfig {
    HarnessConfig {
        detection: DetectionStrategy::GpioMailbox,
        ..HarnessConfig::default()
    }
}

fn test_run(trigger: Option<u64>, ninst: Option<u64>) -> RunConfig {
    let mut run = RunConfig::new("boot.hex");
    run.test = true;
    run.trigger = trigger;
    run.ninst = ninst;
    run
}

#[test]
fn test_debug_register_software_end() {
    let dut = ScriptedDut::new().with_event(40, &[(END_FLAG, 1), (RESULT, 0), (INSTRET, 1000)]);
    let out = run_scenario(dut, HarnessConfig::default(), test_run(None, Some(1000)), None);
    assert_eq!(out.verdict.cause, TerminationCause::SoftwareTrigger);
    assert_eq!(out.verdict.result, 0);
    assert_eq!(out.verdict.instret, 1000);
    assert_eq!(out.verdict.cycles, 41);
    assert_eq!(out.verdict.verdict, Some(Verdict::Success));
    // The loop stops on the cycle after the end is seen.
    assert_eq!(out.dut.rising_edges(), 41);
}

#[test]
fn test_debug_register_end_flag_beats_timeout_on_same_cycle() {
    let limit = 1 + TRIGGER_DELAY;
    let dut = ScriptedDut::new().with_event(limit + 1, &[(END_FLAG, 1), (RESULT, 0)]);
    let out = run_scenario(dut, HarnessConfig::default(), test_run(Some(1), None), None);
    assert_eq!(out.verdict.cause, TerminationCause::SoftwareTrigger);
}

#[test]
fn test_debug_register_timeout() {
    let trigger = 200;
    let dut = ScriptedDut::new().with_initial(RESULT, 1);
    let out = run_scenario(dut, HarnessConfig::default(), test_run(Some(trigger), None), None);
    assert_eq!(out.verdict.cause, TerminationCause::Timeout);
    assert_eq!(out.verdict.result, 1);
    assert_eq!(out.verdict.cycles, trigger + TRIGGER_DELAY + 2);
    assert_eq!(out.verdict.verdict, Some(Verdict::Timeout));
}

#[test]
fn test_zero_trigger_does_not_arm_timeout() {
    let dut = ScriptedDut::new().with_finish_at(TRIGGER_DELAY + 50);
    let out = run_scenario(dut, HarnessConfig::default(), test_run(Some(0), None), None);
    assert_eq!(out.verdict.cause, TerminationCause::HostFinish);
}

#[test]
fn test_mailbox_first_observation_wins() {
    let dut = ScriptedDut::new()
        .with_pulse(10, &[(GPIO_EVENT, 1 << 0), (GPIO_PAYLOAD, 100)])
        .with_pulse(50, &[(GPIO_EVENT, 1 << 0), (GPIO_PAYLOAD, 999)])
        .with_pulse(55, &[(GPIO_EVENT, 1 << 1), (GPIO_PAYLOAD, 1000)])
        .with_pulse(56, &[(GPIO_EVENT, 1 << 1), (GPIO_PAYLOAD, 5)])
        .with_pulse(60, &[(GPIO_EVENT, 1 << 2), (GPIO_PAYLOAD, 0)]);
    let out = run_scenario(dut, mailbox(), test_run(Some(100), Some(1000)), None);
    assert_eq!(out.verdict.cause, TerminationCause::SoftwareTrigger);
    assert_eq!(out.verdict.observed_cycles, 100);
    assert_eq!(out.verdict.instret, 1000);
    assert_eq!(out.verdict.cycles, 61);
    assert_eq!(out.verdict.verdict, Some(Verdict::Success));
}

#[test]
fn test_mailbox_end_payload_is_result() {
    let dut = ScriptedDut::new().with_pulse(30, &[(GPIO_EVENT, 1 << 2), (GPIO_PAYLOAD, 7)]);
    let out = run_scenario(dut, mailbox(), test_run(None, None), None);
    assert_eq!(out.verdict.result, 7);
    // No cycle was reported, so the elapsed count stands in.
    assert_eq!(out.verdict.observed_cycles, out.verdict.cycles);
    assert_eq!(out.verdict.verdict, Some(Verdict::Timeout));
}

#[test]
fn test_mailbox_timeout_reports_all_ones() {
    let trigger = 200;
    let out = run_scenario(ScriptedDut::new(), mailbox(), test_run(Some(trigger), None), None);
    assert_eq!(out.verdict.cause, TerminationCause::Timeout);
    assert_eq!(out.verdict.result, TIMEOUT_RESULT);
    assert_eq!(out.verdict.cycles, trigger + TRIGGER_DELAY + 2);
    assert_eq!(out.verdict.verdict, Some(Verdict::Timeout));
}

#[test]
fn test_host_finish_ends_run() {
    let dut = ScriptedDut::new().with_finish_at(30);
    let out = run_scenario(dut, HarnessConfig::default(), RunConfig::new("boot.hex"), None);
    assert_eq!(out.verdict.cause, TerminationCause::HostFinish);
    assert_eq!(out.verdict.cycles, 31);
    assert_eq!(out.verdict.verdict, None);
}

#[test]
fn test_latched_end_beats_host_finish_on_same_cycle() {
    let dut = ScriptedDut::new()
        .with_event(40, &[(END_FLAG, 1), (RESULT, 0), (INSTRET, 1000)])
        .with_finish_at(40);
    let out = run_scenario(dut, HarnessConfig::default(), test_run(None, Some(1000)), None);
    assert_eq!(out.verdict.cause, TerminationCause::SoftwareTrigger);
    assert_eq!(out.verdict.cycles, 41);
    assert_eq!(out.verdict.verdict, Some(Verdict::Success));
}

#[test]
fn test_mailbox_end_beats_host_finish_on_same_cycle() {
    let dut = ScriptedDut::new()
        .with_pulse(40, &[(GPIO_EVENT, 1 << 2), (GPIO_PAYLOAD, 0)])
        .with_finish_at(40);
    let out = run_scenario(dut, mailbox(), test_run(None, None), None);
    assert_eq!(out.verdict.cause, TerminationCause::SoftwareTrigger);
    assert_eq!(out.verdict.cycles, 41);
}

#[test]
fn test_maximal_trigger_does_not_overflow() {
    let dut = ScriptedDut::new().with_finish_at(30);
    let run = test_run(Some(u64::MAX), Some(u64::MAX));
    let out = run_scenario(dut, HarnessConfig::default(), run, None);
    assert_eq!(out.verdict.cause, TerminationCause::HostFinish);
    assert_eq!(out.verdict.cycles, 31);
    assert_eq!(out.verdict.verdict, Some(Verdict::WrongInfo));
}

proptest! {
    #[test]
    fn prop_mailbox_latches_first_cycle_report(
        reports in prop::collection::btree_map(10u64..80, any::<u32>(), 1..8),
    ) {
        let mut dut = ScriptedDut::new()
            .with_pulse(100, &[(GPIO_EVENT, 1 << 2), (GPIO_PAYLOAD, 0)]);
        for (&edge, &payload) in &reports {
            dut = dut.with_pulse(edge, &[(GPIO_EVENT, 1 << 0), (GPIO_PAYLOAD, u64::from(payload))]);
        }
        let out = run_scenario(dut, mailbox(), test_run(None, None), None);
        let first = reports.values().next().copied().map(u64::from);
        prop_assert_eq!(Some(out.verdict.observed_cycles), first);
        prop_assert_eq!(out.verdict.cycles, 101);
    }
}
