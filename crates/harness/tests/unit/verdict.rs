//! # Verdict Classification Tests
//!
//! The label priority table, with an expected instruction count of 1000 on a core that retires
//! up to two instructions per cycle.

use dutsim_core::Verdict;
use dutsim_core::sim::verdict::{Expectations, classify};
use rstest::rstest;

const NINST: u64 = 1000;

fn expectations(trigger: Option<u64>) -> Expectations {
    Expectations {
        test: true,
        ninst: Some(NINST),
        trigger,
        ncorecommit: 2,
    }
}

#[rstest]
#[case::exact(0, 1000, Some(500), 500, 500, Verdict::Success)]
#[case::within_commit_width(0, 1001, Some(500), 500, 500, Verdict::Success)]
#[case::no_trigger(0, 1000, None, 731, 731, Verdict::Success)]
#[case::instret_past_tolerance(0, 1002, Some(500), 500, 500, Verdict::WrongInfo)]
#[case::instret_short(0, 999, Some(500), 500, 500, Verdict::WrongInfo)]
#[case::cycles_off(0, 1000, Some(500), 501, 501, Verdict::WrongInfo)]
#[case::bad_result_no_trigger(7, 1000, None, 40, 40, Verdict::Timeout)]
#[case::bad_result_within_budget(7, 1000, Some(500), 550, 550, Verdict::Failed)]
#[case::bad_result_budget_spent(7, 1000, Some(500), 600, 600, Verdict::Timeout)]
#[case::bad_result_all_wrong(1, 3, Some(500), 20, 20, Verdict::Failed)]
fn test_classification(
    #[case] result: u64,
    #[case] instret: u64,
    #[case] trigger: Option<u64>,
    #[case] observed: u64,
    #[case] elapsed: u64,
    #[case] expected: Verdict,
) {
    let (_, verdict) = classify(&expectations(trigger), result, instret, observed, elapsed);
    assert_eq!(verdict, expected);
}

#[test]
fn test_checks_reported_individually() {
    let (checks, verdict) = classify(&expectations(Some(500)), 0, 1000, 499, 499);
    assert!(checks.result_ok);
    assert!(checks.instret_ok);
    assert!(!checks.cycle_ok);
    assert_eq!(verdict, Verdict::WrongInfo);
}

#[test]
fn test_mailbox_cycle_compared_not_elapsed() {
    // Software reported exactly the trigger while the harness ran longer.
    let (checks, verdict) = classify(&expectations(Some(500)), 0, 1000, 500, 640);
    assert!(checks.cycle_ok);
    assert_eq!(verdict, Verdict::Success);
}

#[test]
fn test_labels() {
    assert_eq!(Verdict::Success.to_string(), "SUCCESS");
    assert_eq!(Verdict::WrongInfo.to_string(), "WRONG_INFO");
    assert_eq!(Verdict::Timeout.to_string(), "TIMEOUT");
    assert_eq!(Verdict::Failed.to_string(), "FAILED");
}
