//! Run verdict classification.
//!
//! In test mode a finished run is checked three ways:
//! 1. **Result:** the software's result code is 0.
//! 2. **Instructions:** retired instructions fall in `[ninst, ninst + NCORECOMMIT)`, when `--ninst` is given.
//! 3. **Cycles:** the observed cycle count equals the trigger, when `--trigger` is given.
//!
//! The label is `SUCCESS` when all hold, `WRONG_INFO` when only the result holds, `TIMEOUT` when
//! the result fails and the cycle budget was exhausted (or no budget was set), `FAILED` otherwise.

use std::fmt;

use crate::common::TRIGGER_DELAY;
use crate::config::RunConfig;
use crate::detect::{Detection, TerminationCause};

/// Test-mode verdict label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Result, instruction count, and cycle count all match.
    Success,
    /// Result is correct but the instruction or cycle count is off.
    WrongInfo,
    /// Result is wrong and the cycle budget ran out.
    Timeout,
    /// Result is wrong within the cycle budget.
    Failed,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "SUCCESS",
            Self::WrongInfo => "WRONG_INFO",
            Self::Timeout => "TIMEOUT",
            Self::Failed => "FAILED",
        })
    }
}

/// What a run is checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expectations {
    /// Whether classification is performed at all.
    pub test: bool,
    /// Expected retired instructions.
    pub ninst: Option<u64>,
    /// Expected cycle count.
    pub trigger: Option<u64>,
    /// Instret tolerance: instructions a core can retire in one cycle.
    pub ncorecommit: u64,
}

impl Expectations {
    /// Expectations of `run` on a core retiring up to `ncorecommit` instructions per cycle.
    pub const fn from_run(run: &RunConfig, ncorecommit: u64) -> Self {
        Self {
            test: run.test,
            ninst: run.ninst,
            trigger: run.trigger,
            ncorecommit,
        }
    }
}

/// Outcome of the three checks; all `true` outside test mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checks {
    /// Result code is 0.
    pub result_ok: bool,
    /// Instret within tolerance, or not checked.
    pub instret_ok: bool,
    /// Observed cycles equal the trigger, or not checked.
    pub cycle_ok: bool,
}

impl Checks {
    const PASSED: Self = Self {
        result_ok: true,
        instret_ok: true,
        cycle_ok: true,
    };
}

/// Applies the checks and the label priority rule.
///
/// `observed_cycle` is compared with the trigger; `elapsed` decides whether the budget ran out.
pub fn classify(
    exp: &Expectations,
    result: u64,
    instret: u64,
    observed_cycle: u64,
    elapsed: u64,
) -> (Checks, Verdict) {
    let checks = Checks {
        result_ok: result == 0,
        instret_ok: exp
            .ninst
            .is_none_or(|n| instret >= n && instret < n.saturating_add(exp.ncorecommit)),
        cycle_ok: exp.trigger.is_none_or(|t| observed_cycle == t),
    };

    let verdict = if checks.result_ok && checks.instret_ok && checks.cycle_ok {
        Verdict::Success
    } else if checks.result_ok {
        Verdict::WrongInfo
    } else if exp.trigger.is_none_or(|t| elapsed >= t.saturating_add(TRIGGER_DELAY)) {
        Verdict::Timeout
    } else {
        Verdict::Failed
    };
    (checks, verdict)
}

/// Final result of one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunVerdict {
    /// Why the run ended.
    pub cause: TerminationCause,
    /// Result code.
    pub result: u64,
    /// Retired instructions.
    pub instret: u64,
    /// Cycles elapsed, including the reset pulse.
    pub cycles: u64,
    /// Cycle count compared with the trigger: the mailbox-reported count when available,
    /// the elapsed count otherwise.
    pub observed_cycles: u64,
    /// Check outcomes.
    pub checks: Checks,
    /// Label, in test mode only.
    pub verdict: Option<Verdict>,
}

impl RunVerdict {
    /// Builds the verdict of a run that ended with `detection` after `cycles` cycles.
    pub fn new(detection: Detection, cycles: u64, exp: &Expectations) -> Self {
        let observed_cycles = detection.cycle.unwrap_or(cycles);
        let (checks, verdict) = if exp.test {
            let (checks, verdict) = classify(
                exp,
                detection.result,
                detection.instret,
                observed_cycles,
                cycles,
            );
            (checks, Some(verdict))
        } else {
            (Checks::PASSED, None)
        };
        Self {
            cause: detection.cause,
            result: detection.result,
            instret: detection.instret,
            cycles,
            observed_cycles,
            checks,
            verdict,
        }
    }
}
