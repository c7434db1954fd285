//! Hardware performance counter display.
//!
//! Each core exposes its HPC counters as debug outputs (`io_o_dbg_<family>_<n>_hpc_<name>`).
//! After a run the harness can dump every counter of every core in a fixed, labelled block.

use std::io::{self, Write};

use crate::dut::{Dut, SignalBus};

/// One hardware performance counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HpcCounter {
    /// ALU instructions.
    Alu,
    /// Branch-unit instructions.
    Bru,
    /// Cycles.
    Cycle,
    /// Retired instructions.
    Instret,
    /// L1 instruction cache hits.
    L1iHit,
    /// L1 instruction cache misses.
    L1iMiss,
    /// L1 instruction cache prefetches.
    L1iPrefetch,
    /// L1 data cache hits.
    L1dHit,
    /// L1 data cache misses.
    L1dMiss,
    /// L1 data cache prefetches.
    L1dPrefetch,
    /// L2 hits.
    L2Hit,
    /// L2 misses.
    L2Miss,
    /// L2 prefetches.
    L2Prefetch,
    /// Load instructions.
    Load,
    /// `rdcycle` instructions.
    RdCycle,
    /// Store instructions.
    Store,
    /// Time.
    Time,
    /// Function calls.
    Call,
    /// Function returns.
    Ret,
    /// `jal` instructions.
    Jal,
    /// `jalr` instructions.
    Jalr,
    /// Cache flush instructions.
    CacheFlush,
    /// Source dependency wait cycles.
    SrcDep,
}

impl HpcCounter {
    /// Every counter, in display order.
    pub const ALL: [Self; 23] = [
        Self::Alu,
        Self::Bru,
        Self::Cycle,
        Self::Instret,
        Self::L1iHit,
        Self::L1iMiss,
        Self::L1iPrefetch,
        Self::L1dHit,
        Self::L1dMiss,
        Self::L1dPrefetch,
        Self::L2Hit,
        Self::L2Miss,
        Self::L2Prefetch,
        Self::Load,
        Self::RdCycle,
        Self::Store,
        Self::Time,
        Self::Call,
        Self::Ret,
        Self::Jal,
        Self::Jalr,
        Self::CacheFlush,
        Self::SrcDep,
    ];

    /// Signal name suffix.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Alu => "alu",
            Self::Bru => "bru",
            Self::Cycle => "cycle",
            Self::Instret => "instret",
            Self::L1iHit => "l1ihit",
            Self::L1iMiss => "l1imiss",
            Self::L1iPrefetch => "l1ipftch",
            Self::L1dHit => "l1dhit",
            Self::L1dMiss => "l1dmiss",
            Self::L1dPrefetch => "l1dpftch",
            Self::L2Hit => "l2hit",
            Self::L2Miss => "l2miss",
            Self::L2Prefetch => "l2pftch",
            Self::Load => "ld",
            Self::RdCycle => "rdcycle",
            Self::Store => "st",
            Self::Time => "time",
            Self::Call => "call",
            Self::Ret => "ret",
            Self::Jal => "jal",
            Self::Jalr => "jalr",
            Self::CacheFlush => "cflush",
            Self::SrcDep => "srcdep",
        }
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alu => "ALU instructions",
            Self::Bru => "BRU instructions",
            Self::Cycle => "Cycles",
            Self::Instret => "Retired instructions",
            Self::L1iHit => "L1I hits",
            Self::L1iMiss => "L1I misses",
            Self::L1iPrefetch => "L1I prefetches",
            Self::L1dHit => "L1D hits",
            Self::L1dMiss => "L1D misses",
            Self::L1dPrefetch => "L1D prefetches",
            Self::L2Hit => "L2 hits",
            Self::L2Miss => "L2 misses",
            Self::L2Prefetch => "L2 prefetches",
            Self::Load => "Load instructions",
            Self::RdCycle => "Read cycle instructions",
            Self::Store => "Store instructions",
            Self::Time => "Time",
            Self::Call => "Function call instructions",
            Self::Ret => "Function ret instructions",
            Self::Jal => "JAL instructions",
            Self::Jalr => "JALR instructions",
            Self::CacheFlush => "Cache flush instructions",
            Self::SrcDep => "Source dependency wait cycles",
        }
    }

    /// Position in [`HpcCounter::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

const RULE: &str = "------------------------------";

/// Writes the counter block of every core to `out`.
///
/// # Errors
///
/// Propagates write errors from `out`.
pub fn display<D: Dut + ?Sized, W: Write>(
    bus: &SignalBus<'_, D>,
    family: &str,
    out: &mut W,
) -> io::Result<()> {
    for n in 0..bus.map().cores() {
        writeln!(out, "{RULE}")?;
        writeln!(out, "CORE: {family} {n}")?;
        writeln!(out, "{RULE}")?;
        for counter in HpcCounter::ALL {
            writeln!(out, "{}: {}", counter.label(), bus.hpc(n, counter))?;
        }
        writeln!(out, "{RULE}")?;
    }
    Ok(())
}
