//! Aggregate performance counters maintained by a timing model.

/// Cumulative instruction and cycle counts across every grid simulated
/// so far (`gpu_tot_sim_insn`, `gpu_tot_sim_cycle`).
///
/// Owned and advanced by the timing model during `run_gpu_sim`; the
/// harness only takes copies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SimCounters {
    /// Total instructions simulated.
    pub tot_sim_insn: u64,
    /// Total cycles simulated.
    pub tot_sim_cycle: u64,
}

impl SimCounters {
    /// Create a counter snapshot.
    pub const fn new(tot_sim_insn: u64, tot_sim_cycle: u64) -> Self {
        Self {
            tot_sim_insn,
            tot_sim_cycle,
        }
    }

    /// Progress made since an `earlier` snapshot.
    ///
    /// Saturates at zero if the counters went backwards, which a
    /// well-behaved model never does.
    pub fn since(&self, earlier: &SimCounters) -> SimCounters {
        SimCounters {
            tot_sim_insn: self.tot_sim_insn.saturating_sub(earlier.tot_sim_insn),
            tot_sim_cycle: self.tot_sim_cycle.saturating_sub(earlier.tot_sim_cycle),
        }
    }
}
