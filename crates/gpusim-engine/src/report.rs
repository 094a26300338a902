//! Simulation clock and the per-grid timing report.
//!
//! Elapsed time is always measured from the single start instant
//! captured at initialization, so the printed rates are cumulative
//! averages over the whole run rather than per-grid rates.

use std::fmt;
use std::time::{Duration, Instant};

use gpusim_core::{GridId, SimCounters};

const SECS_PER_MIN: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MIN;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Wall-clock origin of a simulation session.
#[derive(Clone, Copy, Debug)]
pub struct SimClock {
    start: Instant,
}

impl SimClock {
    /// Start the clock now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time elapsed since the clock was started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Elapsed-time breakdown and simulation rates.
///
/// Pure function of the elapsed seconds and the aggregate counters.
/// The divisor is floored at one second, so a run that finishes within
/// the first second reports its raw counts as per-second rates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationTime {
    /// Whole days elapsed.
    pub days: u64,
    /// Hours past the last whole day.
    pub hours: u64,
    /// Minutes past the last whole hour.
    pub minutes: u64,
    /// Seconds past the last whole minute.
    pub seconds: u64,
    /// Total elapsed seconds (at least 1).
    pub total_secs: u64,
    /// Instructions simulated per wall-clock second.
    pub insn_rate: u64,
    /// Cycles simulated per wall-clock second.
    pub cycle_rate: u64,
}

impl SimulationTime {
    /// Compute the report for `elapsed_secs` of wall-clock time.
    pub fn new(elapsed_secs: u64, counters: SimCounters) -> Self {
        let total = elapsed_secs.max(1);
        let days = total / SECS_PER_DAY;
        let hours = total / SECS_PER_HOUR - 24 * days;
        let minutes = total / SECS_PER_MIN - 60 * (hours + 24 * days);
        let seconds = total - 60 * (minutes + 60 * (hours + 24 * days));
        Self {
            days,
            hours,
            minutes,
            seconds,
            total_secs: total,
            insn_rate: counters.tot_sim_insn / total,
            cycle_rate: counters.tot_sim_cycle / total,
        }
    }

    /// Compute the report from a clock reading.
    pub fn since(clock: &SimClock, counters: SimCounters) -> Self {
        Self::new(clock.elapsed().as_secs(), counters)
    }
}

impl fmt::Display for SimulationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\n\ngpgpu_simulation_time = {} days, {} hrs, {} min, {} sec ({} sec)\n",
            self.days, self.hours, self.minutes, self.seconds, self.total_secs
        )?;
        writeln!(f, "gpgpu_simulation_rate = {} (inst/sec)", self.insn_rate)?;
        writeln!(f, "gpgpu_simulation_rate = {} (cycle/sec)", self.cycle_rate)
    }
}

/// Outcome of one fully simulated grid, returned by the launch gateway.
#[derive(Clone, Debug)]
pub struct GridReport {
    /// The grid that ran.
    pub grid: GridId,
    /// Kernel entry name.
    pub kernel: String,
    /// Aggregate counters after the grid finished.
    pub counters: SimCounters,
    /// Counter progress made by this grid alone.
    pub grid_counters: SimCounters,
    /// Timing report printed for this grid.
    pub timing: SimulationTime,
}
