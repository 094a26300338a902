//! Scripted timing model for harness testing.
//!
//! [`ScriptedModel`] advances its counters by a fixed amount per grid
//! and can be told to fail, panic, stall, or lose grids for specific
//! kernels. Every call the harness makes is appended to a shared
//! [`EventLog`] that stays readable after the model has moved onto the
//! worker thread.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gpusim_core::{
    Dim3, EngineError, EngineInit, GridDescriptor, GridId, InstTrace, KernelEntry, OptionError,
    OptionKind, OptionRegistry, SimCounters, TimingModel,
};
use rand_chacha::rand_core::RngCore;

use crate::{EventLog, ModelEvent};

/// Option registered by [`ScriptedModel`] in `reg_options`.
pub const SCRIPTED_N_CORES: &str = "-scripted_n_cores";

/// What the model saw for each `launch` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchRecord {
    pub grid: GridId,
    pub kernel: String,
    pub grid_dim: Dim3,
    pub block_dim: Dim3,
    pub args: usize,
}

/// A [`TimingModel`] whose behavior is fixed up front.
pub struct ScriptedModel {
    insn_per_grid: u64,
    cycles_per_grid: u64,
    delay: Option<Duration>,
    fail_kernels: Vec<String>,
    panic_kernels: Vec<String>,
    fail_init: Option<String>,
    drop_launches: bool,

    queue: VecDeque<(GridId, Arc<KernelEntry>)>,
    current: Option<(GridId, Arc<KernelEntry>)>,
    counters: SimCounters,
    grids_completed: u64,
    launched: Vec<LaunchRecord>,
    events: EventLog,

    initialized: bool,
    n_cores: u64,
    debug_level: u32,
    rng_sample: Option<u64>,
    inst_trace: Option<InstTrace>,
}

impl ScriptedModel {
    /// Each simulated grid adds `insn_per_grid` instructions and
    /// `cycles_per_grid` cycles to the aggregate counters.
    pub fn new(insn_per_grid: u64, cycles_per_grid: u64) -> Self {
        Self {
            insn_per_grid,
            cycles_per_grid,
            delay: None,
            fail_kernels: Vec::new(),
            panic_kernels: Vec::new(),
            fail_init: None,
            drop_launches: false,
            queue: VecDeque::new(),
            current: None,
            counters: SimCounters::default(),
            grids_completed: 0,
            launched: Vec::new(),
            events: EventLog::new(),
            initialized: false,
            n_cores: 0,
            debug_level: 0,
            rng_sample: None,
            inst_trace: None,
        }
    }

    /// Sleep for `delay` inside every `run_gpu_sim`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// `run_gpu_sim` returns an error for grids of this kernel.
    pub fn fail_kernel(mut self, name: impl Into<String>) -> Self {
        self.fail_kernels.push(name.into());
        self
    }

    /// `run_gpu_sim` panics for grids of this kernel.
    pub fn panic_kernel(mut self, name: impl Into<String>) -> Self {
        self.panic_kernels.push(name.into());
        self
    }

    /// `init_gpu` fails with the given reason.
    pub fn fail_init(mut self, reason: impl Into<String>) -> Self {
        self.fail_init = Some(reason.into());
        self
    }

    /// `launch` accepts grids but never queues them.
    pub fn drop_launches(mut self) -> Self {
        self.drop_launches = true;
        self
    }

    /// Shared handle to the call log.
    pub fn events(&self) -> EventLog {
        self.events.clone()
    }

    /// Grids simulated successfully.
    pub fn grids_completed(&self) -> u64 {
        self.grids_completed
    }

    /// Every grid passed to `launch`, in call order.
    pub fn launched(&self) -> &[LaunchRecord] {
        &self.launched
    }

    /// Whether `init_gpu` has run.
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Value of [`SCRIPTED_N_CORES`] seen at `init_gpu`.
    pub fn n_cores(&self) -> u64 {
        self.n_cores
    }

    /// `PTX_SIM_DEBUG` level seen at `init_gpu`.
    pub fn debug_level(&self) -> u32 {
        self.debug_level
    }

    /// First value drawn from the RNG handed over at `init_gpu`.
    pub fn rng_sample(&self) -> Option<u64> {
        self.rng_sample
    }

    /// Whether an instruction trace was handed over at `init_gpu`.
    pub fn has_inst_trace(&self) -> bool {
        self.inst_trace.is_some()
    }
}

impl TimingModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn reg_options(&self, options: &mut OptionRegistry) -> Result<(), OptionError> {
        options.register(
            SCRIPTED_N_CORES,
            OptionKind::UInt,
            "Number of simulated shader cores",
            "1",
        )
    }

    fn init_gpu(&mut self, mut init: EngineInit<'_>) -> Result<(), EngineError> {
        if let Some(reason) = &self.fail_init {
            return Err(EngineError::InitFailed {
                reason: reason.clone(),
            });
        }
        self.n_cores = init.options.get_uint(SCRIPTED_N_CORES)?;
        self.debug_level = init.env.debug_level;
        self.rng_sample = Some(init.rng.next_u64());
        self.inst_trace = init.inst_trace;
        self.initialized = true;
        Ok(())
    }

    fn launch(&mut self, grid: GridDescriptor) {
        self.events.push(ModelEvent::Launched(grid.id()));
        self.launched.push(LaunchRecord {
            grid: grid.id(),
            kernel: grid.entry().name().to_string(),
            grid_dim: grid.grid_dim(),
            block_dim: grid.block_dim(),
            args: grid.args().len(),
        });
        if !self.drop_launches {
            self.queue.push_back((grid.id(), Arc::clone(grid.entry())));
        }
    }

    fn next_grid(&mut self) -> Option<(GridId, Arc<KernelEntry>)> {
        let next = self.queue.pop_front()?;
        self.events.push(ModelEvent::Dequeued(next.0));
        self.current = Some(next.clone());
        Some(next)
    }

    fn run_gpu_sim(&mut self) -> Result<(), EngineError> {
        let Some((grid, entry)) = self.current.take() else {
            return Err(EngineError::NoActiveGrid);
        };
        let kernel = entry.name().to_string();
        self.events.push(ModelEvent::Started {
            grid,
            kernel: kernel.clone(),
            thread: thread::current().name().map(str::to_string),
        });

        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        if self.panic_kernels.contains(&kernel) {
            panic!("scripted panic in kernel {kernel}");
        }
        if self.fail_kernels.contains(&kernel) {
            self.events.push(ModelEvent::Failed(grid));
            return Err(EngineError::SimulationFailed {
                grid,
                reason: format!("scripted failure in kernel {kernel}"),
            });
        }

        if let Some(trace) = self.inst_trace.as_mut() {
            writeln!(trace, "grid {grid} {kernel}")
                .and_then(|()| trace.flush())
                .map_err(|e| EngineError::SimulationFailed {
                    grid,
                    reason: format!("instruction trace: {e}"),
                })?;
        }

        self.counters = SimCounters::new(
            self.counters.tot_sim_insn + self.insn_per_grid,
            self.counters.tot_sim_cycle + self.cycles_per_grid,
        );
        self.grids_completed += 1;
        self.events.push(ModelEvent::Finished(grid));
        Ok(())
    }

    fn counters(&self) -> SimCounters {
        self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(name: &str) -> GridDescriptor {
        GridDescriptor::new(KernelEntry::new(name), Dim3::from(1), Dim3::from(1), vec![])
    }

    #[test]
    fn counters_advance_per_grid() {
        let mut m = ScriptedModel::new(3, 7);
        for name in ["a", "b"] {
            m.launch(grid(name));
            assert!(m.next_grid().is_some());
            m.run_gpu_sim().unwrap();
        }
        assert_eq!(m.counters(), SimCounters::new(6, 14));
        assert_eq!(m.grids_completed(), 2);
    }

    #[test]
    fn dropped_launch_leaves_queue_empty() {
        let mut m = ScriptedModel::new(1, 1).drop_launches();
        m.launch(grid("a"));
        assert!(m.next_grid().is_none());
        assert_eq!(m.launched().len(), 1);
    }

    #[test]
    fn failing_kernel_leaves_counters_alone() {
        let mut m = ScriptedModel::new(1, 1).fail_kernel("bad");
        m.launch(grid("bad"));
        m.next_grid();
        assert!(m.run_gpu_sim().is_err());
        assert_eq!(m.counters(), SimCounters::default());
    }

    #[test]
    fn run_without_dequeue_is_an_error() {
        let mut m = ScriptedModel::new(1, 1);
        assert!(matches!(m.run_gpu_sim(), Err(EngineError::NoActiveGrid)));

        // A grid that already ran is not simulated twice.
        m.launch(grid("once"));
        m.next_grid();
        m.run_gpu_sim().unwrap();
        assert!(matches!(m.run_gpu_sim(), Err(EngineError::NoActiveGrid)));
        assert_eq!(m.grids_completed(), 1);
    }
}
