//! gpusim Quickstart: drive a toy timing model through the harness.
//!
//! Demonstrates:
//!   1. Implementing a timing model (fixed cost per thread, with one option)
//!   2. Initializing a session from explicit arguments
//!   3. CUDA-style and OpenCL-style launches
//!   4. Reading per-grid reports and handoff statistics
//!   5. Shutting down the worker
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example quickstart

use std::collections::VecDeque;
use std::sync::Arc;

use gpusim_core::{
    Dim3, EngineError, EngineInit, GridDescriptor, GridId, KernelArg, KernelEntry, OptionError,
    OptionKind, OptionRegistry, SimCounters, TimingModel,
};
use gpusim_engine::{Session, SimConfig};
use tracing_subscriber::EnvFilter;

// ─── Model options ──────────────────────────────────────────────

const CPI: &str = "-toy_cycles_per_insn";
const INSN_PER_THREAD: u64 = 12;

// ─── Toy timing model ───────────────────────────────────────────

/// Every thread executes a fixed number of instructions; cycles are
/// instructions times a configurable CPI.
#[derive(Default)]
struct ToyModel {
    cpi: u64,
    queue: VecDeque<(GridId, Arc<KernelEntry>, u64)>,
    current_threads: u64,
    counters: SimCounters,
}

impl TimingModel for ToyModel {
    fn name(&self) -> &str {
        "toy"
    }

    fn reg_options(&self, options: &mut OptionRegistry) -> Result<(), OptionError> {
        options.register(CPI, OptionKind::UInt, "Cycles per instruction", "4")
    }

    fn init_gpu(&mut self, init: EngineInit<'_>) -> Result<(), EngineError> {
        self.cpi = init.options.get_uint(CPI)?;
        if self.cpi == 0 {
            return Err(EngineError::InitFailed {
                reason: format!("{CPI} must be positive"),
            });
        }
        Ok(())
    }

    fn launch(&mut self, grid: GridDescriptor) {
        self.queue
            .push_back((grid.id(), Arc::clone(grid.entry()), grid.total_threads()));
    }

    fn next_grid(&mut self) -> Option<(GridId, Arc<KernelEntry>)> {
        let (id, entry, threads) = self.queue.pop_front()?;
        self.current_threads = threads;
        Some((id, entry))
    }

    fn run_gpu_sim(&mut self) -> Result<(), EngineError> {
        let insn = self.current_threads * INSN_PER_THREAD;
        self.counters.tot_sim_insn += insn;
        self.counters.tot_sim_cycle += insn * self.cpi;
        Ok(())
    }

    fn counters(&self) -> SimCounters {
        self.counters
    }
}

// ─── Main ───────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== gpusim Quickstart ===\n");

    // 1. Initialize: no config file, one explicit option.
    let config = SimConfig::from_args([CPI, "2"]);
    let mut session = Session::initialize(config, ToyModel::default())?;

    // 2. CUDA-style launch: the caller builds the grid.
    let saxpy = KernelEntry::new("saxpy");
    let grid = GridDescriptor::new(saxpy, Dim3::from(64), Dim3::from(256), Vec::new());
    let report = session.launch_and_wait(grid)?;
    println!(
        "grid {} '{}': {} insn, {} cycles",
        report.grid,
        report.kernel,
        report.grid_counters.tot_sim_insn,
        report.grid_counters.tot_sim_cycle
    );

    // 3. OpenCL-style launch: entry, geometry, and arguments.
    let args = vec![
        KernelArg::new(&0x1000u64.to_le_bytes(), 0),
        KernelArg::new(&1024u32.to_le_bytes(), 8),
    ];
    let report = session.launch_opencl(
        KernelEntry::new("vector_add"),
        Dim3::new(8, 8, 1),
        Dim3::new(16, 16, 1),
        args,
    )?;
    println!(
        "grid {} '{}': {} insn, {} cycles",
        report.grid,
        report.kernel,
        report.grid_counters.tot_sim_insn,
        report.grid_counters.tot_sim_cycle
    );

    // 4. Session-wide view.
    println!(
        "\ntotals: {:?}, grids started={}, finished={}",
        session.counters(),
        session.stats().started(),
        session.stats().finished()
    );

    // 5. Shutdown.
    let shutdown = session.shutdown();
    println!(
        "shutdown in {} ms, worker joined: {}",
        shutdown.total_ms, shutdown.worker_joined
    );
    Ok(())
}
