//! User-facing [`Session`]: initialization sequence, launch gateway, and
//! shutdown.
//!
//! # Architecture
//!
//! ```text
//! Host thread                         Worker thread ("gpusim-worker")
//!     |                                   |
//!     | initialize()                      |
//!     |   banner, env, options, seed,     |
//!     |   trace file, init_gpu, clock ----> spawn, block on start_rx
//!     |                                   |
//!     |--launch_and_wait(grid)----------->| start_rx.recv()
//!     |   [start: bounded(1), grid]       | engine.launch(grid)
//!     |   blocks on finish_rx             | engine.next_grid()
//!     |                                   | engine.run_gpu_sim()
//!     |                                   | print timing report
//!     |<--GridReport via finish_tx--------|
//!     |   [finish: bounded(1)]            |
//!     |                                   |
//!     |--shutdown(): drop start_tx------->| recv() disconnected, exit
//!     |<--join: engine returned-----------|
//! ```
//!
//! # Single flight
//!
//! Launch methods take `&mut self`, so at most one grid is ever in
//! flight per session and a second launch cannot start before the
//! previous one's finish has been consumed. Sequential launches complete
//! in submission order.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use gpusim_core::{
    ArgList, Dim3, EngineInit, EnvConfig, GridDescriptor, InstTrace, KernelEntry, OptionRegistry,
    SimCounters, TimingModel,
};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::config::{
    register_harness_options, SimConfig, TraceOpenPolicy, INST_DEBUG_FILE, INST_DEBUG_TO_FILE,
};
use crate::error::{InitError, LaunchError};
use crate::launch::opencl_grid;
use crate::report::{GridReport, SimClock};
use crate::stats::HandoffStats;
use crate::worker::{GridOutcome, WorkerState};

/// Name given to the simulation worker thread.
pub const WORKER_THREAD_NAME: &str = "gpusim-worker";

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`Session::shutdown`].
#[derive(Debug)]
pub struct ShutdownReport {
    /// Total time spent in the shutdown sequence.
    pub total_ms: u64,
    /// Whether the worker thread was joined successfully.
    pub worker_joined: bool,
    /// Grids the worker finished over the session's lifetime.
    pub grids_finished: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Running,
    Stopped,
}

// ── Session ──────────────────────────────────────────────────────

/// An initialized simulation session: one timing model, one worker.
///
/// Created by [`Session::initialize`]; grids are handed over with
/// [`launch_and_wait`](Session::launch_and_wait) or
/// [`launch_opencl`](Session::launch_opencl). Dropping the session shuts
/// the worker down (waiting for an in-flight grid, if any).
pub struct Session<E: TimingModel + 'static> {
    start_tx: Option<Sender<GridDescriptor>>,
    finish_rx: Receiver<GridOutcome>,
    worker: Option<JoinHandle<E>>,
    worker_stopped: Arc<AtomicBool>,
    stats: Arc<HandoffStats>,
    clock: SimClock,
    options: OptionRegistry,
    env: EnvConfig,
    counters: SimCounters,
    state: SessionState,
    /// Recovered from the worker on shutdown.
    recovered_engine: Option<E>,
}

impl<E: TimingModel + 'static> Session<E> {
    /// Run the initialization sequence and start the worker.
    ///
    /// In order: banner, environment toggles, option registration and
    /// parsing, RNG seeding, instruction-trace file, configuration dump,
    /// `init_gpu`, simulation clock, rendezvous channels, worker spawn.
    pub fn initialize(config: SimConfig, mut engine: E) -> Result<Self, InitError> {
        print_banner();

        let env = match config.env.clone() {
            Some(env) => env,
            None => EnvConfig::from_env()?,
        };

        let mut options = OptionRegistry::new();
        register_harness_options(&mut options)?;
        engine.reg_options(&mut options)?;
        options.parse_args(config.command_line())?;

        let rng = ChaCha8Rng::seed_from_u64(config.seed);

        let inst_trace = open_inst_trace(&options, config.trace_open)?;

        print_options(&options);

        engine.init_gpu(EngineInit {
            options: &options,
            env: &env,
            rng,
            inst_trace,
        })?;

        let clock = SimClock::start();

        // Rendezvous pair: bounded(1) each, empty until the first launch.
        let (start_tx, start_rx) = crossbeam_channel::bounded(1);
        let (finish_tx, finish_rx) = crossbeam_channel::bounded(1);

        let stats = Arc::new(HandoffStats::new());
        let worker_stopped = Arc::new(AtomicBool::new(false));
        let model_name = engine.name().to_string();

        let state = WorkerState::new(
            engine,
            start_rx,
            finish_tx,
            clock,
            Arc::clone(&stats),
            Arc::clone(&worker_stopped),
        );
        let worker = thread::Builder::new()
            .name(WORKER_THREAD_NAME.into())
            .spawn(move || state.run())
            .map_err(InitError::ThreadSpawnFailed)?;

        info!(model = %model_name, seed = config.seed, "simulation session initialized");

        Ok(Self {
            start_tx: Some(start_tx),
            finish_rx,
            worker: Some(worker),
            worker_stopped,
            stats,
            clock,
            options,
            env,
            counters: SimCounters::default(),
            state: SessionState::Running,
            recovered_engine: None,
        })
    }

    /// Hand a ready-to-run grid to the worker and block until it has
    /// been fully simulated.
    ///
    /// The grid is registered with the timing model before the worker
    /// does anything else with it. Returns only after the worker has
    /// printed the timing report and raised finish for this grid.
    pub fn launch_and_wait(&mut self, grid: GridDescriptor) -> Result<GridReport, LaunchError> {
        let start_tx = self.start_tx.as_ref().ok_or(LaunchError::Shutdown)?;

        debug!(%grid, "handing grid to worker");
        start_tx
            .send(grid)
            .map_err(|_| LaunchError::WorkerDisconnected)?;

        // Blocks for the whole simulation of this grid.
        let outcome = self
            .finish_rx
            .recv()
            .map_err(|_| LaunchError::WorkerDisconnected)?;

        if let Ok(report) = &outcome {
            self.counters = report.counters;
        }
        outcome
    }

    /// Build a grid from an OpenCL-style launch and run it to completion.
    ///
    /// Same protocol as [`launch_and_wait`](Session::launch_and_wait).
    pub fn launch_opencl(
        &mut self,
        entry: Arc<KernelEntry>,
        grid_dim: Dim3,
        block_dim: Dim3,
        args: ArgList,
    ) -> Result<GridReport, LaunchError> {
        let grid = opencl_grid(entry, grid_dim, block_dim, args);
        self.launch_and_wait(grid)
    }

    /// Aggregate counters as of the last successfully finished grid.
    pub fn counters(&self) -> SimCounters {
        self.counters
    }

    /// Start/finish handoff statistics.
    pub fn stats(&self) -> &HandoffStats {
        &self.stats
    }

    /// Resolved options, as printed at initialization.
    pub fn options(&self) -> &OptionRegistry {
        &self.options
    }

    /// Environment toggles read at initialization.
    pub fn env(&self) -> &EnvConfig {
        &self.env
    }

    /// Wall-clock time since the simulation clock started.
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Whether the worker is still accepting grids.
    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running && !self.worker_stopped.load(Ordering::Acquire)
    }

    /// Stop the worker and recover the timing model.
    ///
    /// Drops the start sender, which the idle worker observes as a
    /// shutdown request. Idempotent.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.state == SessionState::Stopped {
            return ShutdownReport {
                total_ms: 0,
                worker_joined: true,
                grids_finished: self.stats.finished(),
            };
        }

        let start = Instant::now();
        self.state = SessionState::Stopped;
        self.start_tx.take();

        let worker_joined = match self.worker.take() {
            Some(handle) => match handle.join() {
                Ok(engine) => {
                    self.recovered_engine = Some(engine);
                    true
                }
                Err(_) => false,
            },
            None => true,
        };

        let report = ShutdownReport {
            total_ms: start.elapsed().as_millis() as u64,
            worker_joined,
            grids_finished: self.stats.finished(),
        };
        info!(
            grids = report.grids_finished,
            joined = report.worker_joined,
            "simulation session shut down"
        );
        report
    }

    /// Shut down (if still running) and take back the timing model.
    ///
    /// Returns `None` if the worker panicked.
    pub fn into_engine(mut self) -> Option<E> {
        self.shutdown();
        self.recovered_engine.take()
    }
}

impl<E: TimingModel + 'static> Drop for Session<E> {
    fn drop(&mut self) {
        if self.state != SessionState::Stopped {
            self.shutdown();
        }
    }
}

impl<E: TimingModel + 'static> std::fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("counters", &self.counters)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

// ── Initialization helpers ───────────────────────────────────────

fn print_banner() {
    let mut out = io::stdout().lock();
    let _ = write!(
        out,
        "\n\n        *** GPGPU-Sim Simulator Version {} [gpusim launch harness] ***\n\n\n",
        env!("CARGO_PKG_VERSION")
    );
    let _ = out.flush();
}

fn print_options(options: &OptionRegistry) {
    let mut out = io::stdout().lock();
    let _ = write!(out, "GPGPU-Sim: Configuration options:\n\n{options}");
    let _ = out.flush();
}

/// Open the instruction trace if `-ptx_inst_debug_to_file` is set.
fn open_inst_trace(
    options: &OptionRegistry,
    policy: TraceOpenPolicy,
) -> Result<Option<InstTrace>, InitError> {
    if !options.get_bool(INST_DEBUG_TO_FILE)? {
        return Ok(None);
    }
    let path = PathBuf::from(options.get_str(INST_DEBUG_FILE)?);
    match InstTrace::create(&path) {
        Ok(trace) => {
            debug!(path = %path.display(), "instruction trace opened");
            Ok(Some(trace))
        }
        Err(source) => match policy {
            TraceOpenPolicy::Strict => Err(InitError::TraceOpen { path, source }),
            TraceOpenPolicy::BestEffort => {
                warn!(
                    path = %path.display(),
                    error = %source,
                    "instruction trace unavailable, continuing without it"
                );
                Ok(None)
            }
        },
    }
}
