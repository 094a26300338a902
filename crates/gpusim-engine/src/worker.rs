//! Worker loop: waits for a grid, simulates it to completion, reports.
//!
//! The worker thread owns the timing model exclusively (moved in via
//! `thread::spawn`). No locks: grids arrive through the bounded start
//! channel and outcomes go back through the bounded finish channel.
//!
//! ```text
//!   Idle ──(grid on start channel)──> Running
//!    ^                                  │ launch → next_grid → run_gpu_sim
//!    │                                  │ print timing report
//!    └──────(outcome on finish channel)─┘
//! ```
//!
//! A disconnected start channel is the shutdown request. A grid that is
//! already Running is never interrupted.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use gpusim_core::{GridDescriptor, TimingModel};
use tracing::{debug, info, warn};

use crate::error::LaunchError;
use crate::report::{GridReport, SimClock, SimulationTime};
use crate::stats::HandoffStats;

/// What the worker sends back on the finish channel.
pub(crate) type GridOutcome = Result<GridReport, LaunchError>;

/// State held by the worker thread's main loop.
pub(crate) struct WorkerState<E> {
    engine: E,
    start_rx: Receiver<GridDescriptor>,
    finish_tx: Sender<GridOutcome>,
    clock: SimClock,
    stats: Arc<HandoffStats>,
    worker_stopped: Arc<AtomicBool>,
}

impl<E: TimingModel> WorkerState<E> {
    /// Create the worker state.
    pub fn new(
        engine: E,
        start_rx: Receiver<GridDescriptor>,
        finish_tx: Sender<GridOutcome>,
        clock: SimClock,
        stats: Arc<HandoffStats>,
        worker_stopped: Arc<AtomicBool>,
    ) -> Self {
        Self {
            engine,
            start_rx,
            finish_tx,
            clock,
            stats,
            worker_stopped,
        }
    }

    /// Main loop. Runs until the start channel disconnects.
    ///
    /// Consumes self and returns the timing model so that the session
    /// can recover it via `JoinHandle<E>`.
    ///
    /// If the model panics, the unwinding `StopGuard` still closes the
    /// in-flight grid as failed and raises the stop flag before the
    /// finish sender is dropped.
    pub fn run(mut self) -> E {
        let mut guard = StopGuard {
            stopped: Arc::clone(&self.worker_stopped),
            stats: Arc::clone(&self.stats),
            in_grid: false,
        };
        while let Ok(grid) = self.start_rx.recv() {
            self.stats.record_start();
            guard.in_grid = true;
            let outcome = self.run_grid(grid);
            if let Err(e) = &outcome {
                warn!(error = %e, "grid did not complete");
            }
            self.stats.record_finish(outcome.is_ok());
            guard.in_grid = false;
            if self.finish_tx.send(outcome).is_err() {
                // Host side is gone; nobody is left to launch.
                break;
            }
        }

        drop(guard);
        debug!(
            model = self.engine.name(),
            grids = self.stats.finished(),
            "simulation worker stopped"
        );
        self.engine
    }

    /// Register, dequeue, and simulate one grid.
    fn run_grid(&mut self, grid: GridDescriptor) -> GridOutcome {
        let launched = grid.id();
        let before = self.engine.counters();
        debug!(%grid, "registering grid with timing model");
        self.engine.launch(grid);

        let (dequeued, entry) = self
            .engine
            .next_grid()
            .ok_or(LaunchError::NoGridQueued { grid: launched })?;
        if dequeued != launched {
            return Err(LaunchError::GridMismatch { launched, dequeued });
        }

        self.engine.run_gpu_sim()?;

        let counters = self.engine.counters();
        let timing = SimulationTime::since(&self.clock, counters);
        print_simulation_time(&timing);
        info!(
            grid = %launched,
            kernel = entry.name(),
            tot_sim_insn = counters.tot_sim_insn,
            tot_sim_cycle = counters.tot_sim_cycle,
            "grid simulation complete"
        );

        Ok(GridReport {
            grid: launched,
            kernel: entry.name().to_string(),
            counters,
            grid_counters: counters.since(&before),
            timing,
        })
    }
}

/// Raises the stop flag when the worker loop ends, normally or by panic.
struct StopGuard {
    stopped: Arc<AtomicBool>,
    stats: Arc<HandoffStats>,
    in_grid: bool,
}

impl Drop for StopGuard {
    fn drop(&mut self) {
        if self.in_grid {
            self.stats.record_finish(false);
        }
        self.stopped.store(true, Ordering::Release);
    }
}

fn print_simulation_time(timing: &SimulationTime) {
    // Best-effort: a closed stdout must not take the worker down.
    let _ = io::stderr().flush();
    let mut out = io::stdout().lock();
    let _ = write!(out, "{timing}");
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpusim_core::{Dim3, KernelEntry};
    use gpusim_test_utils::ScriptedModel;

    fn spawn(
        model: ScriptedModel,
    ) -> (
        Sender<GridDescriptor>,
        Receiver<GridOutcome>,
        Arc<HandoffStats>,
        Arc<AtomicBool>,
        std::thread::JoinHandle<ScriptedModel>,
    ) {
        let (start_tx, start_rx) = crossbeam_channel::bounded(1);
        let (finish_tx, finish_rx) = crossbeam_channel::bounded(1);
        let stats = Arc::new(HandoffStats::new());
        let stopped = Arc::new(AtomicBool::new(false));
        let state = WorkerState::new(
            model,
            start_rx,
            finish_tx,
            SimClock::start(),
            Arc::clone(&stats),
            Arc::clone(&stopped),
        );
        let handle = std::thread::spawn(move || state.run());
        (start_tx, finish_rx, stats, stopped, handle)
    }

    fn grid(name: &str) -> GridDescriptor {
        GridDescriptor::new(KernelEntry::new(name), Dim3::from(2), Dim3::from(32), vec![])
    }

    #[test]
    fn runs_grid_and_reports() {
        let (start_tx, finish_rx, stats, _stopped, handle) =
            spawn(ScriptedModel::new(1000, 2000));
        let g = grid("k");
        let id = g.id();
        start_tx.send(g).unwrap();
        let report = finish_rx.recv().unwrap().unwrap();
        assert_eq!(report.grid, id);
        assert_eq!(report.kernel, "k");
        assert_eq!(report.grid_counters.tot_sim_insn, 1000);
        assert_eq!(report.grid_counters.tot_sim_cycle, 2000);
        assert_eq!(stats.started(), 1);
        assert_eq!(stats.finished(), 1);

        drop(start_tx);
        let model = handle.join().unwrap();
        assert_eq!(model.grids_completed(), 1);
    }

    #[test]
    fn disconnect_stops_worker_and_returns_model() {
        let (start_tx, _finish_rx, _stats, stopped, handle) =
            spawn(ScriptedModel::new(1, 1));
        drop(start_tx);
        let model = handle.join().unwrap();
        assert!(stopped.load(Ordering::Acquire));
        assert_eq!(model.grids_completed(), 0);
    }

    #[test]
    fn model_failure_becomes_outcome_error() {
        let model = ScriptedModel::new(10, 10).fail_kernel("bad");
        let (start_tx, finish_rx, stats, _stopped, _handle) = spawn(model);
        start_tx.send(grid("bad")).unwrap();
        let outcome = finish_rx.recv().unwrap();
        assert!(matches!(outcome, Err(LaunchError::Engine(_))));
        assert_eq!(stats.failed(), 1);

        // The worker is back in Idle and accepts the next grid.
        start_tx.send(grid("good")).unwrap();
        assert!(finish_rx.recv().unwrap().is_ok());
    }

    #[test]
    fn model_panic_closes_grid_and_stops_worker() {
        let model = ScriptedModel::new(1, 1).panic_kernel("boom");
        let (start_tx, finish_rx, stats, stopped, handle) = spawn(model);
        start_tx.send(grid("boom")).unwrap();

        // The finish sender is dropped by the unwinding worker.
        assert!(finish_rx.recv().is_err());
        assert!(stopped.load(Ordering::Acquire));
        assert_eq!(stats.started(), 1);
        assert_eq!(stats.finished(), 1);
        assert_eq!(stats.failed(), 1);
        assert!(!stats.in_flight());
        assert!(handle.join().is_err());
    }

    #[test]
    fn dropped_grid_reports_nothing_queued() {
        let model = ScriptedModel::new(10, 10).drop_launches();
        let (start_tx, finish_rx, _stats, _stopped, _handle) = spawn(model);
        let g = grid("lost");
        let id = g.id();
        start_tx.send(g).unwrap();
        match finish_rx.recv().unwrap() {
            Err(LaunchError::NoGridQueued { grid }) => assert_eq!(grid, id),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
