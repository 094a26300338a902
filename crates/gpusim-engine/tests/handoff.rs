//! Start/finish rendezvous between the host and the simulation worker.
//!
//! Grids launched one at a time must run in submission order, never
//! overlap, and each launch must return only after its own grid has
//! been simulated.

use std::thread;
use std::time::{Duration, Instant};

use gpusim_core::{Dim3, GridDescriptor, KernelEntry, SimCounters};
use gpusim_engine::{LaunchError, Session, SimConfig, WORKER_THREAD_NAME};
use gpusim_test_utils::{ModelEvent, ScriptedModel};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn session(model: ScriptedModel) -> Session<ScriptedModel> {
    init_logging();
    Session::initialize(SimConfig::from_args(Vec::<String>::new()), model).unwrap()
}

fn grid(name: &str) -> GridDescriptor {
    GridDescriptor::new(KernelEntry::new(name), Dim3::new(4, 2, 1), Dim3::from(128), vec![])
}

#[test]
fn grids_run_in_submission_order() {
    let model = ScriptedModel::new(10, 20);
    let events = model.events();
    let mut s = session(model);

    let names = ["k0", "k1", "k2", "k3", "k4"];
    for name in names {
        let g = grid(name);
        let id = g.id();
        let report = s.launch_and_wait(g).unwrap();
        assert_eq!(report.grid, id);
        assert_eq!(report.kernel, name);
        // Finish for this grid has been raised; nothing is in flight.
        assert_eq!(s.stats().started(), s.stats().finished());
    }

    assert_eq!(events.started_kernels(), names);
    assert!(events.is_serialized());
    assert_eq!(s.counters(), SimCounters::new(50, 100));
}

#[test]
fn each_grid_is_registered_before_it_is_dequeued() {
    let model = ScriptedModel::new(1, 1);
    let events = model.events();
    let mut s = session(model);
    let g = grid("only");
    let id = g.id();
    s.launch_and_wait(g).unwrap();

    let log = events.snapshot();
    assert_eq!(log[0], ModelEvent::Launched(id));
    assert_eq!(log[1], ModelEvent::Dequeued(id));
    assert!(matches!(log[2], ModelEvent::Started { grid, .. } if grid == id));
    assert_eq!(log[3], ModelEvent::Finished(id));
}

#[test]
fn simulation_runs_on_the_worker_thread() {
    let model = ScriptedModel::new(1, 1);
    let events = model.events();
    let mut s = session(model);
    s.launch_and_wait(grid("k")).unwrap();

    let threads: Vec<_> = events
        .snapshot()
        .into_iter()
        .filter_map(|e| match e {
            ModelEvent::Started { thread, .. } => thread,
            _ => None,
        })
        .collect();
    assert_eq!(threads, vec![WORKER_THREAD_NAME.to_string()]);
}

#[test]
fn launch_blocks_until_grid_finishes() {
    let delay = Duration::from_millis(50);
    let model = ScriptedModel::new(1, 1).with_delay(delay);
    let events = model.events();
    let mut s = session(model);

    let t0 = Instant::now();
    let g = grid("slow");
    let id = g.id();
    s.launch_and_wait(g).unwrap();
    assert!(t0.elapsed() >= delay);
    assert_eq!(events.snapshot().last(), Some(&ModelEvent::Finished(id)));
}

#[test]
fn per_grid_counters_are_deltas() {
    let mut s = session(ScriptedModel::new(7, 3));
    let first = s.launch_and_wait(grid("a")).unwrap();
    let second = s.launch_and_wait(grid("b")).unwrap();
    assert_eq!(first.grid_counters, SimCounters::new(7, 3));
    assert_eq!(second.grid_counters, SimCounters::new(7, 3));
    assert_eq!(second.counters, SimCounters::new(14, 6));
}

#[test]
fn failed_grid_does_not_stall_the_session() {
    let model = ScriptedModel::new(5, 5).fail_kernel("bad");
    let events = model.events();
    let mut s = session(model);

    s.launch_and_wait(grid("good")).unwrap();
    let err = s.launch_and_wait(grid("bad")).unwrap_err();
    assert!(matches!(err, LaunchError::Engine(_)));
    assert_eq!(err.status_code(), 5);
    s.launch_and_wait(grid("good")).unwrap();

    assert_eq!(s.stats().finished(), 3);
    assert_eq!(s.stats().failed(), 1);
    assert_eq!(s.counters(), SimCounters::new(10, 10));
    assert!(events.is_serialized());
}

#[test]
fn lost_grid_is_reported() {
    let mut s = session(ScriptedModel::new(1, 1).drop_launches());
    let g = grid("lost");
    let id = g.id();
    match s.launch_and_wait(g) {
        Err(LaunchError::NoGridQueued { grid }) => assert_eq!(grid, id),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn shutdown_recovers_model_and_rejects_launches() {
    let mut s = session(ScriptedModel::new(2, 4));
    s.launch_and_wait(grid("a")).unwrap();
    let report = s.shutdown();
    assert!(report.worker_joined);
    assert_eq!(report.grids_finished, 1);
    assert!(matches!(
        s.launch_and_wait(grid("late")),
        Err(LaunchError::Shutdown)
    ));

    let model = s.into_engine().unwrap();
    assert!(model.initialized());
    assert_eq!(model.grids_completed(), 1);
}

#[test]
fn idle_session_drops_cleanly() {
    let s = session(ScriptedModel::new(1, 1));
    assert!(s.is_running());
    drop(s);
}

#[test]
fn sessions_are_independent() {
    let handles: Vec<_> = (0..3u64)
        .map(|i| {
            thread::spawn(move || {
                let mut s = session(ScriptedModel::new(i + 1, 1));
                for _ in 0..4 {
                    s.launch_and_wait(grid("k")).unwrap();
                }
                s.counters()
            })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        let counters = h.join().unwrap();
        assert_eq!(counters, SimCounters::new(4 * (i as u64 + 1), 4));
    }
}
