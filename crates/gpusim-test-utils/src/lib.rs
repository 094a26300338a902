//! Test utilities for gpusim development.
//!
//! Provides [`ScriptedModel`], a deterministic [`TimingModel`](gpusim_core::TimingModel)
//! for driving the harness, and the [`EventLog`] it records into.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::{Arc, Mutex, MutexGuard};

use gpusim_core::GridId;

pub mod fixtures;

pub use fixtures::{LaunchRecord, ScriptedModel, SCRIPTED_N_CORES};

/// One call observed by a [`ScriptedModel`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelEvent {
    Launched(GridId),
    Dequeued(GridId),
    Started {
        grid: GridId,
        kernel: String,
        /// Name of the thread `run_gpu_sim` ran on.
        thread: Option<String>,
    },
    Finished(GridId),
    Failed(GridId),
}

/// Append-only event log shared between a model and the test.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    inner: Arc<Mutex<Vec<ModelEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: ModelEvent) {
        self.lock().push(event);
    }

    /// Copy of every event recorded so far.
    pub fn snapshot(&self) -> Vec<ModelEvent> {
        self.lock().clone()
    }

    /// Kernel names in the order `run_gpu_sim` started them.
    pub fn started_kernels(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ModelEvent::Started { kernel, .. } => Some(kernel.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether every `Started` is followed by its own `Finished` or
    /// `Failed` before the next `Started`.
    pub fn is_serialized(&self) -> bool {
        let mut open: Option<GridId> = None;
        for event in self.lock().iter() {
            match event {
                ModelEvent::Started { grid, .. } => {
                    if open.is_some() {
                        return false;
                    }
                    open = Some(*grid);
                }
                ModelEvent::Finished(grid) | ModelEvent::Failed(grid) => {
                    if open != Some(*grid) {
                        return false;
                    }
                    open = None;
                }
                _ => {}
            }
        }
        open.is_none()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ModelEvent>> {
        // A panicking model poisons the lock; the log is still valid.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
