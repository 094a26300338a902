//! Errors from session initialization and grid launches.

use std::io;
use std::path::PathBuf;

use gpusim_core::{EngineError, EnvError, GridId, OptionError};
use thiserror::Error;

/// Errors detected during [`Session::initialize`](crate::session::Session::initialize).
#[derive(Debug, Error)]
pub enum InitError {
    /// An environment toggle held a malformed value.
    #[error("environment: {0}")]
    Env(#[from] EnvError),
    /// Option registration or parsing failed.
    #[error("options: {0}")]
    Options(#[from] OptionError),
    /// The instruction-trace file could not be created.
    #[error("cannot open instruction trace {}: {source}", .path.display())]
    TraceOpen {
        /// The trace file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The timing model rejected initialization.
    #[error("timing model: {0}")]
    Engine(#[from] EngineError),
    /// The worker thread could not be spawned.
    #[error("worker thread spawn failed: {0}")]
    ThreadSpawnFailed(#[source] io::Error),
}

/// Errors returned by the launch gateway.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The session has been shut down.
    #[error("simulation session has shut down")]
    Shutdown,
    /// The worker thread exited while the grid was in flight
    /// (typically a panic inside the timing model).
    #[error("simulation worker disconnected")]
    WorkerDisconnected,
    /// The model had nothing queued after the grid was handed over.
    #[error("timing model has no queued grid after launching grid {grid}")]
    NoGridQueued {
        /// The grid that was launched.
        grid: GridId,
    },
    /// The model dequeued a different grid than the one launched.
    #[error("timing model dequeued grid {dequeued}, expected {launched}")]
    GridMismatch {
        /// The grid that was launched.
        launched: GridId,
        /// The grid the model returned from `next_grid`.
        dequeued: GridId,
    },
    /// The timing model failed while simulating.
    #[error("timing model: {0}")]
    Engine(#[from] EngineError),
}

impl LaunchError {
    /// Integer status for C-style callers; success is `0`.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::Shutdown => 1,
            Self::WorkerDisconnected => 2,
            Self::NoGridQueued { .. } => 3,
            Self::GridMismatch { .. } => 4,
            Self::Engine(_) => 5,
        }
    }
}
