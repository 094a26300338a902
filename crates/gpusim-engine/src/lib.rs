//! Launch-and-handoff harness for a GPU timing simulator.
//!
//! Provides [`Session`], which runs the one-time initialization sequence
//! for a [`TimingModel`](gpusim_core::TimingModel), moves the model onto a
//! dedicated worker thread, and hands grids to it through a start/finish
//! rendezvous. Each launch blocks until its grid has been simulated to
//! completion and the cumulative timing report has been printed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod launch;
pub mod report;
pub mod session;
pub mod stats;
mod worker;

pub use config::{SimConfig, TraceOpenPolicy, DEFAULT_CONFIG_FILE, DEFAULT_SEED};
pub use error::{InitError, LaunchError};
pub use launch::{opencl_functional_unimplemented, FUNCTIONAL_ONLY_UNIMPLEMENTED};
pub use report::{GridReport, SimClock, SimulationTime};
pub use session::{Session, ShutdownReport, WORKER_THREAD_NAME};
pub use stats::HandoffStats;
