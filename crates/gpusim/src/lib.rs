//! gpusim: launch-and-handoff harness for a GPU timing simulator.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the gpusim sub-crates. For most users, adding `gpusim` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::collections::VecDeque;
//! use std::sync::Arc;
//!
//! use gpusim::prelude::*;
//!
//! // A timing model that charges 100 instructions and 250 cycles per grid.
//! #[derive(Default)]
//! struct Flat {
//!     queue: VecDeque<(GridId, Arc<KernelEntry>)>,
//!     counters: SimCounters,
//! }
//!
//! impl TimingModel for Flat {
//!     fn name(&self) -> &str { "flat" }
//!     fn reg_options(&self, _: &mut OptionRegistry) -> Result<(), OptionError> { Ok(()) }
//!     fn init_gpu(&mut self, _: EngineInit<'_>) -> Result<(), EngineError> { Ok(()) }
//!     fn launch(&mut self, grid: GridDescriptor) {
//!         self.queue.push_back((grid.id(), Arc::clone(grid.entry())));
//!     }
//!     fn next_grid(&mut self) -> Option<(GridId, Arc<KernelEntry>)> {
//!         self.queue.pop_front()
//!     }
//!     fn run_gpu_sim(&mut self) -> Result<(), EngineError> {
//!         self.counters.tot_sim_insn += 100;
//!         self.counters.tot_sim_cycle += 250;
//!         Ok(())
//!     }
//!     fn counters(&self) -> SimCounters { self.counters }
//! }
//!
//! let config = SimConfig::from_args(Vec::<String>::new());
//! let mut session = Session::initialize(config, Flat::default()).unwrap();
//!
//! let grid = GridDescriptor::new(KernelEntry::new("saxpy"), Dim3::from(8), Dim3::from(128), vec![]);
//! let report = session.launch_and_wait(grid).unwrap();
//! assert_eq!(report.kernel, "saxpy");
//! assert_eq!(session.counters(), SimCounters::new(100, 250));
//!
//! let shutdown = session.shutdown();
//! assert!(shutdown.worker_joined);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `gpusim-core` | Grids, counters, options, environment, `TimingModel` |
//! | [`engine`] | `gpusim-engine` | Session, launch gateway, timing report |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`gpusim-core`).
///
/// Contains grid descriptors, the option registry, environment toggles,
/// error types, and the [`types::TimingModel`] trait.
pub use gpusim_core as types;

/// Session, worker, and launch gateway (`gpusim-engine`).
///
/// [`engine::Session`] runs initialization and owns the simulation worker;
/// [`engine::launch`] holds the OpenCL-style entry points.
pub use gpusim_engine as engine;

/// Common imports for typical gpusim usage.
///
/// ```rust
/// use gpusim::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use gpusim_core::{
        ArgList, Dim3, EngineInit, EnvConfig, GridDescriptor, GridId, KernelArg, KernelEntry,
        OptionKind, OptionRegistry, SimCounters, TimingModel,
    };

    // Errors
    pub use gpusim_core::{EngineError, OptionError};
    pub use gpusim_engine::{InitError, LaunchError};

    // Engine
    pub use gpusim_engine::{
        GridReport, Session, ShutdownReport, SimConfig, SimulationTime, TraceOpenPolicy,
    };
}
