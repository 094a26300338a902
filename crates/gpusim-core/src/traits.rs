//! The timing-model abstraction the harness drives.

use std::sync::Arc;

use rand_chacha::ChaCha8Rng;

use crate::counters::SimCounters;
use crate::env::EnvConfig;
use crate::error::{EngineError, OptionError};
use crate::grid::{GridDescriptor, KernelEntry};
use crate::id::GridId;
use crate::options::OptionRegistry;
use crate::trace::InstTrace;

/// Everything a timing model receives when it is initialized.
///
/// Options are already parsed and the RNG already seeded, so two
/// sessions built from the same configuration start identical.
#[derive(Debug)]
pub struct EngineInit<'a> {
    /// Resolved options, including the model's own registrations.
    pub options: &'a OptionRegistry,
    /// Environment debug toggles.
    pub env: &'a EnvConfig,
    /// Deterministically seeded random generator for the model's use.
    pub rng: ChaCha8Rng,
    /// Instruction-trace sink, if tracing to file is enabled and opened.
    pub inst_trace: Option<InstTrace>,
}

/// A GPU timing simulator the harness can hand grids to.
///
/// The harness moves the model onto its worker thread after
/// [`init_gpu`](TimingModel::init_gpu); every other method is called
/// from that thread only, one grid at a time. The model therefore needs
/// to be [`Send`] but not [`Sync`].
///
/// Per grid, the call sequence is always
/// [`launch`](TimingModel::launch) → [`next_grid`](TimingModel::next_grid)
/// → [`run_gpu_sim`](TimingModel::run_gpu_sim) → [`counters`](TimingModel::counters).
pub trait TimingModel: Send {
    /// Human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Register the model's microarchitecture options.
    ///
    /// Called once, before any option parsing.
    fn reg_options(&self, options: &mut OptionRegistry) -> Result<(), OptionError>;

    /// Prepare the model for its first launch.
    fn init_gpu(&mut self, init: EngineInit<'_>) -> Result<(), EngineError>;

    /// Queue one grid for simulation.
    fn launch(&mut self, grid: GridDescriptor);

    /// Dequeue the grid to run next.
    ///
    /// Returns `None` if nothing is queued.
    fn next_grid(&mut self) -> Option<(GridId, Arc<KernelEntry>)>;

    /// Simulate the dequeued grid to completion.
    ///
    /// May take an unbounded amount of wall-clock time. Advances the
    /// aggregate counters as a side effect.
    fn run_gpu_sim(&mut self) -> Result<(), EngineError>;

    /// Current aggregate counters.
    fn counters(&self) -> SimCounters;
}
