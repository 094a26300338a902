//! Core types and traits for the gpusim launch harness.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the harness and the timing models it drives:
//! grid descriptors and launch geometry, aggregate counters, the option
//! registry, environment toggles, the instruction-trace sink, error types,
//! and the [`TimingModel`] trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod counters;
pub mod env;
pub mod error;
pub mod grid;
pub mod id;
pub mod options;
pub mod trace;
pub mod traits;

pub use counters::SimCounters;
pub use env::{EnvConfig, EnvError};
pub use error::{EngineError, OptionError};
pub use grid::{ArgList, Dim3, GridDescriptor, KernelArg, KernelEntry};
pub use id::{EntryUid, GridId};
pub use options::{OptionKind, OptionRegistry, OptionValue};
pub use trace::InstTrace;
pub use traits::{EngineInit, TimingModel};

pub use rand_chacha::ChaCha8Rng;
