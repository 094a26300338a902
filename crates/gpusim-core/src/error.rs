//! Error types shared by the harness and timing models.
//!
//! Organized by subsystem: option registration/parsing and timing-model
//! execution. Environment-toggle errors live next to their reader in
//! [`env`](crate::env).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::id::GridId;
use crate::options::OptionKind;

/// Errors from option registration, lookup, and parsing.
#[derive(Debug, Error)]
pub enum OptionError {
    /// The option name was never registered.
    #[error("unknown option '{name}'")]
    Unknown {
        /// The unrecognized name.
        name: String,
    },
    /// An option name was the last token, with no value after it.
    #[error("option '{name}' is missing a value")]
    MissingValue {
        /// The option lacking a value.
        name: String,
    },
    /// A value could not be parsed as the option's type.
    #[error("option '{name}': cannot parse '{value}' as {kind}")]
    InvalidValue {
        /// The option being set.
        name: String,
        /// The raw text that failed to parse.
        value: String,
        /// The type the option was registered with.
        kind: OptionKind,
    },
    /// The same name was registered twice.
    #[error("option '{name}' is already registered")]
    Duplicate {
        /// The conflicting name.
        name: String,
    },
    /// A typed getter was used on an option of another type.
    #[error("option '{name}' is {actual}, not {requested}")]
    TypeMismatch {
        /// The option looked up.
        name: String,
        /// The type asked for.
        requested: OptionKind,
        /// The type it was registered with.
        actual: OptionKind,
    },
    /// A token in option position did not start with `-`.
    #[error("expected an option name, found '{token}'")]
    UnexpectedToken {
        /// The offending token.
        token: String,
    },
    /// A configuration file could not be read.
    #[error("cannot read config file {}: {source}", .path.display())]
    ConfigFile {
        /// The file that failed to open or read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// `-config` directives nested beyond the supported depth.
    #[error("config file {} nested deeper than {limit} levels", .path.display())]
    NestingTooDeep {
        /// The file at which the limit was hit.
        path: PathBuf,
        /// The nesting limit.
        limit: usize,
    },
}

/// Errors reported by a [`TimingModel`](crate::TimingModel).
#[derive(Debug, Error)]
pub enum EngineError {
    /// `init_gpu` could not prepare the model.
    #[error("timing model initialization failed: {reason}")]
    InitFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The model failed while simulating a grid.
    #[error("simulation of grid {grid} failed: {reason}")]
    SimulationFailed {
        /// The grid being simulated.
        grid: GridId,
        /// Human-readable description of the failure.
        reason: String,
    },
    /// `run_gpu_sim` was called without a grid dequeued by `next_grid`.
    #[error("no grid dequeued for simulation")]
    NoActiveGrid,
    /// The model could not read one of its options.
    #[error(transparent)]
    Options(#[from] OptionError),
}
