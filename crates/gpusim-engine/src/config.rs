//! Session configuration and the harness's own options.
//!
//! [`SimConfig`] is the explicit input to
//! [`Session::initialize`](crate::session::Session::initialize). Its
//! default reproduces the classic fixed command line
//! `-config gpgpusim.config` with RNG seed 1.

use std::path::PathBuf;

use gpusim_core::{EnvConfig, OptionError, OptionKind, OptionRegistry};

/// Configuration file read when none is specified.
pub const DEFAULT_CONFIG_FILE: &str = "gpgpusim.config";

/// Seed for the deterministic RNG when none is specified.
pub const DEFAULT_SEED: u64 = 1;

/// Option enabling the per-instruction trace file.
pub const INST_DEBUG_TO_FILE: &str = "-ptx_inst_debug_to_file";

/// Option naming the per-instruction trace file.
pub const INST_DEBUG_FILE: &str = "-ptx_inst_debug_file";

/// Default trace file name.
pub const DEFAULT_INST_DEBUG_FILE: &str = "inst_debug.txt";

// ── TraceOpenPolicy ──────────────────────────────────────────────

/// What to do when the instruction-trace file cannot be created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceOpenPolicy {
    /// Fail initialization with [`InitError::TraceOpen`](crate::InitError::TraceOpen).
    #[default]
    Strict,
    /// Log a warning and continue without a trace sink.
    BestEffort,
}

// ── SimConfig ────────────────────────────────────────────────────

/// Complete input for initializing a simulation session.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Configuration file loaded via `-config`. `None` skips the file
    /// and uses registered defaults plus [`args`](Self::args).
    pub config_file: Option<PathBuf>,
    /// Extra `-name value` arguments, applied after the file.
    pub args: Vec<String>,
    /// Environment toggles. `None` reads them from the process
    /// environment during initialization.
    pub env: Option<EnvConfig>,
    /// Seed for the RNG handed to the timing model. Default: 1.
    pub seed: u64,
    /// Handling of trace-file open failures. Default: strict.
    pub trace_open: TraceOpenPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            config_file: Some(PathBuf::from(DEFAULT_CONFIG_FILE)),
            args: Vec::new(),
            env: None,
            seed: DEFAULT_SEED,
            trace_open: TraceOpenPolicy::Strict,
        }
    }
}

impl SimConfig {
    /// A configuration with no config file, fixed (default) environment
    /// toggles, and the given arguments. Convenient for embedding and tests.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config_file: None,
            args: args.into_iter().map(Into::into).collect(),
            env: Some(EnvConfig::default()),
            ..Self::default()
        }
    }

    /// The command line handed to the option parser.
    ///
    /// `-config <file>` first (if any), then [`args`](Self::args).
    pub fn command_line(&self) -> Vec<String> {
        let mut line = Vec::with_capacity(self.args.len() + 2);
        if let Some(file) = &self.config_file {
            line.push(gpusim_core::options::CONFIG_OPTION.to_string());
            line.push(file.display().to_string());
        }
        line.extend(self.args.iter().cloned());
        line
    }
}

/// Register the options the harness itself consumes.
pub(crate) fn register_harness_options(options: &mut OptionRegistry) -> Result<(), OptionError> {
    options.register(
        INST_DEBUG_TO_FILE,
        OptionKind::Bool,
        "Dump executed instructions' debug information to file",
        "0",
    )?;
    options.register(
        INST_DEBUG_FILE,
        OptionKind::Str,
        "Executed instructions' debug output file",
        DEFAULT_INST_DEBUG_FILE,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_command_line_reads_gpgpusim_config() {
        let config = SimConfig::default();
        assert_eq!(config.command_line(), vec!["-config", "gpgpusim.config"]);
        assert_eq!(config.seed, 1);
        assert_eq!(config.trace_open, TraceOpenPolicy::Strict);
        assert!(config.env.is_none());
    }

    #[test]
    fn args_follow_config_file() {
        let config = SimConfig {
            config_file: Some(PathBuf::from("custom.config")),
            args: vec!["-gpgpu_n_clusters".into(), "4".into()],
            ..SimConfig::default()
        };
        assert_eq!(
            config.command_line(),
            vec!["-config", "custom.config", "-gpgpu_n_clusters", "4"]
        );
    }

    #[test]
    fn from_args_skips_file_and_environment() {
        let config = SimConfig::from_args(["-ptx_inst_debug_to_file", "0"]);
        assert!(config.config_file.is_none());
        assert_eq!(config.env, Some(EnvConfig::default()));
        assert_eq!(config.command_line(), vec!["-ptx_inst_debug_to_file", "0"]);
    }

    #[test]
    fn harness_options_have_expected_defaults() {
        let mut opts = OptionRegistry::new();
        register_harness_options(&mut opts).unwrap();
        assert!(!opts.get_bool(INST_DEBUG_TO_FILE).unwrap());
        assert_eq!(opts.get_str(INST_DEBUG_FILE).unwrap(), "inst_debug.txt");
    }
}
