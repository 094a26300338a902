//! Debug and tracing toggles read from the process environment.
//!
//! These are read once, during session initialization, and handed to
//! the timing model alongside the parsed options.

use thiserror::Error;

/// Environment variable selecting the interpreter debug verbosity.
pub const PTX_SIM_DEBUG: &str = "PTX_SIM_DEBUG";
/// Environment variable restricting debug output to one thread uid.
pub const PTX_SIM_DEBUG_THREAD_UID: &str = "PTX_SIM_DEBUG_THREAD_UID";
/// Environment variable restricting debug output to one program counter.
pub const PTX_SIM_DEBUG_PC: &str = "PTX_SIM_DEBUG_PC";
/// Environment variable enabling the interactive debugger.
pub const GPGPUSIM_DEBUG: &str = "GPGPUSIM_DEBUG";
/// Environment variable enabling PTX parser debug output.
pub const PTX_PARSER_DEBUG: &str = "PTX_PARSER_DEBUG";

/// An environment variable held a value of the wrong shape.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("environment variable {var}={value:?} is not a valid {expected}")]
pub struct EnvError {
    /// The variable name.
    pub var: &'static str,
    /// The raw value found.
    pub value: String,
    /// What was expected (e.g. "unsigned integer").
    pub expected: &'static str,
}

/// Resolved environment toggles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Interpreter debug verbosity; 0 disables debug output.
    pub debug_level: u32,
    /// Only trace this thread uid, if set.
    pub debug_thread_uid: Option<u64>,
    /// Only trace this program counter, if set.
    pub debug_pc: Option<u64>,
    /// Enable the interactive debugger.
    pub interactive_debugger: bool,
    /// Enable PTX parser debug output.
    pub parser_debug: bool,
}

impl EnvConfig {
    /// Read toggles from the process environment.
    pub fn from_env() -> Result<Self, EnvError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read toggles through an arbitrary lookup function.
    ///
    /// Unset variables take their defaults; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EnvError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let debug_level: u32 = match get(PTX_SIM_DEBUG) {
            Some(v) => u32::try_from(parse_number(PTX_SIM_DEBUG, &v)?)
                .map_err(|_| invalid(PTX_SIM_DEBUG, &v, "unsigned 32-bit integer"))?,
            None => 0,
        };
        let debug_thread_uid = get(PTX_SIM_DEBUG_THREAD_UID)
            .map(|v| parse_number(PTX_SIM_DEBUG_THREAD_UID, &v))
            .transpose()?;
        let debug_pc = get(PTX_SIM_DEBUG_PC)
            .map(|v| parse_number(PTX_SIM_DEBUG_PC, &v))
            .transpose()?;
        let interactive_debugger = get(GPGPUSIM_DEBUG)
            .map(|v| parse_flag(GPGPUSIM_DEBUG, &v))
            .transpose()?
            .unwrap_or(false);
        let parser_debug = get(PTX_PARSER_DEBUG)
            .map(|v| parse_flag(PTX_PARSER_DEBUG, &v))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            debug_level,
            debug_thread_uid,
            debug_pc,
            interactive_debugger,
            parser_debug,
        })
    }
}

fn invalid(var: &'static str, value: &str, expected: &'static str) -> EnvError {
    EnvError {
        var,
        value: value.to_string(),
        expected,
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u64, EnvError> {
    let v = value.trim();
    let parsed = match v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => v.parse().ok(),
    };
    parsed.ok_or_else(|| invalid(var, value, "unsigned integer"))
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, EnvError> {
    match value.trim() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, value, "flag (0/1)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn unset_environment_gives_defaults() {
        let env = EnvConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(env, EnvConfig::default());
    }

    #[test]
    fn reads_all_toggles() {
        let env = EnvConfig::from_lookup(lookup(&[
            (PTX_SIM_DEBUG, "3"),
            (PTX_SIM_DEBUG_THREAD_UID, "42"),
            (PTX_SIM_DEBUG_PC, "0x1f0"),
            (GPGPUSIM_DEBUG, "1"),
            (PTX_PARSER_DEBUG, "true"),
        ]))
        .unwrap();
        assert_eq!(env.debug_level, 3);
        assert_eq!(env.debug_thread_uid, Some(42));
        assert_eq!(env.debug_pc, Some(0x1f0));
        assert!(env.interactive_debugger);
        assert!(env.parser_debug);
    }

    #[test]
    fn empty_value_counts_as_unset() {
        let env = EnvConfig::from_lookup(lookup(&[(PTX_SIM_DEBUG, "  ")])).unwrap();
        assert_eq!(env.debug_level, 0);
    }

    #[test]
    fn malformed_number_rejected() {
        let err = EnvConfig::from_lookup(lookup(&[(PTX_SIM_DEBUG, "verbose")])).unwrap_err();
        assert_eq!(err.var, PTX_SIM_DEBUG);
        assert_eq!(err.value, "verbose");
    }

    #[test]
    fn debug_level_must_fit_u32() {
        let err =
            EnvConfig::from_lookup(lookup(&[(PTX_SIM_DEBUG, "99999999999")])).unwrap_err();
        assert_eq!(err.var, PTX_SIM_DEBUG);
    }

    #[test]
    fn malformed_flag_rejected() {
        let err = EnvConfig::from_lookup(lookup(&[(GPGPUSIM_DEBUG, "sometimes")])).unwrap_err();
        assert_eq!(err.var, GPGPUSIM_DEBUG);
    }
}
