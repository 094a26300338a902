//! Option registry: typed, named settings parsed from configuration
//! files and command-line style argument lists.
//!
//! Components register their options up front with a type, a default,
//! and a description. Parsing then consumes `-name value` token pairs;
//! the special `-config <file>` pair splices in the tokens of a
//! configuration file, where `#` starts a comment that runs to the end
//! of the line. Later settings override earlier ones, so arguments
//! placed after `-config` take precedence over the file.
//!
//! Registration order is preserved (via `IndexMap`) so the resolved
//! configuration always prints in the same order.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::OptionError;

/// Option name that loads a configuration file.
pub const CONFIG_OPTION: &str = "-config";

/// Maximum depth of `-config` files including other `-config` files.
pub const MAX_CONFIG_NESTING: usize = 8;

/// The type of a registered option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionKind {
    /// `0`/`1`/`true`/`false`.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// Unsigned 64-bit integer, decimal or `0x` hexadecimal.
    UInt,
    /// 64-bit float.
    Float,
    /// Free-form string.
    Str,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Str => "string",
        };
        f.write_str(s)
    }
}

/// A parsed option value.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Int(i64),
    /// Unsigned integer value.
    UInt(u64),
    /// Floating-point value.
    Float(f64),
    /// String value.
    Str(String),
}

impl OptionValue {
    /// Parse `raw` as a value of `kind`.
    ///
    /// Returns `None` if the text is not a valid literal for the kind.
    pub fn parse(kind: OptionKind, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match kind {
            OptionKind::Bool => match raw {
                "1" | "true" => Some(Self::Bool(true)),
                "0" | "false" => Some(Self::Bool(false)),
                _ => None,
            },
            OptionKind::Int => raw.parse().ok().map(Self::Int),
            OptionKind::UInt => parse_uint(raw).map(Self::UInt),
            OptionKind::Float => raw.parse().ok().map(Self::Float),
            OptionKind::Str => Some(Self::Str(raw.to_string())),
        }
    }

    /// The kind this value belongs to.
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::Bool(_) => OptionKind::Bool,
            Self::Int(_) => OptionKind::Int,
            Self::UInt(_) => OptionKind::UInt,
            Self::Float(_) => OptionKind::Float,
            Self::Str(_) => OptionKind::Str,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", u8::from(*b)),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

fn parse_uint(raw: &str) -> Option<u64> {
    match raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

#[derive(Clone, Debug)]
struct OptionEntry {
    value: OptionValue,
    description: String,
    explicitly_set: bool,
}

/// Ordered collection of registered options and their current values.
///
/// # Examples
///
/// ```
/// use gpusim_core::{OptionKind, OptionRegistry};
///
/// let mut opts = OptionRegistry::new();
/// opts.register("-gpgpu_n_clusters", OptionKind::UInt, "number of clusters", "10").unwrap();
/// opts.parse_args(["-gpgpu_n_clusters", "15"]).unwrap();
/// assert_eq!(opts.get_uint("-gpgpu_n_clusters").unwrap(), 15);
/// ```
#[derive(Clone, Debug, Default)]
pub struct OptionRegistry {
    entries: IndexMap<String, OptionEntry>,
}

impl OptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an option with its type, description, and default.
    ///
    /// The default is parsed with the same rules as user-supplied
    /// values, so an unparsable default is reported here rather than
    /// at lookup time.
    pub fn register(
        &mut self,
        name: &str,
        kind: OptionKind,
        description: &str,
        default: &str,
    ) -> Result<(), OptionError> {
        if self.entries.contains_key(name) {
            return Err(OptionError::Duplicate {
                name: name.to_string(),
            });
        }
        let value = OptionValue::parse(kind, default).ok_or_else(|| OptionError::InvalidValue {
            name: name.to_string(),
            value: default.to_string(),
            kind,
        })?;
        self.entries.insert(
            name.to_string(),
            OptionEntry {
                value,
                description: description.to_string(),
                explicitly_set: false,
            },
        );
        Ok(())
    }

    /// Set a registered option from its textual value.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), OptionError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| OptionError::Unknown {
                name: name.to_string(),
            })?;
        let kind = entry.value.kind();
        entry.value = OptionValue::parse(kind, raw).ok_or_else(|| OptionError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            kind,
        })?;
        entry.explicitly_set = true;
        Ok(())
    }

    /// Parse a command-line style token list.
    ///
    /// Tokens come in `-name value` pairs. `-config <file>` loads the
    /// file in place, so options after it override the file's settings.
    pub fn parse_args<I, S>(&mut self, args: I) -> Result<(), OptionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        self.apply_tokens(&tokens, 0)
    }

    /// Load and apply a configuration file.
    pub fn parse_config_file(&mut self, path: &Path) -> Result<(), OptionError> {
        self.load_file(path, 0)
    }

    /// Apply configuration text (same syntax as a configuration file).
    pub fn parse_config_str(&mut self, text: &str) -> Result<(), OptionError> {
        let tokens = tokenize(text);
        self.apply_tokens(&tokens, 0)
    }

    fn load_file(&mut self, path: &Path, depth: usize) -> Result<(), OptionError> {
        if depth >= MAX_CONFIG_NESTING {
            return Err(OptionError::NestingTooDeep {
                path: path.to_path_buf(),
                limit: MAX_CONFIG_NESTING,
            });
        }
        let text = fs::read_to_string(path).map_err(|source| OptionError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        let tokens = tokenize(&text);
        self.apply_tokens(&tokens, depth + 1)
    }

    fn apply_tokens(&mut self, tokens: &[String], depth: usize) -> Result<(), OptionError> {
        let mut iter = tokens.iter();
        while let Some(name) = iter.next() {
            if !name.starts_with('-') {
                return Err(OptionError::UnexpectedToken {
                    token: name.clone(),
                });
            }
            let value = iter.next().ok_or_else(|| OptionError::MissingValue {
                name: name.clone(),
            })?;
            if name == CONFIG_OPTION {
                self.load_file(&PathBuf::from(value), depth)?;
            } else {
                self.set(name, value)?;
            }
        }
        Ok(())
    }

    /// Current value of an option, if registered.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.get(name).map(|e| &e.value)
    }

    /// Whether the option was set by a file or argument (not just defaulted).
    pub fn is_explicitly_set(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|e| e.explicitly_set)
    }

    fn lookup(&self, name: &str) -> Result<&OptionValue, OptionError> {
        self.get(name).ok_or_else(|| OptionError::Unknown {
            name: name.to_string(),
        })
    }

    /// Read a boolean option.
    pub fn get_bool(&self, name: &str) -> Result<bool, OptionError> {
        match self.lookup(name)? {
            OptionValue::Bool(v) => Ok(*v),
            other => Err(mismatch(name, OptionKind::Bool, other)),
        }
    }

    /// Read a signed integer option.
    pub fn get_int(&self, name: &str) -> Result<i64, OptionError> {
        match self.lookup(name)? {
            OptionValue::Int(v) => Ok(*v),
            other => Err(mismatch(name, OptionKind::Int, other)),
        }
    }

    /// Read an unsigned integer option.
    pub fn get_uint(&self, name: &str) -> Result<u64, OptionError> {
        match self.lookup(name)? {
            OptionValue::UInt(v) => Ok(*v),
            other => Err(mismatch(name, OptionKind::UInt, other)),
        }
    }

    /// Read a floating-point option.
    pub fn get_float(&self, name: &str) -> Result<f64, OptionError> {
        match self.lookup(name)? {
            OptionValue::Float(v) => Ok(*v),
            other => Err(mismatch(name, OptionKind::Float, other)),
        }
    }

    /// Read a string option.
    pub fn get_str(&self, name: &str) -> Result<&str, OptionError> {
        match self.lookup(name)? {
            OptionValue::Str(v) => Ok(v.as_str()),
            other => Err(mismatch(name, OptionKind::Str, other)),
        }
    }

    /// Iterate `(name, value, description)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue, &str)> {
        self.entries
            .iter()
            .map(|(name, e)| (name.as_str(), &e.value, e.description.as_str()))
    }

    /// Number of registered options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no options are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Renders one line per option: name, value, and description.
impl fmt::Display for OptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value, description) in self.iter() {
            writeln!(f, "{name:<40} {:<20} # {description}", value.to_string())?;
        }
        Ok(())
    }
}

fn mismatch(name: &str, requested: OptionKind, actual: &OptionValue) -> OptionError {
    OptionError::TypeMismatch {
        name: name.to_string(),
        requested,
        actual: actual.kind(),
    }
}

/// Split configuration text into tokens.
///
/// Whitespace separates tokens, `#` comments out the rest of the line,
/// and double quotes group a value containing spaces.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for line in text.lines() {
        let mut current = String::new();
        let mut in_quotes = false;
        let mut quoted = false;
        for ch in line.chars() {
            match ch {
                '"' => {
                    in_quotes = !in_quotes;
                    quoted = true;
                }
                '#' if !in_quotes => break,
                c if c.is_whitespace() && !in_quotes => {
                    if !current.is_empty() || quoted {
                        tokens.push(std::mem::take(&mut current));
                        quoted = false;
                    }
                }
                c => current.push(c),
            }
        }
        if !current.is_empty() || quoted {
            tokens.push(current);
        }
    }
    tokens
}
