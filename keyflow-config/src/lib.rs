//! Parser of `keyflow.toml`.
//!
//! The file is read at build time by `keyflow`'s build script; every field has a default so an
//! empty (or missing) file is a valid configuration. Anything that would make the debounce policy
//! table malformed is rejected here, so it surfaces as a build failure rather than at runtime.

use std::fs;
use std::path::Path;

use serde_derive::Deserialize;
use serde_inline_default::serde_inline_default;

pub mod defaults;
pub mod error;
mod validation;

pub use error::{ConfigError, ConfigResult};

/// Configurations for keyflow.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyflowTomlConfig {
    #[serde(default)]
    pub matrix: MatrixConfig,
    #[serde(default)]
    pub debounce: DebounceConfig,
    #[serde(default)]
    pub multi_tap: MultiTapConfig,
}

/// Matrix size, only used to check positions in the other sections
#[serde_inline_default]
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixConfig {
    #[serde_inline_default(defaults::MATRIX_ROWS)]
    pub rows: u8,
    #[serde_inline_default(defaults::MATRIX_COLS)]
    pub cols: u8,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            rows: defaults::MATRIX_ROWS,
            cols: defaults::MATRIX_COLS,
        }
    }
}

/// The `[debounce]` section
#[serde_inline_default]
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DebounceConfig {
    /// Debounce time in ms, 1..=255
    #[serde_inline_default(defaults::DEBOUNCE_TIME_MS)]
    pub time: u16,
    /// Positions which always use the eager policy, as `[row, col]`
    #[serde(default)]
    pub eager_keys: Vec<[u8; 2]>,
    /// Positions moved from defer to eager while fast mode is on, as `[row, col]`
    #[serde(default)]
    pub fast_mode_keys: Vec<[u8; 2]>,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            time: defaults::DEBOUNCE_TIME_MS,
            eager_keys: Vec::new(),
            fast_mode_keys: Vec::new(),
        }
    }
}

/// The `[multi_tap]` section
#[serde_inline_default]
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiTapConfig {
    /// Idle time after the last press before the tap count is resolved, in ms
    #[serde_inline_default(defaults::MULTI_TAP_TIMEOUT_MS)]
    pub timeout: u64,
    /// Number of tap counts which resolve to a key
    #[serde_inline_default(defaults::MULTI_TAP_MAX)]
    pub max_taps: usize,
}

impl Default for MultiTapConfig {
    fn default() -> Self {
        Self {
            timeout: defaults::MULTI_TAP_TIMEOUT_MS,
            max_taps: defaults::MULTI_TAP_MAX,
        }
    }
}

impl KeyflowTomlConfig {
    /// Parse and validate a config string
    pub fn parse(path: &str, content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::TomlParse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate the config file at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path_str = path.as_ref().display().to_string();
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead {
            path: path_str.clone(),
            message: e.to_string(),
        })?;
        Self::parse(&path_str, &content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        validation::validate_config(self)
    }
}
