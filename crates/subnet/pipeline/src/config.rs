//! Pipeline configuration and parameter file loading

use std::path::{Path, PathBuf};
use std::time::Duration;
use subnet_genesis::{GenesisParams, constants::MAX_GENESIS_SIZE};
use thiserror::Error;

/// Default trailing-edge debounce window
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Configuration for the debounced pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Quiet period after the last edit before a cycle starts
    pub debounce: Duration,
    /// Serialized size ceiling; exceeding it is reported at `genesis`
    pub size_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { debounce: DEFAULT_DEBOUNCE, size_limit: MAX_GENESIS_SIZE }
    }
}

impl PipelineConfig {
    /// Create config with a specific debounce window
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Create config with a specific size ceiling
    pub const fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }
}

/// Errors raised while loading a parameter file
#[derive(Debug, Error)]
pub enum ParamsError {
    /// IO error
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// TOML parse error
    #[error("invalid TOML in {}: {source}", path.display())]
    Toml {
        /// Offending file
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },

    /// JSON parse error
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// Offending file
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Extension is neither `.toml` nor `.json`
    #[error("unsupported parameter file {}; expected .toml or .json", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Load a parameter snapshot from a `.toml` or `.json` file
pub fn load_params(path: impl AsRef<Path>) -> Result<GenesisParams, ParamsError> {
    let path = path.as_ref();
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);

    let is_toml = match extension.as_deref() {
        Some("toml") => true,
        Some("json") => false,
        _ => return Err(ParamsError::UnsupportedFormat(path.to_path_buf())),
    };

    let raw = std::fs::read_to_string(path)
        .map_err(|source| ParamsError::Io { path: path.to_path_buf(), source })?;
    if is_toml {
        toml::from_str(&raw).map_err(|source| ParamsError::Toml { path: path.to_path_buf(), source })
    } else {
        serde_json::from_str(&raw)
            .map_err(|source| ParamsError::Json { path: path.to_path_buf(), source })
    }
}
