//! Configuration file loading with precedence handling.

use crate::processor::{available_workers, ProcessorConfig};
use crate::query::{
    ProcessOptions, QueryCache, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, DEFAULT_MAX_CANDIDATES,
};
use crate::recurrence::DEFAULT_MAX_OCCURRENCES;
use crate::view_state::{HeightModel, WindowingConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "CALGRID_CONFIG";

/// Environment variable overriding the worker pool size. `0` disables the pool.
pub const WORKERS_ENV_VAR: &str = "CALGRID_WORKERS";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may exist but be unreadable).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/calgrid/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Safety cap on recurrence steps per master event.
    #[serde(default)]
    pub max_occurrences: Option<usize>,

    /// Cap on occurrences handed to layout per query.
    #[serde(default)]
    pub max_candidates: Option<usize>,

    /// Whether queries may run on the worker pool.
    #[serde(default)]
    pub workers_enabled: Option<bool>,

    /// Number of worker threads.
    #[serde(default)]
    pub worker_pool_size: Option<usize>,

    /// Per-task timeout in milliseconds.
    #[serde(default)]
    pub task_timeout_ms: Option<u64>,

    /// Processed views kept in the query cache.
    #[serde(default)]
    pub cache_capacity: Option<usize>,

    /// Seconds before a cached view goes stale.
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,

    /// Items rendered beyond each edge of the viewport.
    #[serde(default)]
    pub window_buffer: Option<usize>,

    /// Height assumed for unmeasured items.
    #[serde(default)]
    pub estimated_item_height: Option<usize>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Safety cap on recurrence steps per master event.
    pub max_occurrences: usize,
    /// Cap on occurrences handed to layout per query.
    pub max_candidates: usize,
    /// Whether queries may run on the worker pool.
    pub workers_enabled: bool,
    /// Number of worker threads.
    pub worker_pool_size: usize,
    /// Per-task timeout in milliseconds, counted from worker pickup.
    pub task_timeout_ms: u64,
    /// Processed views kept in the query cache.
    pub cache_capacity: usize,
    /// Seconds before a cached view goes stale.
    pub cache_ttl_secs: u64,
    /// Items rendered beyond each edge of the viewport.
    pub window_buffer: usize,
    /// Height assumed for unmeasured items.
    pub estimated_item_height: usize,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            workers_enabled: true,
            worker_pool_size: available_workers(),
            task_timeout_ms: 30_000,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            window_buffer: 5,
            estimated_item_height: 50,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Settings for [`crate::processor::Processor::select`].
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            workers_enabled: self.workers_enabled,
            pool_size: self.worker_pool_size,
            task_timeout: Duration::from_millis(self.task_timeout_ms),
        }
    }

    /// Default pipeline options with the configured caps applied.
    pub fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            max_occurrences: self.max_occurrences,
            max_candidates: self.max_candidates,
            ..ProcessOptions::default()
        }
    }

    /// Windowing over `item_count` rows whose heights are estimated until
    /// measured.
    pub fn windowing_config(&self, item_count: usize, container_height: usize) -> WindowingConfig {
        WindowingConfig {
            item_count,
            container_height,
            buffer: self.window_buffer,
            heights: HeightModel::Estimated(self.estimated_item_height),
        }
    }

    /// An empty cache sized from this config.
    pub fn query_cache(&self) -> QueryCache {
        QueryCache::new(
            self.cache_capacity,
            Duration::from_secs(self.cache_ttl_secs),
        )
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/calgrid/calgrid.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("calgrid").join("calgrid.log")
    } else {
        PathBuf::from("calgrid.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file");
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/calgrid/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("calgrid").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CALGRID_CONFIG` environment variable
/// 3. Default path `~/.config/calgrid/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed,
/// or if `CALGRID_CONFIG` is not valid Unicode.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    match std::env::var(CONFIG_ENV_VAR) {
        Ok(env_path) => return load_config_file(PathBuf::from(env_path)),
        Err(std::env::VarError::NotUnicode(raw)) => {
            return Err(ConfigError::InvalidPath(raw.to_string_lossy().into_owned()));
        }
        Err(std::env::VarError::NotPresent) => {}
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CALGRID_WORKERS`: worker pool size; `0` disables the pool.
///   Unparseable values are ignored with a warning.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(raw) = std::env::var(WORKERS_ENV_VAR) {
        match raw.trim().parse::<usize>() {
            Ok(0) => config.workers_enabled = false,
            Ok(size) => {
                config.workers_enabled = true;
                config.worker_pool_size = size;
            }
            Err(_) => {
                tracing::warn!(value = %raw, "ignoring unparseable {}", WORKERS_ENV_VAR);
            }
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        max_occurrences: config.max_occurrences.unwrap_or(defaults.max_occurrences),
        max_candidates: config.max_candidates.unwrap_or(defaults.max_candidates),
        workers_enabled: config.workers_enabled.unwrap_or(defaults.workers_enabled),
        worker_pool_size: config.worker_pool_size.unwrap_or(defaults.worker_pool_size),
        task_timeout_ms: config.task_timeout_ms.unwrap_or(defaults.task_timeout_ms),
        cache_capacity: config.cache_capacity.unwrap_or(defaults.cache_capacity),
        cache_ttl_secs: config.cache_ttl_secs.unwrap_or(defaults.cache_ttl_secs),
        window_buffer: config.window_buffer.unwrap_or(defaults.window_buffer),
        estimated_item_height: config
            .estimated_item_height
            .unwrap_or(defaults.estimated_item_height),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// CLI flags that take part in the precedence chain. `None` and `false`
/// leave the config untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--max-occurrences`.
    pub max_occurrences: Option<usize>,
    /// `--inline`: disables the worker pool.
    pub inline: bool,
    /// `--log-file`.
    pub log_file_path: Option<PathBuf>,
}

/// Apply CLI argument overrides to resolved config.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, overrides: CliOverrides) -> ResolvedConfig {
    if let Some(max) = overrides.max_occurrences {
        config.max_occurrences = max;
    }

    if overrides.inline {
        config.workers_enabled = false;
    }

    if let Some(path) = overrides.log_file_path {
        config.log_file_path = path;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
