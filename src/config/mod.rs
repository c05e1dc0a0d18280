//! Configuration module.
//!
//! Settings resolve through a precedence chain: built-in defaults, then the
//! TOML config file, then environment variables, then CLI flags.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, CliOverrides, ConfigError,
    ConfigFile, ResolvedConfig, CONFIG_ENV_VAR, WORKERS_ENV_VAR,
};

/// Runs the whole chain for an optional explicit config path.
///
/// # Errors
///
/// Returns error if a config file exists but cannot be read or parsed.
pub fn resolve(
    config_path: Option<std::path::PathBuf>,
    overrides: CliOverrides,
) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    let config = apply_env_overrides(merge_config(file));
    Ok(apply_cli_overrides(config, overrides))
}
