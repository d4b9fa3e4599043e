//! Configuration module.
//!
//! Startup settings ([`ResolvedConfig`]) and the alias tables that expand
//! abbreviated room and sender tokens.

pub mod aliases;
pub mod loader;

pub use aliases::{expand_escapes, AliasTable};
pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_dir, default_data_dir,
    load_config_file, merge_config, resolve, resolve_storage_dirs, validate_time_format,
    xdg_dir, CliOverrides, ConfigError, ConfigFile, ResolvedConfig, StorageDirs,
    DEFAULT_SELF_IDENTITY, DEFAULT_TIME_FORMAT,
};
