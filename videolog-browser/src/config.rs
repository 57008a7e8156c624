//! Configuration resolution for videolog-browser
//!
//! Library manifest priority: command line -> `VIDEOLOG_LIBRARY` -> TOML.

use std::path::PathBuf;

use tracing::{info, warn, Subscriber};
use videolog_common::config::{ConfigResolver, ConfigSource, TomlConfig};
use videolog_common::{Error, Result};

use crate::studio::StudioRegistry;

/// Environment variable naming the library manifest
pub const LIBRARY_ENV_VAR: &str = "VIDEOLOG_LIBRARY";

/// Load the configuration with `bootstrap` as the active subscriber
///
/// The final subscriber depends on `[logging]`, so resolution diagnostics
/// (missing env or user config file, chosen source) are reported through a
/// short-lived startup subscriber instead of being dropped.
pub fn load_config<S>(
    cli_path: Option<PathBuf>,
    bootstrap: S,
) -> Result<(TomlConfig, ConfigSource)>
where
    S: Subscriber + Send + Sync + 'static,
{
    tracing::subscriber::with_default(bootstrap, || ConfigResolver::new(cli_path).load())
}

/// Resolve the library manifest path
pub fn resolve_library_manifest(
    cli_arg: Option<PathBuf>,
    toml_config: &TomlConfig,
) -> Result<PathBuf> {
    let env_path = std::env::var(LIBRARY_ENV_VAR)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let sources = [
        cli_arg.is_some(),
        env_path.is_some(),
        toml_config.library_manifest.is_some(),
    ]
    .iter()
    .filter(|present| **present)
    .count();
    if sources > 1 {
        warn!("Library manifest set in multiple places; using the highest priority one");
    }

    if let Some(path) = cli_arg {
        info!("Library manifest from command line: {}", path.display());
        return Ok(path);
    }
    if let Some(path) = env_path {
        info!("Library manifest from {}: {}", LIBRARY_ENV_VAR, path.display());
        return Ok(path);
    }
    if let Some(path) = &toml_config.library_manifest {
        info!("Library manifest from config file: {}", path.display());
        return Ok(path.clone());
    }

    Err(Error::Config(format!(
        "No media library configured. Use one of:\n\
         1. Command line: --library <manifest.json>\n\
         2. Environment: {}=<manifest.json>\n\
         3. TOML config: library_manifest = \"<manifest.json>\"",
        LIBRARY_ENV_VAR
    )))
}

/// Build the studio registry from `[[studios]]`
pub fn build_registry(toml_config: &TomlConfig) -> Result<StudioRegistry> {
    let registry = StudioRegistry::from_entries(&toml_config.studios)?;
    info!("Studio registry: {} studio(s)", registry.len());
    Ok(registry)
}
