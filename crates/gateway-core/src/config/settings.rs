//! Loading `Config` from disk.
//!
//! Modeled on `kairos-rs::config::settings::load_settings`: the path is
//! resolved from an environment variable with a sane default, canonicalized
//! and checked to stay under the current working directory, and capped at a
//! fixed size before parsing — a config file is a small, trusted artifact,
//! not an arbitrary upload.

use std::path::{Path, PathBuf};

use crate::error::GatewayError;

use super::Config;

const ENV_CONFIG_PATH: &str = "GATEWAY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./gateway.json";
const MAX_CONFIG_SIZE: u64 = 10 * 1024 * 1024;

/// Loads and parses the gateway configuration file.
///
/// `path` overrides `GATEWAY_CONFIG` when given (primarily for tests and the
/// CLI's `config validate <path>` subcommand); otherwise the environment
/// variable is consulted, falling back to `./gateway.json`.
pub fn load_config(path: Option<&str>) -> Result<Config, GatewayError> {
    let raw_path = path
        .map(|p| p.to_string())
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let path = Path::new(&raw_path);
    if !path.exists() {
        return Err(GatewayError::Config(format!(
            "config file not found: {}",
            raw_path
        )));
    }

    let canonical = path
        .canonicalize()
        .map_err(|e| GatewayError::Config(format!("cannot resolve config path: {e}")))?;
    let current_dir = std::env::current_dir()
        .map_err(|e| GatewayError::Config(format!("cannot resolve working directory: {e}")))?
        .canonicalize()
        .map_err(|e| GatewayError::Config(format!("cannot canonicalize working directory: {e}")))?;

    if !canonical.starts_with(&current_dir) {
        log::warn!(
            "config path {} resolves outside the working directory",
            canonical.display()
        );
        return Err(GatewayError::Config(
            "config path must resolve under the working directory".into(),
        ));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| GatewayError::Config(format!("cannot stat config file: {e}")))?;
    if metadata.len() > MAX_CONFIG_SIZE {
        return Err(GatewayError::Config(format!(
            "config file exceeds {MAX_CONFIG_SIZE} bytes"
        )));
    }

    let contents = std::fs::read_to_string(&canonical)
        .map_err(|e| GatewayError::Config(format!("cannot read config file: {e}")))?;

    log::debug!("loading gateway config from {}", canonical.display());
    parse_by_extension(&canonical, &contents)
}

fn parse_by_extension(path: &PathBuf, contents: &str) -> Result<Config, GatewayError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(contents)
            .map_err(|e| GatewayError::Config(format!("invalid YAML config: {e}"))),
        Some("json") | None => serde_json::from_str(contents)
            .map_err(|e| GatewayError::Config(format!("invalid JSON config: {e}"))),
        Some(other) => Err(GatewayError::Config(format!(
            "unsupported config extension: {other}"
        ))),
    }
}
