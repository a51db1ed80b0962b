//! Configuration schema for kousei
//!
//! Config lives at `.config/kousei/config.json` relative to the working
//! directory. Every field is optional.

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use serde::Deserialize;
use tracing::info;

/// Default config location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/kousei/config.json";

/// Root configuration for kousei
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// How to run the lint engine
    pub engine: EngineConfig,

    /// JSON rule catalog replacing the built-in one
    pub catalog: Option<PathBuf>,
}

/// Configuration for the textlint process
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Executable to run, e.g. `textlint` or `npx`
    pub command: String,

    /// Arguments placed before the ones kousei adds, e.g. `["textlint"]` for npx
    pub args: Vec<String>,

    /// textlintrc handed to the engine with `--config`
    pub textlintrc: Option<PathBuf>,

    /// Extensions the engine's plugins can parse, with the leading dot
    pub extensions: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: "textlint".to_string(),
            args: Vec::new(),
            textlintrc: None,
            extensions: [".txt", ".md", ".markdown", ".html", ".htm", ".tex", ".re"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Config {
    /// Parse a config file's contents.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).wrap_err("Config is not valid")
    }
}

/// Load the config at `path`.
///
/// A missing file at the default location yields the defaults; a missing file
/// that was asked for explicitly is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => Config::from_json(&content)
            .wrap_err_with(|| format!("Config file {} has errors", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
            info!(
                "Config file {} not found, using defaults",
                path.display()
            );
            Ok(Config::default())
        }
        Err(e) => Err(e).wrap_err_with(|| format!("Failed to read config {}", path.display())),
    }
}
