//! Tool configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::inference::Thresholds;
use crate::rng::DEFAULT_SEED;

/// Top-level qualimatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualimatchConfig {
    /// JSON file backing the key-value store.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Item bank TOML. The built-in bank is used when unset.
    #[serde(default)]
    pub bank_path: Option<PathBuf>,
    /// Seed used when `--seed` is not given.
    #[serde(default = "default_seed")]
    pub default_seed: String,
    /// Where CSV exports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub inference: Thresholds,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./.qualimatch/store.json")
}
fn default_seed() -> String {
    DEFAULT_SEED.to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./qualimatch-exports")
}

impl Default for QualimatchConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            bank_path: None,
            default_seed: default_seed(),
            output_dir: default_output_dir(),
            inference: Thresholds::default(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(p: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&p.to_string_lossy()))
}

/// Load configuration from an explicit path or the well-known paths.
///
/// Search order:
/// 1. `qualimatch.toml` in the current directory
/// 2. `~/.config/qualimatch/config.toml`
///
/// An explicit `path` skips the search and must exist.
///
/// Environment variable overrides: `QUALIMATCH_STORE`, `QUALIMATCH_BANK`.
pub fn load_config_from(path: Option<&Path>) -> Result<QualimatchConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("qualimatch.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => QualimatchConfig::default(),
    };

    // Apply env var overrides
    if let Ok(store) = std::env::var("QUALIMATCH_STORE") {
        config.store_path = PathBuf::from(store);
    }
    if let Ok(bank) = std::env::var("QUALIMATCH_BANK") {
        config.bank_path = Some(PathBuf::from(bank));
    }

    config.store_path = resolve_path(&config.store_path);
    config.output_dir = resolve_path(&config.output_dir);
    config.bank_path = config.bank_path.as_deref().map(resolve_path);

    Ok(config)
}

/// Parse a config body without touching the environment.
pub fn parse_config_str(content: &str) -> Result<QualimatchConfig> {
    Ok(toml::from_str::<QualimatchConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("qualimatch"))
}
