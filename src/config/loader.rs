//! Configuration loading and merging logic
//!
//! Handles loading configuration from the optional config file and
//! environment variable overrides.

use super::schema::Config;
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Config file (if provided)
    /// 3. Built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => Self::load_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        config = Self::apply_env_overrides(config);
        Ok(config)
    }

    /// Load configuration from a YAML file; missing fields fall back to
    /// their serde defaults
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&contents).context("Failed to parse configuration YAML")
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        if let Ok(bind) = std::env::var("KUBEDEPS_BIND") {
            if !bind.is_empty() {
                config.server.bind = bind;
            }
        }
        if let Ok(deadline) = std::env::var("KUBEDEPS_DEADLINE_MS") {
            match deadline.parse() {
                Ok(ms) => config.limits.deadline_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid KUBEDEPS_DEADLINE_MS: {}", deadline),
            }
        }
        if let Ok(max_crds) = std::env::var("KUBEDEPS_MAX_CRDS") {
            match max_crds.parse() {
                Ok(n) => config.limits.max_crds = n,
                Err(_) => tracing::warn!("Ignoring invalid KUBEDEPS_MAX_CRDS: {}", max_crds),
            }
        }
        config
    }
}
