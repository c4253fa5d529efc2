//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the configuration file in each tier directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Compiled-in defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/ci-env/)
    Project = 1,
    /// User-level config (~/.ci-env/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Paths for each configuration tier.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Explicit config file; replaces the file tiers when set
    pub explicit: Option<PathBuf>,
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        let explicit = std::env::var("CI_ENV_CONFIG_PATH").ok().map(PathBuf::from);

        // Project dir: CI_ENV_PROJECT_DIR or $CWD/ci-env
        let project_dir = std::env::var("CI_ENV_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("ci-env")));

        // User dir: CI_ENV_USER_DIR or ~/.ci-env
        let user_dir = std::env::var("CI_ENV_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".ci-env")));

        Self {
            explicit,
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            explicit: None,
            project_dir,
            user_dir,
        }
    }

    /// Use a single config file instead of the project and user tiers.
    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each tier
    pub paths: ConfigPaths,
    /// Loaded configuration
    config: Config,
    /// Config files that contributed, lowest tier first
    sources: Vec<(ConfigTier, PathBuf)>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::discover())
    }

    /// Load configuration with explicit paths, applying process environment overrides.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load configuration, reading environment overrides through `env`.
    pub fn load_with_env(paths: ConfigPaths, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut sources = Vec::new();

        let mut config = if let Some(ref explicit) = paths.explicit {
            let config = Config::load(explicit)
                .with_context(|| format!("Failed to load config file {}", explicit.display()))?;
            sources.push((ConfigTier::Project, explicit.clone()));
            config
        } else {
            let mut tiers: Vec<Value> = Vec::new();

            // Tier 1: Defaults
            tiers.push(serde_json::to_value(Config::default())?);

            // Tier 2: Project config
            if let Some(ref project_dir) = paths.project_dir {
                let file = project_dir.join(CONFIG_FILE_NAME);
                if let Some(value) = read_tier(&file) {
                    tiers.push(value);
                    sources.push((ConfigTier::Project, file));
                }
            }

            // Tier 3: User config
            if let Some(ref user_dir) = paths.user_dir {
                let file = user_dir.join(CONFIG_FILE_NAME);
                if let Some(value) = read_tier(&file) {
                    tiers.push(value);
                    sources.push((ConfigTier::User, file));
                }
            }

            serde_json::from_value(deep_merge_all(tiers)).context("Invalid merged configuration")?
        };

        // Tier 4: Environment variable overrides
        Self::apply_env_overrides(&mut config, env);

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
        if let Some(repo_root) = env("CI_ENV_REPO_ROOT") {
            config.registry.repo_root = Some(PathBuf::from(repo_root));
        }

        if let Some(registry_dir) = env("CI_ENV_REGISTRY_DIR") {
            config.registry.step_registry_dir = PathBuf::from(registry_dir);
        }

        if let Some(format) = env("CI_ENV_FORMAT") {
            match format.parse() {
                Ok(format) => config.output.format = format,
                Err(e) => warn!("Ignoring CI_ENV_FORMAT: {}", e),
            }
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[(ConfigTier, PathBuf)] {
        &self.sources
    }
}

/// Read one tier file. Missing files are skipped; unreadable ones are logged and skipped.
fn read_tier(file: &Path) -> Option<Value> {
    if !file.is_file() {
        return None;
    }
    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            warn!("Skipping config file {}: {}", file.display(), e);
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!("Loaded config tier {}", file.display());
            Some(value)
        }
        Err(e) => {
            warn!("Skipping malformed config file {}: {}", file.display(), e);
            None
        }
    }
}
