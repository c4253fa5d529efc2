//! Configuration types and structures.

use crate::format::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the step registry relative to the repo root.
pub const DEFAULT_STEP_REGISTRY_DIR: &str = "ci-operator/step-registry";

/// Tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Where to find the release repository and its step registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Release repository root. Discovered from the working directory when unset.
    #[serde(default)]
    pub repo_root: Option<PathBuf>,

    /// Step registry directory, relative to the repo root unless absolute.
    #[serde(default = "default_step_registry_dir")]
    pub step_registry_dir: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            repo_root: None,
            step_registry_dir: default_step_registry_dir(),
        }
    }
}

fn default_step_registry_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STEP_REGISTRY_DIR)
}

impl RegistryConfig {
    /// Repo root to use: the configured one, else the nearest ancestor of
    /// `start` containing the step registry, else `start` itself.
    pub fn effective_repo_root(&self, start: &Path) -> PathBuf {
        if let Some(ref root) = self.repo_root {
            return root.clone();
        }

        self.find_repo_root(start).unwrap_or_else(|| start.to_path_buf())
    }

    /// Nearest ancestor of `start` (inclusive) that contains the step registry.
    pub fn find_repo_root(&self, start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(&self.step_registry_dir).is_dir())
            .map(Path::to_path_buf)
    }

    /// Absolute step registry directory under `repo_root`.
    pub fn step_registry_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.step_registry_dir)
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format (json or markdown).
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            pretty: default_pretty(),
        }
    }
}

fn default_pretty() -> bool {
    true
}

impl Config {
    /// Load configuration from a single file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
