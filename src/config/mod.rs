//! Tool configuration.
//!
//! Consolidates configuration from four tiers with field-by-field YAML merging:
//! 1. **Defaults** - Compiled in
//! 2. **Project** - `$CWD/ci-env/config.yaml`
//! 3. **User** - `~/.ci-env/config.yaml`
//! 4. **Environment** - variables listed below
//!
//! An explicit file (`--config` or `CI_ENV_CONFIG_PATH`) replaces tiers 1-3.
//!
//! ## Environment Variables
//! - `CI_ENV_CONFIG_PATH` - Explicit config file
//! - `CI_ENV_PROJECT_DIR` - Project config dir (default: `./ci-env`)
//! - `CI_ENV_USER_DIR` - User config dir (default: `~/.ci-env`)
//! - `CI_ENV_REPO_ROOT` - Release repository root
//! - `CI_ENV_REGISTRY_DIR` - Step registry dir, relative to the repo root
//! - `CI_ENV_FORMAT` - Default output format (`json` or `markdown`)

mod loader;
mod merge;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
