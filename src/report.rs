//! Report assembly from a resolved ledger.

use crate::ledger::VariableRecord;
use crate::resolver::Resolution;
use crate::types::Priority;
use serde::Serialize;
use std::path::Path;

/// Version label for configs that are not on a release branch.
pub const MAIN_VERSION: &str = "main/master";

/// One variable in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVarEntry {
    pub name: String,
    pub value: String,
    pub source: Priority,
    pub source_file: String,
    pub default_value: Option<String>,
    pub is_overridden: bool,
}

impl From<&VariableRecord> for EnvVarEntry {
    fn from(record: &VariableRecord) -> Self {
        Self {
            name: record.name.clone(),
            value: record.value.clone(),
            source: record.source_priority,
            source_file: record.source_id.clone(),
            default_value: record.default_value.clone(),
            is_overridden: record.is_overridden(),
        }
    }
}

/// A variable whose value diverged from its step default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideEntry {
    pub name: String,
    pub value: String,
    pub source: Priority,
    pub default_value: Option<String>,
}

/// Options applied when building a report.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Case-insensitive substring filter on variable names.
    pub filter: Option<String>,
    /// Keep only overridden variables in `env_vars`.
    pub overrides_only: bool,
}

impl ReportOptions {
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn overrides_only(mut self) -> Self {
        self.overrides_only = true;
        self
    }

    fn matches(&self, record: &VariableRecord) -> bool {
        if self.overrides_only && !record.is_overridden() {
            return false;
        }
        match self.filter {
            Some(ref filter) => record
                .name
                .to_lowercase()
                .contains(&filter.to_lowercase()),
            None => true,
        }
    }
}

/// Effective environment report for one job.
#[derive(Debug, Clone, Serialize)]
pub struct EnvReport {
    pub job_name: String,
    pub config_file: String,
    pub version: String,
    pub workflow: String,
    pub filter: Option<String>,
    /// Number of variables resolved, before filtering.
    pub total_count: usize,
    pub filtered_count: usize,
    pub env_vars: Vec<EnvVarEntry>,
    pub overrides: Vec<OverrideEntry>,
}

impl EnvReport {
    /// Build a report. `config_file` is the display path of the job config.
    pub fn build(resolution: &Resolution, config_file: &str, options: &ReportOptions) -> Self {
        let env_vars: Vec<EnvVarEntry> = resolution
            .ledger
            .iter()
            .filter(|record| options.matches(record))
            .map(EnvVarEntry::from)
            .collect();

        let overrides = env_vars
            .iter()
            .filter(|var| var.is_overridden)
            .map(|var| OverrideEntry {
                name: var.name.clone(),
                value: var.value.clone(),
                source: var.source,
                default_value: var.default_value.clone(),
            })
            .collect();

        Self {
            job_name: resolution.job_name.clone(),
            config_file: config_file.to_string(),
            version: release_version(&resolution.config_source),
            workflow: resolution.workflow.clone(),
            filter: options.filter.clone(),
            total_count: resolution.ledger.len(),
            filtered_count: env_vars.len(),
            env_vars,
            overrides,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Release version encoded in a config file name.
///
/// `org-repo-release-4.15__periodics.yaml` gives `4.15`; names without
/// `release-` give [`MAIN_VERSION`].
pub fn release_version(file_name: &str) -> String {
    let Some(rest) = file_name.split("release-").nth(1) else {
        return MAIN_VERSION.to_string();
    };
    let rest = rest.split(".yaml").next().unwrap_or(rest);
    rest.split("__").next().unwrap_or(rest).to_string()
}

/// Path shown in reports: relative to `repo_root` when beneath it.
pub fn display_path(path: &Path, repo_root: &Path) -> String {
    path.strip_prefix(repo_root)
        .unwrap_or(path)
        .display()
        .to_string()
}
