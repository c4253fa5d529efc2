//! ci-operator job configuration.
//!
//! Only the `tests` list is read. Each entry is a job identified by its `as`
//! name; a multi-stage job names its workflow in `steps.workflow` and may
//! override variables in `steps.env`.

use crate::error::{EnvError, EnvResult};
use crate::registry::{EnvEntry, from_yaml, scalar_text};
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
struct JobConfigDocument {
    #[serde(default)]
    tests: Option<Vec<TestEntry>>,
}

#[derive(Debug, Default, Deserialize)]
struct TestEntry {
    #[serde(default, rename = "as")]
    name: Option<String>,
    #[serde(default)]
    steps: Option<TestSteps>,
}

#[derive(Debug, Default, Deserialize)]
struct TestSteps {
    #[serde(default)]
    workflow: Option<String>,
    #[serde(default)]
    env: Option<Mapping>,
}

/// One job of a config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub workflow: Option<String>,
    /// Inline `steps.env` overrides, in declaration order.
    pub env: Vec<EnvEntry>,
}

/// Summary row for listing jobs.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub name: String,
    pub workflow: Option<String>,
    pub env_count: usize,
}

/// A parsed job config file.
#[derive(Debug, Clone)]
pub struct JobConfig {
    source_id: String,
    path: Option<PathBuf>,
    jobs: Vec<Job>,
}

impl JobConfig {
    /// Parse config text. `source_id` names the file in provenance and messages.
    pub fn from_yaml_str(content: &str, source_id: impl Into<String>) -> EnvResult<Self> {
        let source_id = source_id.into();
        let doc: JobConfigDocument = from_yaml(content, &source_id)?;

        let jobs = doc
            .tests
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| {
                let name = entry.name?;
                let steps = entry.steps.unwrap_or_default();
                let env = steps
                    .env
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(k, v)| EnvEntry::new(scalar_text(&k), scalar_text(&v)))
                    .collect();
                Some(Job {
                    name,
                    workflow: steps.workflow.filter(|w| !w.is_empty()),
                    env,
                })
            })
            .collect();

        Ok(Self {
            source_id,
            path: None,
            jobs,
        })
    }

    /// Read and parse a config file. The file name becomes the source id.
    pub fn from_file(path: &Path) -> EnvResult<Self> {
        if !path.is_file() {
            return Err(EnvError::config_not_found(path));
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| EnvError::io(path, e))?;
        let source_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut config = Self::from_yaml_str(&content, source_id).map_err(|e| e.with_path(path))?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Path the config was read from, if it came from disk.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// First job whose `as` equals `name`.
    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.name == name)
    }

    /// Workflow declared by a job, or `None` if the job is unknown or has none.
    pub fn workflow_name(&self, job_name: &str) -> Option<&str> {
        self.job(job_name).and_then(|job| job.workflow.as_deref())
    }

    /// Inline overrides of a job; empty if the job is unknown.
    pub fn inline_env(&self, job_name: &str) -> &[EnvEntry] {
        self.job(job_name).map(|job| job.env.as_slice()).unwrap_or(&[])
    }

    pub fn summaries(&self) -> Vec<JobSummary> {
        self.jobs
            .iter()
            .map(|job| JobSummary {
                name: job.name.clone(),
                workflow: job.workflow.clone(),
                env_count: job.env.len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
build_root:
  image_stream_tag:
    name: release
    namespace: openshift
tests:
- as: unit
  commands: make test
  container:
    from: src
- as: e2e-aws
  steps:
    cluster_profile: aws
    workflow: openshift-e2e-aws
    env:
      TEST_SUITE: openshift/conformance/serial
      COMPUTE_NODE_REPLICAS: 5
- as: e2e-gcp
  steps:
    workflow: openshift-e2e-gcp
- as: custom
  steps:
    test:
    - ref: my-step
- steps:
    workflow: nameless
"#;

    #[test]
    fn test_workflow_lookup() {
        let config = JobConfig::from_yaml_str(CONFIG, "org-repo-main.yaml").unwrap();
        assert_eq!(config.workflow_name("e2e-aws"), Some("openshift-e2e-aws"));
        assert_eq!(config.workflow_name("e2e-gcp"), Some("openshift-e2e-gcp"));
        assert_eq!(config.workflow_name("unit"), None);
        assert_eq!(config.workflow_name("custom"), None);
        assert_eq!(config.workflow_name("missing"), None);
        assert_eq!(config.jobs().len(), 4);
    }

    #[test]
    fn test_inline_env() {
        let config = JobConfig::from_yaml_str(CONFIG, "org-repo-main.yaml").unwrap();
        assert_eq!(
            config.inline_env("e2e-aws"),
            &[
                EnvEntry::new("TEST_SUITE", "openshift/conformance/serial"),
                EnvEntry::new("COMPUTE_NODE_REPLICAS", "5"),
            ]
        );
        assert!(config.inline_env("e2e-gcp").is_empty());
        assert!(config.inline_env("missing").is_empty());
    }

    #[test]
    fn test_empty_config() {
        let config = JobConfig::from_yaml_str("", "empty.yaml").unwrap();
        assert!(config.jobs().is_empty());
        let config = JobConfig::from_yaml_str("tests:\n", "null.yaml").unwrap();
        assert!(config.jobs().is_empty());
    }

    #[test]
    fn test_summaries() {
        let config = JobConfig::from_yaml_str(CONFIG, "org-repo-main.yaml").unwrap();
        let summaries = config.summaries();
        assert_eq!(summaries[1].name, "e2e-aws");
        assert_eq!(summaries[1].env_count, 2);
        assert_eq!(summaries[0].workflow, None);
    }

    #[test]
    fn test_from_file_missing() {
        let err = JobConfig::from_file(Path::new("/nonexistent/config.yaml")).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ConfigNotFound);
    }
}
