//! Structured error types for resolution and registry access.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Recoverable per-job outcome
    NoWorkflow,

    // Not found errors
    ConfigNotFound,

    // Document errors
    InvalidDocument,
    IoError,

    // Internal errors
    InternalError,
}

/// Structured error returned by the library.
#[derive(Debug, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct EnvError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl EnvError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            job: None,
            path: None,
            details: None,
        }
    }

    pub fn with_job(mut self, job: impl Into<String>) -> Self {
        self.job = Some(job.into());
        self
    }

    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.display().to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Whether the caller may skip this job and carry on with others.
    pub fn is_recoverable(&self) -> bool {
        self.code == ErrorCode::NoWorkflow
    }

    // Convenience constructors

    pub fn no_workflow(job: &str, source: &str) -> Self {
        Self::new(
            ErrorCode::NoWorkflow,
            format!("Job '{}' in {} has no workflow", job, source),
        )
        .with_job(job)
    }

    pub fn config_not_found(path: &Path) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Config file not found: {}", path.display()),
        )
        .with_path(path)
    }

    pub fn invalid_document(source: &str, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidDocument,
            format!("Failed to parse {}", source),
        )
        .with_details(err.to_string())
    }

    pub fn io(path: &Path, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::IoError,
            format!("Failed to read {}", path.display()),
        )
        .with_path(path)
        .with_details(err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for EnvError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<EnvError>() {
            Ok(env_err) => env_err,
            Err(err) => EnvError::internal(err),
        }
    }
}

/// Result type for library operations.
pub type EnvResult<T> = std::result::Result<T, EnvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_workflow_is_recoverable() {
        let err = EnvError::no_workflow("e2e-aws", "org-repo-main.yaml");
        assert!(err.is_recoverable());
        assert_eq!(err.job.as_deref(), Some("e2e-aws"));
        assert_eq!(
            err.to_string(),
            "Job 'e2e-aws' in org-repo-main.yaml has no workflow"
        );
    }

    #[test]
    fn test_invalid_document_is_not_recoverable() {
        let err = EnvError::invalid_document("foo-ref.yaml", "bad indentation");
        assert!(!err.is_recoverable());
        assert_eq!(err.details.as_deref(), Some("bad indentation"));
    }

    #[test]
    fn test_serializes_code() {
        let err = EnvError::config_not_found(Path::new("missing.yaml"));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], "CONFIG_NOT_FOUND");
        assert_eq!(value["path"], "missing.yaml");
        assert!(value.get("job").is_none());
    }

    #[test]
    fn test_anyhow_roundtrip_keeps_code() {
        let err: anyhow::Error = EnvError::no_workflow("unit", "cfg.yaml").into();
        let back = EnvError::from(err);
        assert_eq!(back.code, ErrorCode::NoWorkflow);
    }
}
