//! Resolve subcommand for ci-env

use crate::format::OutputFormat;
use crate::report::ReportOptions;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the resolve subcommand
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Path to the ci-operator config YAML file
    #[arg(value_name = "CONFIG_FILE")]
    pub config_file: PathBuf,

    /// Job name (value of the "as" field)
    #[arg(value_name = "JOB_NAME")]
    pub job_name: String,

    /// Only show variables whose name contains this text (case insensitive)
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Output format: json or markdown (overrides config)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Only show variables whose value differs from the step default
    #[arg(long)]
    pub overrides_only: bool,
}

impl ResolveArgs {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            filter: self.filter.clone(),
            overrides_only: self.overrides_only,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_options() {
        let args = ResolveArgs {
            config_file: PathBuf::from("cfg.yaml"),
            job_name: "e2e".to_string(),
            filter: Some("AWS".to_string()),
            format: None,
            overrides_only: true,
        };
        let options = args.report_options();
        assert_eq!(options.filter.as_deref(), Some("AWS"));
        assert!(options.overrides_only);
    }
}
