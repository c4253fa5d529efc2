//! Output formatting utilities for markdown and JSON.

use crate::job::JobSummary;
use crate::report::EnvReport;
use serde::{Deserialize, Serialize};

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!(
                "Invalid format '{}'. Valid options: json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Escape a value for use inside a markdown table cell.
fn cell(value: &str) -> String {
    if value.is_empty() {
        return "_(empty)_".to_string();
    }
    format!("`{}`", value.replace('|', "\\|").replace('\n', " "))
}

/// Format a report as markdown.
pub fn format_report_markdown(report: &EnvReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Effective environment: {}\n", report.job_name));
    md.push_str(&format!("- **config**: `{}`\n", report.config_file));
    md.push_str(&format!("- **version**: {}\n", report.version));
    md.push_str(&format!("- **workflow**: `{}`\n", report.workflow));
    if let Some(ref filter) = report.filter {
        md.push_str(&format!("- **filter**: `{}`\n", filter));
    }
    md.push_str(&format!(
        "- **variables**: {} of {}\n",
        report.filtered_count, report.total_count
    ));

    md.push_str("\n## Variables\n\n");
    if report.env_vars.is_empty() {
        md.push_str("_No variables._\n");
    } else {
        md.push_str("| Name | Value | Source | File | Default |\n");
        md.push_str("|------|-------|--------|------|---------|\n");
        for var in &report.env_vars {
            let marker = if var.is_overridden { " *" } else { "" };
            md.push_str(&format!(
                "| {}{} | {} | {} | {} | {} |\n",
                var.name,
                marker,
                cell(&var.value),
                var.source,
                var.source_file,
                var.default_value.as_deref().map(cell).unwrap_or_default(),
            ));
        }
    }

    if !report.overrides.is_empty() {
        md.push_str(&format!("\n## Overrides ({})\n\n", report.overrides.len()));
        for o in &report.overrides {
            md.push_str(&format!(
                "- **{}**: {} (from {}, default {})\n",
                o.name,
                cell(&o.value),
                o.source,
                o.default_value.as_deref().map(cell).unwrap_or_default(),
            ));
        }
    }

    md
}

/// Format a job listing as markdown.
pub fn format_jobs_markdown(config_file: &str, jobs: &[JobSummary]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Jobs in {} ({})\n\n", config_file, jobs.len()));
    for job in jobs {
        match job.workflow {
            Some(ref workflow) => md.push_str(&format!(
                "- **{}**: workflow `{}`, {} override(s)\n",
                job.name, workflow, job.env_count
            )),
            None => md.push_str(&format!("- **{}**: -\n", job.name)),
        }
    }

    md
}
