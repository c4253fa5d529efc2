//! ci-env
//!
//! Resolves the effective environment of ci-operator jobs from the step
//! registry and the job's config file.

use anyhow::{Context, Result};
use ci_effective_env::cli::jobs::JobsArgs;
use ci_effective_env::cli::resolve::ResolveArgs;
use ci_effective_env::cli::{Cli, Command};
use ci_effective_env::config::{Config, ConfigLoader, ConfigPaths};
use ci_effective_env::error::ErrorCode;
use ci_effective_env::format::{OutputFormat, format_jobs_markdown, format_report_markdown};
use ci_effective_env::logging::{self, LogTarget};
use ci_effective_env::report::{self, EnvReport};
use ci_effective_env::{FsRegistry, JobConfig, Resolver};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut paths = ConfigPaths::discover();
    if let Some(ref config_path) = cli.config {
        paths = paths.with_explicit(config_path);
    }
    let mut loader = ConfigLoader::load_with_paths(paths)?;
    for (tier, path) in loader.sources() {
        debug!(tier = %tier, path = %path.display(), "Using config file");
    }

    // Override from CLI arguments
    let config = loader.config_mut();
    if let Some(repo_root) = cli.repo_root {
        config.registry.repo_root = Some(repo_root);
    }

    match cli.command {
        Command::Resolve(args) => run_resolve(config, args),
        Command::Jobs(args) => run_jobs(config, args),
    }
}

/// Load a job config, printing a user-facing error when the file is missing.
fn load_job_config(path: &Path) -> Result<Option<JobConfig>> {
    let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    match JobConfig::from_file(&path) {
        Ok(config) => Ok(Some(config)),
        Err(e) if e.code == ErrorCode::ConfigNotFound => {
            eprintln!("Error: {}", e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Repo root: configured, else discovered above the job config, else above the cwd.
fn repo_root_for(config: &Config, job_config: &JobConfig) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let root = job_config
        .path()
        .and_then(Path::parent)
        .filter(|_| config.registry.repo_root.is_none())
        .and_then(|dir| config.registry.find_repo_root(dir))
        .unwrap_or_else(|| config.registry.effective_repo_root(&cwd));
    Ok(std::fs::canonicalize(&root).unwrap_or(root))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

/// Run the resolve command
fn run_resolve(config: &Config, args: ResolveArgs) -> Result<ExitCode> {
    let Some(job_config) = load_job_config(&args.config_file)? else {
        return Ok(ExitCode::FAILURE);
    };

    let repo_root = repo_root_for(config, &job_config)?;
    let registry_dir = config.registry.step_registry_path(&repo_root);
    debug!(
        repo_root = %repo_root.display(),
        registry = %registry_dir.display(),
        "Opening step registry"
    );
    let registry = FsRegistry::open(&registry_dir)?;

    let resolver = Resolver::new(&registry);
    let resolution = match resolver.resolve(&job_config, &args.job_name) {
        Ok(resolution) => resolution,
        Err(e) if e.is_recoverable() => {
            eprintln!("Warning: {}", e);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    let config_file = job_config
        .path()
        .map(|path| report::display_path(path, &repo_root))
        .unwrap_or_else(|| job_config.source_id().to_string());
    let report = EnvReport::build(&resolution, &config_file, &args.report_options());

    match args.format.unwrap_or(config.output.format) {
        OutputFormat::Json => print_json(&report, config.output.pretty)?,
        OutputFormat::Markdown => print!("{}", format_report_markdown(&report)),
    }

    Ok(ExitCode::SUCCESS)
}

/// Run the jobs command
fn run_jobs(config: &Config, args: JobsArgs) -> Result<ExitCode> {
    let Some(job_config) = load_job_config(&args.config_file)? else {
        return Ok(ExitCode::FAILURE);
    };

    let summaries = job_config.summaries();
    match args.format.unwrap_or(config.output.format) {
        OutputFormat::Json => print_json(&summaries, config.output.pretty)?,
        OutputFormat::Markdown => print!(
            "{}",
            format_jobs_markdown(job_config.source_id(), &summaries)
        ),
    }

    Ok(ExitCode::SUCCESS)
}
