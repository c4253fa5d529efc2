//! CLI command definitions for ci-env
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod jobs;
pub mod resolve;

use clap::{Parser, Subcommand};
use jobs::JobsArgs;
use resolve::ResolveArgs;
use std::path::PathBuf;

/// Effective environment resolver for ci-operator jobs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Release repository root (overrides config)
    #[arg(long, global = true)]
    pub repo_root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the effective environment of one job
    Resolve(ResolveArgs),

    /// List the jobs of a config file and their workflows
    Jobs(JobsArgs),
}
