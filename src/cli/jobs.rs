//! Jobs subcommand for ci-env

use crate::format::OutputFormat;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the jobs subcommand
#[derive(Args, Debug)]
pub struct JobsArgs {
    /// Path to the ci-operator config YAML file
    #[arg(value_name = "CONFIG_FILE")]
    pub config_file: PathBuf,

    /// Output format: json or markdown (overrides config)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,
}
