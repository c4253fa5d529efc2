//! Logging setup for the CLI.
//!
//! Reports go to stdout, so logs default to stderr. The `--log` option picks
//! the target; `RUST_LOG` takes precedence over `--verbose` when set.

use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Where log output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stdout,
    Stderr,
    /// Append to a file, without ANSI colors.
    File(PathBuf),
}

impl LogTarget {
    /// Parse `0/off`, `1/stdout`, `2/stderr`, or a filename.
    pub fn parse(value: &str) -> Self {
        match value {
            "0" | "off" => LogTarget::Off,
            "1" | "stdout" => LogTarget::Stdout,
            "2" | "stderr" => LogTarget::Stderr,
            filename => LogTarget::File(PathBuf::from(filename)),
        }
    }
}

/// Default level when `RUST_LOG` is not set.
pub fn default_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::INFO }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(default_level(verbose)).into())
    })
}

/// Install the global tracing subscriber.
pub fn init(target: &LogTarget, verbose: bool) -> Result<()> {
    match target {
        LogTarget::Off => {}
        LogTarget::Stdout => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter(verbose))
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::Stderr => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter(verbose))
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(env_filter(verbose))
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_target() {
        assert_eq!(LogTarget::parse("0"), LogTarget::Off);
        assert_eq!(LogTarget::parse("off"), LogTarget::Off);
        assert_eq!(LogTarget::parse("1"), LogTarget::Stdout);
        assert_eq!(LogTarget::parse("stdout"), LogTarget::Stdout);
        assert_eq!(LogTarget::parse("2"), LogTarget::Stderr);
        assert_eq!(LogTarget::parse("stderr"), LogTarget::Stderr);
        assert_eq!(
            LogTarget::parse("ci-env.log"),
            LogTarget::File(PathBuf::from("ci-env.log"))
        );
    }

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true), Level::DEBUG);
        assert_eq!(default_level(false), Level::INFO);
    }
}
