//! Effective environment resolution for ci-operator jobs.
//!
//! This module exports the core components for the CLI, testing and integration.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod job;
pub mod ledger;
pub mod logging;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod types;

pub use error::{EnvError, EnvResult, ErrorCode};
pub use job::JobConfig;
pub use ledger::{Ledger, VariableRecord};
pub use registry::{Component, FsRegistry, MemoryRegistry, Registry};
pub use report::{EnvReport, ReportOptions};
pub use resolver::{Resolution, ResolveContext, Resolver};
pub use types::{ComponentKind, Phase, Priority};
