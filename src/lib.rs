#![deny(rust_2018_idioms)]

pub mod config;
pub mod hosts;
pub mod tput;
pub mod util;

// Re-export the types callers touch the most.
pub use config::GeneratedConfig;
pub use hosts::{Host, Region};

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while loading a host registry, generating
/// configs or aggregating measurements. All variants are fatal to the
/// invocation they occur in: this is local, deterministic computation, so
/// there is no retry path and no partial output.
#[derive(Debug, Error, PartialEq)]
pub enum ExpError {
    #[error("malformed host name '{0}': trailing segment is not an integer")]
    MalformedHostName(String),
    #[error("duplicate host name '{0}' in registry")]
    DuplicateHostName(String),
    #[error("host registry must be a JSON object mapping host name to host info")]
    MalformedRegistry,
    #[error("host '{0}' has no 'hostname' field")]
    MissingHostname(String),
    #[error("base config has no 'benchmark' section")]
    MissingBenchmarkSection,
    #[error("region ids do not match the host grouping")]
    InconsistentTopology,
    #[error("host registry produced no regions")]
    EmptyRegionSet,
    #[error("'{0}' is not a recognized boolean token")]
    InvalidBool(String),
    #[error("could not read {path:?}: {reason}")]
    InputUnreadable { path: PathBuf, reason: String },
}
