use std::path::PathBuf;

use thiserror::Error;

use crate::capability::CapabilityKind;

/// Structural configuration errors. Always fatal: no partial object graph
/// is ever executed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read spec file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed spec: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid {kind} type: {name}. Available types: {}", .valid.join(", "))]
    UnknownType {
        kind: CapabilityKind,
        name: String,
        valid: Vec<String>,
    },

    #[error("error creating {kind} '{name}': {source}")]
    Instantiate {
        kind: CapabilityKind,
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Probe precondition failures. Fatal to the single probe invocation that
/// raised them; the owning manager logs and moves on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("a probe must be bound to one or two nodes, got {0}")]
    NodeArity(usize),

    #[error("a probe with two nodes must specify a network interface")]
    MissingInterface,
}
