//! Error types for registry lookups and link switching.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that can go wrong while resolving or switching a configuration
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown client '{name}'")]
    UnknownClient { name: String },

    #[error("Unknown config type '{name}'")]
    UnknownConfigType { name: String },

    #[error("Client '{client}' does not support config type '{config_type}'")]
    UnsupportedCombination { client: String, config_type: String },

    #[error("Configuration '{config}' not found: {path:?} does not exist")]
    SourceNotFound { config: String, path: PathBuf },

    #[error("Failed to read active link {path:?}")]
    LinkRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Active link {path:?} points to {target:?}, which is not a recognised configuration")]
    UnresolvableName { path: PathBuf, target: PathBuf },

    #[error("Refusing to replace {path:?}: it exists and is not a symbolic link")]
    TargetConflict { path: PathBuf },

    #[error("Invalid configuration name '{name}'")]
    InvalidConfigName { name: String },

    #[error("Pattern '{pattern}' must contain exactly one '*' wildcard")]
    InvalidPattern { pattern: String },

    #[error("Duplicate {kind} '{name}' in registry")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{context}: {path:?}")]
    Filesystem {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn fs(context: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Filesystem {
            context,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
