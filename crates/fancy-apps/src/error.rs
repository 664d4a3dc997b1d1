//! Error types for fancy-apps

use std::path::PathBuf;

/// A desktop file id could not be turned into an application description.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no desktop file found for {0}")]
    NotFound(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0} has no [Desktop Entry] group")]
    MissingGroup(PathBuf),

    #[error("{0} is not an application")]
    NotApplication(PathBuf),

    #[error("{path} is missing required key {key}")]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("{0} is marked hidden")]
    Hidden(PathBuf),
}

/// The menu description itself could not be read.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("no menu file found")]
    NotFound,

    #[error("cannot read menu file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("XML error in {path} at byte {position}: {source}")]
    Xml {
        path: PathBuf,
        position: usize,
        source: quick_xml::Error,
    },

    #[error("invalid menu file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

/// Starting a program failed.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("empty command line")]
    EmptyCommand,

    #[error("cannot start {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("unknown action {0}")]
    UnknownAction(String),
}

impl LaunchError {
    /// The command that was attempted, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            LaunchError::Spawn { command, .. } => Some(command),
            _ => None,
        }
    }
}
