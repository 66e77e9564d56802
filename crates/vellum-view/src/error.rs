//! Error types for the view layer.

use std::path::PathBuf;

use thiserror::Error;
use vellum_core::LogKind;

/// Failures inside the coordinator. `GraphView` reports these as `false`/`None`.
#[derive(Error, Debug)]
pub enum ViewError {
    /// A session of this kind is already running.
    #[error("{} session is already running", .0.as_str())]
    SessionRunning(LogKind),

    /// No session of this kind is running.
    #[error("{} session is not running", .0.as_str())]
    SessionNotRunning(LogKind),

    /// The engine refused an operation.
    #[error("engine rejected {0}")]
    EngineRejected(&'static str),

    /// Session directory could not be reset.
    #[error("failed to prepare directory {path}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
