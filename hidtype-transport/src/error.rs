//! Sink error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing reports
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("Sync failed: {0}")]
    Sync(#[source] std::io::Error),
}
