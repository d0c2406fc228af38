//! Error types for settings, rendering and export.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Notice shown whenever producing the PDF fails, whatever the cause.
pub const EXPORT_FAILED_NOTICE: &str = "Failed to generate PDF. Please try again.";

/// Failures of the external render-to-PDF step.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("could not start renderer `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("renderer `{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("renderer produced no output")]
    EmptyOutput,

    #[error("renderer scratch files: {0}")]
    Io(#[from] io::Error),
}

/// What the user gets told when an export does not produce a file.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Export was asked for while no invoice preview was open.
    #[error("Invoice element not found!")]
    MissingRenderTarget,

    #[error("PDF generation already in progress.")]
    Busy,

    #[error("{}", EXPORT_FAILED_NOTICE)]
    Render(#[source] tera::Error),

    #[error("{}", EXPORT_FAILED_NOTICE)]
    Backend(#[source] BackendError),

    #[error("{}", EXPORT_FAILED_NOTICE)]
    Write(#[source] io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}
