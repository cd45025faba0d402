use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} {args:?} exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        args: Vec<String>,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{program} did not finish within {secs}s")]
    ToolTimeout { program: String, secs: u64 },

    #[error("cannot inspect {}: {reason}", path.display())]
    Probe { path: PathBuf, reason: String },

    #[error("no record for {0}")]
    RecordNotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("render failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attach an operation name and path to a raw I/O error.
pub trait IoContext<T> {
    fn io_context(self, op: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context(self, op: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            op,
            path: path.into(),
            source,
        })
    }
}

impl From<std::fmt::Error> for Error {
    fn from(_: std::fmt::Error) -> Self {
        Error::Render("could not format page".to_string())
    }
}

impl Error {
    /// True when the underlying cause is a missing file.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            Error::RecordNotFound(_) => true,
            _ => false,
        }
    }
}
