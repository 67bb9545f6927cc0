use std::path::PathBuf;
use thiserror::Error;

/// Publishing error types
#[derive(Error, Debug)]
pub enum PublishError {
    /// Operator input rejected by a question validator
    #[error("{0}")]
    Validation(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("No space left on device for {path}")]
    DiskFull { path: PathBuf },

    #[error("Failed to copy {src} to {dst}")]
    CopyFailed {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory: {path}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write archive {path}")]
    ArchiveFailed {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to read catalog {path}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write catalog {path}")]
    CatalogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalog JSON: {0}")]
    CatalogParse(#[from] serde_json::Error),

    #[error("`{command}` failed with exit code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Failed to run `{command}`")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Publishing cancelled: uncommitted changes must be committed or stashed first")]
    Aborted,

    #[error("Publishing interrupted")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    /// Map an IO error to `DiskFull` when it is ENOSPC, otherwise wrap it with `fallback`
    pub(crate) fn from_io(
        e: std::io::Error,
        path: &std::path::Path,
        fallback: impl FnOnce(std::io::Error) -> PublishError,
    ) -> PublishError {
        // ENOSPC on Unix
        if e.raw_os_error() == Some(28) {
            return PublishError::DiskFull {
                path: path.to_path_buf(),
            };
        }
        fallback(e)
    }
}
