use crate::oracle::OracleReport;
use crate::serializer::Artifact;
use std::path::PathBuf;
use thiserror::Error;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library. Every
/// error is terminal for a run.
#[derive(Debug, Error)]
pub enum Error {
    /// Indicates invalid command-line usage or configuration. The message is
    /// meant to be shown to the user as is.
    #[error("{0}")]
    Argument(String),

    /// Indicates that a stored artifact could not be reconstructed.
    #[error("Corrupt key material in the {artifact}: {reason}")]
    KeyMaterialCorrupt {
        /// The artifact that failed to load.
        artifact: Artifact,
        /// The reason reported by the engine.
        reason: String,
    },

    /// Indicates that freshly generated keys failed the correctness check.
    #[error("Input Serialization Check Failed: {0}")]
    SerializationCheckFailed(OracleReport),

    /// Indicates that reloaded keys failed the correctness check.
    #[error("Output Serialization Check Failed: {0}")]
    DeserializationCheckFailed(OracleReport),

    /// Indicates that the encryption engine failed.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Indicates a filesystem error.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn engine<E: std::fmt::Display>(e: E) -> Self {
        Error::Engine(e.to_string())
    }

    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
