//! Error types for install and launch.

use std::{io, path::PathBuf};

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the installer/launcher.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Embedded control documents or payload cannot be read or parsed
    #[error("Damaged executable: {0}")]
    Damaged(String),

    /// The running executable cannot be located or read
    #[error("Failed executable: {0}")]
    FailedExecutable(String),

    /// A pre- or post-install command failed
    #[error("Install command `{command}` failed: {reason}")]
    InstallCommand {
        /// Command line as configured
        command: String,
        /// Exit status or spawn error
        reason: String,
    },

    /// No persisted launch script, or an empty one
    #[error("Missing entrypoint.")]
    MissingEntrypoint,

    /// The entry point could not be started or exited unsuccessfully
    #[error("Launching {} failed: {reason}", .program.display())]
    Launch {
        /// Resolved program path
        program: PathBuf,
        /// Exit code of the child, if it exited normally
        code: Option<i32>,
        /// Exit status or spawn error
        reason: String,
    },

    /// File system failure on a known path
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        #[source]
        error: io::Error,
    },
}

impl From<crate::embed::Error> for Error {
    fn from(error: crate::embed::Error) -> Self {
        use crate::embed::Error as EmbedError;

        match error {
            EmbedError::Io { .. } => Self::FailedExecutable(error.to_string()),
            EmbedError::Write {
                context,
                path,
                source,
            } => Self::Fs {
                context,
                path,
                error: source,
            },
            EmbedError::OutputExists(path) => Self::Fs {
                context: "replacing",
                path,
                error: io::Error::from(io::ErrorKind::AlreadyExists),
            },
            other => Self::Damaged(other.to_string()),
        }
    }
}

/// Attaches an operation and a path to IO errors.
pub(crate) trait ErrorExt<T> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::Error as EmbedError;

    #[test]
    fn embed_errors_split_by_side() {
        let read: Error = EmbedError::Io {
            context: "open",
            path: PathBuf::from("/opt/app/setup"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        }
        .into();
        assert!(matches!(read, Error::FailedExecutable(_)));

        let written: Error = EmbedError::Write {
            context: "create",
            path: PathBuf::from("/home/user/App/app"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        }
        .into();
        assert!(
            matches!(written, Error::Fs { ref path, .. } if path == &PathBuf::from("/home/user/App/app"))
        );

        let corrupt: Error = EmbedError::Corrupt {
            path: PathBuf::from("/opt/app/setup"),
            reason: "bad magic".into(),
        }
        .into();
        assert!(matches!(corrupt, Error::Damaged(_)));
    }
}
