//! Error types for build-time bundling operations.

use std::{fmt::Display, io, path::PathBuf};

/// Result type alias for bundler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving, bundling and assembling a package.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Free-form failure
    #[error("{0}")]
    GenericError(String),

    /// Failure with an operation description attached
    #[error("{context}: {source}")]
    Context {
        /// What was being done
        context: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
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

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload archive failure
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal failure
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Embedding collaborator failure
    #[error("embedding failed: {0}")]
    Embed(#[from] crate::embed::Error),

    /// Target pair missing from the support table or not first-class
    #[error("Unsupported Os/Arch combination: {os}/{arch}")]
    UnsupportedTarget {
        /// Requested OS
        os: String,
        /// Requested architecture
        arch: String,
    },

    /// Base wrapper executable for the target is not available
    #[error("Unsupported packaging combination {os}/{arch}. File {} cannot be located", .path.display())]
    MissingWrapper {
        /// Target OS
        os: String,
        /// Target architecture
        arch: String,
        /// Where the wrapper was expected
        path: PathBuf,
    },

    /// Configuration document rejected
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Template rendering failure
    #[error("template error: {0}")]
    Template(String),
}

impl Error {
    /// Whether this error rejects the build target rather than failing the build.
    pub fn is_unsupported_target(&self) -> bool {
        match self {
            Self::UnsupportedTarget { .. } | Self::MissingWrapper { .. } => true,
            Self::Context { source, .. } => source.is_unsupported_target(),
            _ => false,
        }
    }

    /// Whether this error comes from the configuration document.
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) => true,
            Self::Context { source, .. } => source.is_config(),
            _ => false,
        }
    }
}

/// Attaches an operation and a path to IO errors.
pub trait ErrorExt<T> {
    /// Wraps the error as [`Error::Fs`].
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

/// Adds a human readable description to errors and missing values.
pub trait Context<T> {
    /// Wraps the error (or `None`) with `context`.
    fn context<C: Display>(self, context: C) -> Result<T>;

    /// Like [`Context::context`], building the description lazily.
    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> Context<T> for std::result::Result<T, E> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::Context {
            context: context.to_string(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::Context {
            context: f().to_string(),
            source: Box::new(e.into()),
        })
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_context_names_operation_and_path() {
        let err = Err::<(), _>(io::Error::new(io::ErrorKind::NotFound, "gone"))
            .fs_context("creating build directory", "/tmp/build")
            .unwrap_err();
        assert_eq!(err.to_string(), "creating build directory /tmp/build: gone");
    }

    #[test]
    fn context_wraps_and_keeps_kind() {
        let err = Err::<(), _>(Error::UnsupportedTarget {
            os: "plan9".into(),
            arch: "386".into(),
        })
        .context("checking target")
        .unwrap_err();
        assert!(err.is_unsupported_target());
        assert_eq!(
            err.to_string(),
            "checking target: Unsupported Os/Arch combination: plan9/386"
        );
    }

    #[test]
    fn option_context_becomes_generic_error() {
        let err = None::<u8>.context("no file name").unwrap_err();
        assert!(matches!(err, Error::GenericError(msg) if msg == "no file name"));
    }
}
