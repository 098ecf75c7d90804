//! Top-level error type for both binaries.
//!
//! Each failure class maps to a distinct process exit code so scripts can
//! tell configuration mistakes from damaged executables.

use crate::{bundler, config::ConfigError, runtime};
use thiserror::Error;

/// Result type alias for top-level operations
pub type Result<T> = std::result::Result<T, ExwrapError>;

/// Exit code for configuration errors.
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for unsupported targets and missing wrappers.
pub const EXIT_UNSUPPORTED_TARGET: i32 = 3;
/// Exit code for build-time I/O failures.
pub const EXIT_IO: i32 = 4;
/// Exit code for a damaged executable.
pub const EXIT_DAMAGED: i32 = 5;
/// Exit code when the running executable cannot be read.
pub const EXIT_FAILED_EXECUTABLE: i32 = 6;
/// Exit code for a failing pre- or post-install command.
pub const EXIT_INSTALL_COMMAND: i32 = 7;
/// Exit code for a missing entry point, and for launches without a child code.
pub const EXIT_MISSING_ENTRYPOINT: i32 = 8;

/// Main error type for all exwrap operations
#[derive(Error, Debug)]
pub enum ExwrapError {
    /// Configuration file errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Build errors
    #[error(transparent)]
    Bundler(#[from] bundler::Error),

    /// Install and launch errors
    #[error(transparent)]
    Runtime(#[from] runtime::Error),
}

impl ExwrapError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => EXIT_CONFIG,
            Self::Bundler(e) if e.is_config() => EXIT_CONFIG,
            Self::Bundler(e) if e.is_unsupported_target() => EXIT_UNSUPPORTED_TARGET,
            Self::Bundler(_) => EXIT_IO,
            Self::Runtime(e) => match e {
                runtime::Error::Damaged(_) => EXIT_DAMAGED,
                runtime::Error::FailedExecutable(_) => EXIT_FAILED_EXECUTABLE,
                runtime::Error::InstallCommand { .. } => EXIT_INSTALL_COMMAND,
                runtime::Error::MissingEntrypoint => EXIT_MISSING_ENTRYPOINT,
                runtime::Error::Launch { code, .. } => match code {
                    Some(code) if *code != 0 => *code,
                    _ => EXIT_MISSING_ENTRYPOINT,
                },
                runtime::Error::Fs { .. } => EXIT_IO,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn exit_codes_by_failure_class() {
        let config: ExwrapError = ConfigError::EmptyEntryPoint.into();
        assert_eq!(config.exit_code(), EXIT_CONFIG);
        assert_eq!(config.to_string(), "Entrypoint required.");

        let wrapped: ExwrapError = bundler::Error::from(ConfigError::EmptyEntryPoint).into();
        assert_eq!(wrapped.exit_code(), EXIT_CONFIG);

        let unsupported: ExwrapError = bundler::Error::UnsupportedTarget {
            os: "plan9".into(),
            arch: "amd64".into(),
        }
        .into();
        assert_eq!(unsupported.exit_code(), EXIT_UNSUPPORTED_TARGET);

        let io: ExwrapError = bundler::Error::GenericError("disk full".into()).into();
        assert_eq!(io.exit_code(), EXIT_IO);

        let damaged: ExwrapError = runtime::Error::Damaged("bad".into()).into();
        assert_eq!(damaged.exit_code(), EXIT_DAMAGED);
        assert_eq!(damaged.to_string(), "Damaged executable: bad");

        let missing: ExwrapError = runtime::Error::MissingEntrypoint.into();
        assert_eq!(missing.exit_code(), EXIT_MISSING_ENTRYPOINT);
    }

    #[test]
    fn launch_failure_uses_child_exit_code() {
        let failed = |code| -> ExwrapError {
            runtime::Error::Launch {
                program: PathBuf::from("/opt/app/run"),
                code,
                reason: "exit status".into(),
            }
            .into()
        };
        assert_eq!(failed(Some(42)).exit_code(), 42);
        assert_eq!(failed(None).exit_code(), EXIT_MISSING_ENTRYPOINT);
    }
}
