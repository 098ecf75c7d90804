//! Names shared between the build tool and the wrapper runtime.

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "exwrap.json";

/// Build directory used when `--dir` is not given.
pub const DEFAULT_BUILD_DIRECTORY: &str = "build";

/// Directory beside the `exwrap` executable holding the base wrappers.
pub const DEFAULT_PKG_DIRECTORY: &str = "pkg";

/// Environment variable overriding the base wrapper directory.
pub const PKG_DIRECTORY_ENV: &str = "EXWRAP_PKG_DIR";

/// Scratch archive written into the build directory for the flat layout.
pub const APP_ARCHIVE_NAME: &str = "app.zip";

/// Attachment holding the application archive.
pub const EMBEDDED_ARCHIVE: &str = "archive";

/// Attachment holding the setup descriptor.
pub const EMBEDDED_SETUP_SCRIPT: &str = "setup";

/// Attachment holding the launch descriptor.
pub const EMBEDDED_LAUNCH_SCRIPT: &str = "launch";

/// Extension of the persisted launch script.
pub const LAUNCH_SCRIPT_EXTENSION: &str = "launch";

/// Zero-byte file placed next to the executable inside a native bundle.
pub const APP_BUNDLE_MARKER: &str = ".exwrap-app";

/// File name the archive attachment is extracted to during install.
pub const EXTRACTED_ARCHIVE_NAME: &str = "app.zip";

/// Scratch extraction directory prefix on Unix-like systems.
pub const TMP_EXTRACT_DIR: &str = ".exwraptmp";

/// Scratch extraction directory prefix on Windows.
///
/// Differs from the Unix name so the running installer never holds a lock
/// on a path it is about to delete.
pub const WIN_TMP_EXTRACT_DIR: &str = "~exwraptmp";

/// Scratch setup descriptor written into the build directory.
pub const SETUP_SCRIPT_FILE: &str = "setup.json";

/// Scratch launch descriptor written into the build directory.
pub const LAUNCH_SCRIPT_FILE: &str = "launch.json";
