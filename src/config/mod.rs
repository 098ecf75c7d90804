//! Project configuration document (`exwrap.json`).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Errors loading a configuration document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document could not be read
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON for this schema
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// `entry_point` missing or empty
    #[error("Entrypoint required.")]
    EmptyEntryPoint,

    /// The root directory cannot be resolved to an existing directory
    #[error("Failed to resolve root directory {}: {source}", .path.display())]
    Root {
        /// Configured root
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The build directory is the project root or one of its ancestors
    #[error(
        "Build directory {} contains the project root {}",
        .path.display(),
        .root.display()
    )]
    BuildDirectory {
        /// Resolved build directory
        path: PathBuf,
        /// Resolved project root
        root: PathBuf,
    },
}

/// Darwin-specific options.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DarwinConfig {
    /// User-supplied Info.plist template
    #[serde(rename = "plist")]
    pub plist_file: Option<String>,

    /// Produce an `.app` bundle instead of a self-installing executable
    pub create_app: bool,
}

/// Configuration document as written by the user.
///
/// Every field except `entry_point` is optional. Relative paths are
/// interpreted against the directory holding the document.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    /// Application root, defaults to the config file's directory
    pub root: String,

    /// Command started on launch, e.g. `["python", "app.py"]`
    pub entry_point: Vec<String>,

    /// Name of the produced executable, defaults to the root's base name
    pub target_name: String,

    /// Commands run before the payload is unpacked
    #[serde(rename = "pre_install_cmds")]
    pub pre_install_commands: Vec<String>,

    /// Commands run after installation completes
    #[serde(rename = "post_install_cmds")]
    pub post_install_commands: Vec<String>,

    /// OS the tool runs on
    pub source_os: String,

    /// Architecture the tool runs on
    pub source_arch: String,

    /// OS the executable is built for
    #[serde(rename = "os")]
    pub target_os: String,

    /// Architecture the executable is built for
    #[serde(rename = "arch")]
    pub target_arch: String,

    /// Source prefix => replacement prefix
    pub path_overrides: BTreeMap<String, String>,

    /// Source directory => destination prefix
    #[serde(rename = "extra_dirs")]
    pub extra_directories: BTreeMap<String, String>,

    /// Source file => destination path
    pub extra_files: BTreeMap<String, String>,

    /// Directories left out of the package
    #[serde(rename = "exclude_dirs")]
    pub exclude_directories: Vec<String>,

    /// Files left out of the package
    pub exclude_files: Vec<String>,

    /// Install location, absolute or relative to the platform install root
    pub install_path: String,

    /// Package-relative files that get the execute bit
    pub executables: Vec<String>,

    /// Icon path without extension
    pub icon: String,

    /// Darwin options
    #[serde(rename = "mac_os")]
    pub darwin: DarwinConfig,
}

impl ConfigDocument {
    /// Parses a document from JSON text.
    pub fn from_json(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let document: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if document.entry_point.is_empty() {
            return Err(ConfigError::EmptyEntryPoint);
        }

        Ok(document)
    }
}

/// Reads and validates the configuration document at `path`.
pub fn load(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ConfigDocument::from_json(path, &text)
}
