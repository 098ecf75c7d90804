//! Bundle layouts.
//!
//! - [`installer`] - flat archive embedded into a self-installing executable
//! - [`macos`] - native `.app` bundle

pub mod installer;
pub mod macos;

use std::fmt;
use std::path::PathBuf;

/// Shape of the produced artifact.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Layout {
    /// Single executable carrying the archive and control documents
    Installer,
    /// Directory bundle launched in place
    AppBundle,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installer => f.write_str("installer"),
            Self::AppBundle => f.write_str("app bundle"),
        }
    }
}

/// Result of one build.
#[derive(Clone, Debug)]
pub struct BuiltArtifact {
    /// Layout that produced the artifact
    pub layout: Layout,
    /// Executable file or bundle directory
    pub path: PathBuf,
    /// Size in bytes (sum of all files for a bundle)
    pub size: u64,
    /// Hex-encoded SHA-256
    pub checksum: String,
}
