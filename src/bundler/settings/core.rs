//! Core Settings struct and implementations.

use super::{DarwinSettings, PlatformProfile, Target};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Normalized build intent, constructed via [`SettingsBuilder`](super::SettingsBuilder).
///
/// Every path in the mapping and exclusion tables is absolute. The value is
/// immutable once built and threaded explicitly through the build pipeline.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Absolute application root.
    pub(super) root: PathBuf,

    /// Program and arguments started on launch.
    pub(super) entry_point: Vec<String>,

    /// Name of the produced executable.
    pub(super) target_name: String,

    /// Platform the tool runs on.
    pub(super) source: Target,

    /// Platform the executable is built for.
    pub(super) target: Target,

    /// Install location, absolute or relative to the install root.
    pub(super) install_path: String,

    /// Absolute icon path without extension.
    pub(super) icon: Option<PathBuf>,

    pub(super) pre_install_commands: Vec<String>,
    pub(super) post_install_commands: Vec<String>,

    /// Package-relative files that get the execute bit.
    pub(super) executables: Vec<String>,

    /// Absolute source prefix => replacement prefix.
    pub(super) path_overrides: BTreeMap<PathBuf, String>,

    /// Absolute source directory => destination prefix.
    pub(super) extra_directories: BTreeMap<PathBuf, String>,

    /// Absolute source file => destination path.
    pub(super) extra_files: BTreeMap<PathBuf, String>,

    pub(super) exclude_directories: Vec<PathBuf>,
    pub(super) exclude_files: Vec<PathBuf>,

    /// Darwin bundle options.
    pub(super) darwin: DarwinSettings,

    /// Build output directory (absolute).
    pub(super) build_directory: PathBuf,

    /// Directory holding the per-platform base wrappers.
    pub(super) pkg_directory: PathBuf,
}

impl Settings {
    /// Returns the application root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the entry point command.
    pub fn entry_point(&self) -> &[String] {
        &self.entry_point
    }

    /// Returns the name of the produced executable.
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Returns the platform the tool runs on.
    pub fn source(&self) -> Target {
        self.source
    }

    /// Returns the platform the executable is built for.
    pub fn target(&self) -> Target {
        self.target
    }

    /// Conventions of the target OS.
    pub fn profile(&self) -> PlatformProfile {
        PlatformProfile::for_os(self.target.os)
    }

    /// Returns the configured install path.
    pub fn install_path(&self) -> &str {
        &self.install_path
    }

    /// Icon file for the target OS, if an icon is configured.
    pub fn icon_file(&self) -> Option<PathBuf> {
        let icon = self.icon.as_ref()?;
        let extension = self.profile().icon_extension()?;
        Some(icon.with_extension(extension))
    }

    /// Returns the pre-install commands.
    pub fn pre_install_commands(&self) -> &[String] {
        &self.pre_install_commands
    }

    /// Returns the post-install commands.
    pub fn post_install_commands(&self) -> &[String] {
        &self.post_install_commands
    }

    /// Returns the files that get the execute bit.
    pub fn executables(&self) -> &[String] {
        &self.executables
    }

    pub fn path_overrides(&self) -> &BTreeMap<PathBuf, String> {
        &self.path_overrides
    }

    pub fn extra_directories(&self) -> &BTreeMap<PathBuf, String> {
        &self.extra_directories
    }

    pub fn extra_files(&self) -> &BTreeMap<PathBuf, String> {
        &self.extra_files
    }

    pub fn exclude_directories(&self) -> &[PathBuf] {
        &self.exclude_directories
    }

    pub fn exclude_files(&self) -> &[PathBuf] {
        &self.exclude_files
    }

    /// Returns the Darwin bundle options.
    pub fn darwin(&self) -> &DarwinSettings {
        &self.darwin
    }

    /// Whether the build produces a native application bundle.
    pub fn creates_app_bundle(&self) -> bool {
        self.profile().native_bundle && self.darwin.create_app
    }

    /// Returns the build output directory.
    pub fn build_directory(&self) -> &Path {
        &self.build_directory
    }

    /// Path of the base wrapper for the target platform.
    ///
    /// Windows wrappers carry the `.exe` suffix: `wrapper-windows-amd64.exe`.
    pub fn wrapper_path(&self) -> PathBuf {
        let name = format!("wrapper-{}-{}", self.target.os, self.target.arch);
        self.pkg_directory
            .join(self.profile().executable_name(&name))
    }
}
