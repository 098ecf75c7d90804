//! Builder for constructing Settings.

use super::{DarwinSettings, Settings, Target};
use crate::bundler::error::{Error, Result};
use crate::config::{ConfigDocument, ConfigError};
use crate::consts::{DEFAULT_BUILD_DIRECTORY, DEFAULT_PKG_DIRECTORY};
use path_absolutize::Absolutize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`] from a configuration document.
///
/// Relative paths in the document are resolved against the base directory
/// (normally the directory holding the config file).
///
/// # Examples
///
/// ```no_run
/// use exwrap::bundler::SettingsBuilder;
///
/// # fn example() -> exwrap::bundler::Result<()> {
/// let document = exwrap::config::load("exwrap.json".as_ref())?;
/// let settings = SettingsBuilder::new(document)
///     .base_directory(".")
///     .build_directory("build")
///     .pkg_directory("pkg")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SettingsBuilder {
    document: ConfigDocument,
    base_directory: Option<PathBuf>,
    build_directory: Option<PathBuf>,
    pkg_directory: Option<PathBuf>,
}

impl SettingsBuilder {
    /// Creates a builder for `document`.
    pub fn new(document: ConfigDocument) -> Self {
        Self {
            document,
            base_directory: None,
            build_directory: None,
            pkg_directory: None,
        }
    }

    /// Sets the directory relative paths are resolved against.
    ///
    /// Default: the current working directory
    pub fn base_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.base_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the build output directory.
    ///
    /// Default: `build`
    pub fn build_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.build_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory holding the base wrappers.
    ///
    /// Default: `pkg`
    pub fn pkg_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.pkg_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyEntryPoint`] when the document has no entry point
    /// - [`ConfigError::Root`] when the root cannot be made absolute
    /// - [`ConfigError::BuildDirectory`] when the build directory is the root or contains it
    /// - [`Error::UnsupportedTarget`] for unknown OS or architecture names
    pub fn build(self) -> Result<Settings> {
        let document = self.document;
        if document.entry_point.is_empty() {
            return Err(ConfigError::EmptyEntryPoint.into());
        }

        let base = match self.base_directory {
            Some(base) => base,
            None => std::env::current_dir().map_err(|source| ConfigError::Root {
                path: PathBuf::from("."),
                source,
            })?,
        };
        let base = absolute(&base, Path::new("/")).map_err(|source| ConfigError::Root {
            path: base.clone(),
            source,
        })?;

        let root = match document.root.as_str() {
            "" | "." => base.clone(),
            root => absolute(Path::new(root), &base).map_err(|source| ConfigError::Root {
                path: PathBuf::from(root),
                source,
            })?,
        };

        let target_name = if document.target_name.is_empty() {
            root.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            document.target_name
        };
        if target_name.is_empty() {
            return Err(Error::GenericError(format!(
                "cannot derive a target name from root {}",
                root.display()
            )));
        }

        let install_path = if document.install_path.is_empty() {
            target_name.clone()
        } else {
            document.install_path
        };

        let source = resolve_target(&document.source_os, &document.source_arch, Target::host())?;
        let target = resolve_target(&document.target_os, &document.target_arch, source)?;

        let build_directory = self
            .build_directory
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD_DIRECTORY));
        let build_directory = absolute(&build_directory, &base).map_err(|error| Error::Fs {
            context: "resolving build directory",
            path: build_directory.clone(),
            error,
        })?;

        let pkg_directory = self
            .pkg_directory
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PKG_DIRECTORY));
        let pkg_directory = absolute(&pkg_directory, &base).map_err(|error| Error::Fs {
            context: "resolving package directory",
            path: pkg_directory.clone(),
            error,
        })?;

        // The build directory is erased before every build.
        if root.starts_with(&build_directory) {
            return Err(ConfigError::BuildDirectory {
                path: build_directory,
                root,
            }
            .into());
        }

        let mut exclude_directories = absolute_list(&document.exclude_directories, &base);
        if !exclude_directories.contains(&build_directory) {
            exclude_directories.push(build_directory.clone());
        }

        let optional_path = |value: &str| {
            if value.is_empty() {
                None
            } else {
                absolute_or_warn(value, &base)
            }
        };

        Ok(Settings {
            icon: optional_path(&document.icon),
            darwin: DarwinSettings {
                plist_file: document
                    .darwin
                    .plist_file
                    .as_deref()
                    .and_then(optional_path),
                create_app: document.darwin.create_app,
            },
            path_overrides: absolute_keys(document.path_overrides, &base),
            extra_directories: absolute_keys(document.extra_directories, &base),
            extra_files: absolute_keys(document.extra_files, &base),
            exclude_directories,
            exclude_files: absolute_list(&document.exclude_files, &base),
            root,
            entry_point: document.entry_point,
            target_name,
            source,
            target,
            install_path,
            pre_install_commands: document.pre_install_commands,
            post_install_commands: document.post_install_commands,
            executables: document.executables,
            build_directory,
            pkg_directory,
        })
    }
}

/// Target from optional OS and architecture names, `fallback` filling blanks.
fn resolve_target(os: &str, arch: &str, fallback: Target) -> Result<Target> {
    let os = match os.trim() {
        "" => fallback.os.to_string(),
        os => os.to_ascii_lowercase(),
    };
    let arch = match arch.trim() {
        "" => fallback.arch.to_string(),
        arch => arch.to_ascii_lowercase(),
    };
    Target::parse(&os, &arch)
}

fn absolute(path: &Path, base: &Path) -> std::io::Result<PathBuf> {
    Ok(path.absolutize_from(base)?.into_owned())
}

fn absolute_or_warn(value: &str, base: &Path) -> Option<PathBuf> {
    match absolute(Path::new(value), base) {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("Dropping unresolvable path {value}: {e}");
            None
        }
    }
}

fn absolute_keys(table: BTreeMap<String, String>, base: &Path) -> BTreeMap<PathBuf, String> {
    table
        .into_iter()
        .filter_map(|(key, value)| absolute_or_warn(&key, base).map(|key| (key, value)))
        .collect()
}

fn absolute_list(list: &[String], base: &Path) -> Vec<PathBuf> {
    list.iter()
        .filter_map(|value| absolute_or_warn(value, base))
        .collect()
}
