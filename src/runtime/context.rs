//! Per-process runtime context.

use super::error::{Error, ErrorExt, Result};
use crate::bundler::settings::PlatformProfile;
use crate::descriptor::LaunchScript;
use std::cell::OnceCell;
use std::path::{Path, PathBuf};

/// Paths the installer and launcher work with, resolved once per process.
///
/// Created at startup and passed by reference; derived values are computed
/// on first use and kept for the lifetime of the context.
#[derive(Debug)]
pub struct RuntimeContext {
    exe: PathBuf,
    home: Option<PathBuf>,
    temp_dir: PathBuf,
    profile: PlatformProfile,
    app_dir: OnceCell<PathBuf>,
    extract_dir: OnceCell<PathBuf>,
    install_dir: OnceCell<PathBuf>,
    launch_command: OnceCell<Vec<String>>,
}

impl RuntimeContext {
    /// Context for the executable at `exe`.
    pub fn new(
        exe: impl Into<PathBuf>,
        home: Option<PathBuf>,
        temp_dir: impl Into<PathBuf>,
        profile: PlatformProfile,
    ) -> Self {
        Self {
            exe: exe.into(),
            home,
            temp_dir: temp_dir.into(),
            profile,
            app_dir: OnceCell::new(),
            extract_dir: OnceCell::new(),
            install_dir: OnceCell::new(),
            launch_command: OnceCell::new(),
        }
    }

    /// Context for the running process on the host platform.
    pub fn from_env() -> Result<Self> {
        let exe = std::env::current_exe()
            .map_err(|e| Error::FailedExecutable(format!("cannot locate own executable: {e}")))?;
        Ok(Self::new(
            exe,
            dirs::home_dir(),
            std::env::temp_dir(),
            PlatformProfile::host(),
        ))
    }

    /// Path of the running executable.
    pub fn exe(&self) -> &Path {
        &self.exe
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    /// File name of the running executable.
    pub fn exe_file_name(&self) -> Result<&str> {
        self.exe
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::FailedExecutable(format!("invalid executable path {}", self.exe.display()))
            })
    }

    /// Directory holding the running executable.
    pub fn app_dir(&self) -> &Path {
        self.app_dir.get_or_init(|| {
            self.exe
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        })
    }

    /// Directory the entry point is resolved against: the app directory, or
    /// the bundle's resources directory when running from a native bundle.
    pub fn runtime_dir(&self) -> PathBuf {
        self.profile.runtime_dir(self.app_dir())
    }

    /// Scratch directory the payload archive is extracted to.
    pub fn extract_dir(&self) -> &Path {
        self.extract_dir.get_or_init(|| {
            let app_name = self
                .exe
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.temp_dir
                .join(self.profile.extract_dir_name(&app_name))
        })
    }

    /// Install directory for `install_path`.
    ///
    /// The first call fixes the value for the rest of the process.
    pub fn install_dir(&self, install_path: &str) -> &Path {
        self.install_dir
            .get_or_init(|| self.profile.install_dir(install_path, self.home.as_deref()))
    }

    /// Persisted launch script next to the running executable.
    pub fn launch_script_path(&self) -> Result<PathBuf> {
        Ok(self
            .app_dir()
            .join(LaunchScript::file_name(self.exe_file_name()?)))
    }

    /// Entry point read from the persisted launch script.
    ///
    /// # Errors
    ///
    /// [`Error::MissingEntrypoint`] when the script is absent or empty,
    /// [`Error::Damaged`] when it is not a JSON array of strings.
    pub async fn launch_command(&self) -> Result<&[String]> {
        if let Some(command) = self.launch_command.get() {
            return Ok(command);
        }

        let path = self.launch_script_path()?;
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MissingEntrypoint);
            }
            Err(e) => return Err(e).fs_context("reading launch script", path),
        };

        let script = LaunchScript::from_persisted(&data)
            .map_err(|e| Error::Damaged(format!("invalid launch script {}: {e}", path.display())))?;
        if script.entry_point.is_empty() {
            return Err(Error::MissingEntrypoint);
        }

        Ok(self.launch_command.get_or_init(|| script.entry_point))
    }
}
