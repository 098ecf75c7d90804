//! Per-OS conventions shared by the build tool and the wrapper runtime.

use super::Os;
use crate::consts::{APP_BUNDLE_MARKER, TMP_EXTRACT_DIR, WIN_TMP_EXTRACT_DIR};
use std::path::{Path, PathBuf};

/// Where relative install paths are anchored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InstallRoot {
    /// `<system volume>\Program Files`
    ProgramFiles,
    /// The user's home directory
    Home,
}

/// Where the launcher looks for the entry point and its files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LaunchMode {
    /// Next to the running executable
    DirectoryRelative,
    /// In the bundle's resources directory, a sibling of the executable's directory
    ResourceRelative,
}

/// OS conventions, selected once from the target (build) or host (runtime) OS.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlatformProfile {
    /// Operating system the profile describes
    pub os: Os,
    /// Suffix appended to executable names
    pub exe_suffix: &'static str,
    /// Anchor for relative install paths
    pub install_root: InstallRoot,
    /// Whether native application bundles exist on this OS
    pub native_bundle: bool,
    /// Whether files carry a Unix execute bit
    pub exec_bit: bool,
    /// Prefix of the scratch extraction directory
    pub extract_dir_prefix: &'static str,
}

impl PlatformProfile {
    /// Profile for `os`.
    pub fn for_os(os: Os) -> Self {
        match os {
            Os::Windows => Self {
                os,
                exe_suffix: ".exe",
                install_root: InstallRoot::ProgramFiles,
                native_bundle: false,
                exec_bit: false,
                extract_dir_prefix: WIN_TMP_EXTRACT_DIR,
            },
            Os::Darwin => Self {
                os,
                exe_suffix: "",
                install_root: InstallRoot::Home,
                native_bundle: true,
                exec_bit: true,
                extract_dir_prefix: TMP_EXTRACT_DIR,
            },
            _ => Self {
                os,
                exe_suffix: "",
                install_root: InstallRoot::Home,
                native_bundle: false,
                exec_bit: true,
                extract_dir_prefix: TMP_EXTRACT_DIR,
            },
        }
    }

    /// Profile of the machine running this binary.
    pub fn host() -> Self {
        Self::for_os(Os::host())
    }

    /// `name` with the executable suffix, unless it already ends with it.
    pub fn executable_name(&self, name: &str) -> String {
        if self.exe_suffix.is_empty() || name.ends_with(self.exe_suffix) {
            name.to_string()
        } else {
            format!("{name}{}", self.exe_suffix)
        }
    }

    /// Name of the scratch extraction directory for application `app_name`.
    pub fn extract_dir_name(&self, app_name: &str) -> String {
        format!("{}-{app_name}", self.extract_dir_prefix)
    }

    /// Decides how an executable living in `app_dir` resolves its resources.
    ///
    /// Resource-relative launch requires both a bundle-capable OS and the
    /// bundle marker beside the executable.
    pub fn launch_mode(&self, app_dir: &Path) -> LaunchMode {
        if self.native_bundle && app_dir.join(APP_BUNDLE_MARKER).is_file() {
            LaunchMode::ResourceRelative
        } else {
            LaunchMode::DirectoryRelative
        }
    }

    /// Directory the entry point is resolved against and run from.
    pub fn runtime_dir(&self, app_dir: &Path) -> PathBuf {
        match self.launch_mode(app_dir) {
            LaunchMode::ResourceRelative => app_dir.join("..").join("Resources"),
            LaunchMode::DirectoryRelative => app_dir.to_path_buf(),
        }
    }

    /// Absolute install directory for `install_path`.
    ///
    /// Absolute paths are used as is. Relative paths go under Program Files on
    /// the home directory's volume (Windows) or under the home directory.
    /// Without a home directory the path is returned unchanged.
    pub fn install_dir(&self, install_path: &str, home: Option<&Path>) -> PathBuf {
        let path = Path::new(install_path);
        if path.is_absolute() {
            return path.to_path_buf();
        }

        match (self.install_root, home) {
            (InstallRoot::ProgramFiles, Some(home)) => {
                let mut root = match home.components().next() {
                    Some(std::path::Component::Prefix(prefix)) => {
                        PathBuf::from(prefix.as_os_str()).join("\\")
                    }
                    _ => PathBuf::from("\\"),
                };
                root.push("Program Files");
                root.join(path)
            }
            (InstallRoot::Home, Some(home)) => home.join(path),
            (_, None) => path.to_path_buf(),
        }
    }

    /// Extension of the application icon for this OS.
    pub fn icon_extension(&self) -> Option<&'static str> {
        match self.os {
            Os::Windows => Some("ico"),
            Os::Darwin => Some("icns"),
            Os::Linux => Some("svg"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_profile_suffixes_executables_once() {
        let profile = PlatformProfile::for_os(Os::Windows);
        assert_eq!(profile.executable_name("app"), "app.exe");
        assert_eq!(profile.executable_name("app.exe"), "app.exe");
        assert!(!profile.exec_bit);
        assert_eq!(profile.extract_dir_name("app"), "~exwraptmp-app");
    }

    #[test]
    fn unix_profiles_keep_names() {
        let profile = PlatformProfile::for_os(Os::Linux);
        assert_eq!(profile.executable_name("app"), "app");
        assert!(profile.exec_bit);
        assert_eq!(profile.extract_dir_name("app"), ".exwraptmp-app");
    }

    #[test]
    fn relative_install_path_goes_under_home() {
        let profile = PlatformProfile::for_os(Os::Linux);
        assert_eq!(
            profile.install_dir("MyApp", Some(Path::new("/home/user"))),
            PathBuf::from("/home/user/MyApp")
        );
        assert_eq!(profile.install_dir("MyApp", None), PathBuf::from("MyApp"));
    }

    #[cfg(unix)]
    #[test]
    fn absolute_install_path_is_kept() {
        let profile = PlatformProfile::for_os(Os::Linux);
        assert_eq!(
            profile.install_dir("/opt/app", Some(Path::new("/home/user"))),
            PathBuf::from("/opt/app")
        );
    }

    #[test]
    fn bundle_marker_switches_launch_mode_on_darwin_only() {
        let dir = tempfile::tempdir().unwrap();
        let macos_dir = dir.path().join("Contents").join("MacOS");
        std::fs::create_dir_all(&macos_dir).unwrap();

        let darwin = PlatformProfile::for_os(Os::Darwin);
        assert_eq!(darwin.launch_mode(&macos_dir), LaunchMode::DirectoryRelative);

        std::fs::write(macos_dir.join(APP_BUNDLE_MARKER), b"").unwrap();
        assert_eq!(darwin.launch_mode(&macos_dir), LaunchMode::ResourceRelative);
        assert_eq!(
            darwin.runtime_dir(&macos_dir),
            macos_dir.join("..").join("Resources")
        );

        let linux = PlatformProfile::for_os(Os::Linux);
        assert_eq!(linux.launch_mode(&macos_dir), LaunchMode::DirectoryRelative);
    }
}
