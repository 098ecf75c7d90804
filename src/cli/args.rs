//! Command line argument parsing.

use crate::consts::{
    DEFAULT_BUILD_DIRECTORY, DEFAULT_CONFIG_FILE, DEFAULT_PKG_DIRECTORY, PKG_DIRECTORY_ENV,
};
use clap::Parser;
use std::path::PathBuf;

/// Package an application directory into a single self-installing executable
#[derive(Parser, Debug)]
#[command(
    name = "exwrap",
    version,
    about = "Package an application directory into a single self-installing executable",
    long_about = "Reads a JSON project description, collects the application's files and attaches them to a
prebuilt wrapper for the target OS/architecture.

The produced executable installs the application on first run and launches its entry point
on every later run. For macOS targets with `mac_os.create_app` set, an .app bundle is
produced instead.

Usage:
  exwrap
  exwrap --config app/exwrap.json --dir out
  EXWRAP_PKG_DIR=/opt/exwrap/pkg exwrap"
)]
pub struct Args {
    /// Project configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Build output directory, erased before every build
    ///
    /// Relative paths are taken from the directory holding the configuration file.
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_BUILD_DIRECTORY)]
    pub dir: PathBuf,

    /// Directory holding the prebuilt wrappers (`wrapper-<os>-<arch>`)
    ///
    /// Defaults to `pkg` next to the exwrap executable.
    #[arg(long, value_name = "DIR", env = PKG_DIRECTORY_ENV)]
    pub pkg_dir: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Wrapper directory: the flag, or `pkg` beside the running executable.
    pub fn pkg_directory(&self) -> PathBuf {
        if let Some(dir) = &self.pkg_dir {
            return dir.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_PKG_DIRECTORY)))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PKG_DIRECTORY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["exwrap"]).unwrap();
        assert_eq!(args.config, PathBuf::from("exwrap.json"));
        assert_eq!(args.dir, PathBuf::from("build"));
    }

    #[test]
    fn explicit_flags() {
        let args = Args::try_parse_from([
            "exwrap",
            "--config",
            "app/exwrap.json",
            "--dir",
            "out",
            "--pkg-dir",
            "/opt/pkg",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("app/exwrap.json"));
        assert_eq!(args.dir, PathBuf::from("out"));
        assert_eq!(args.pkg_directory(), PathBuf::from("/opt/pkg"));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["exwrap", "--platform", "deb"]).is_err());
    }
}
