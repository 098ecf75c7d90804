//! Command line interface for the build tool.

mod args;

pub use args::Args;

use crate::bundler::{BuiltArtifact, Bundler, SettingsBuilder};
use crate::config::{self, ConfigError};
use crate::error::Result;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Builds the artifact described by `args`.
///
/// # Process
///
/// 1. Loads the configuration file
/// 2. Normalizes it against the configuration file's directory
/// 3. Validates the target and locates its wrapper
/// 4. Runs the bundler
pub async fn run(args: &Args) -> Result<BuiltArtifact> {
    let config_path = absolute(&args.config)?;
    let document = config::load(&config_path)?;
    log::debug!("Loaded {}", config_path.display());

    let base = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let pkg_directory = absolute(&args.pkg_directory())?;

    let settings = SettingsBuilder::new(document)
        .base_directory(&base)
        .build_directory(&args.dir)
        .pkg_directory(&pkg_directory)
        .build()?;

    log::info!(
        "Packaging {} for {}",
        settings.target_name(),
        settings.target()
    );

    let bundler = Bundler::new(settings)?;
    Ok(bundler.bundle().await?)
}

/// `path` against the current directory.
fn absolute(path: &Path) -> Result<PathBuf> {
    path.absolutize()
        .map(|p| p.into_owned())
        .map_err(|source| {
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
}
