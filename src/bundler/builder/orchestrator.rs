//! Main bundler orchestration.
//!
//! This module provides the [`Bundler`] orchestrator that gates the target,
//! prepares the build directory, resolves attachments and delegates to the
//! selected layout.

use crate::bundler::{
    Result, Settings,
    attachments::{self, AttachmentMap},
    error::{Error, ErrorExt},
    platform::{BuiltArtifact, Layout, installer, macos},
    utils::fs,
};

use super::checksum::{artifact_size, calculate_sha256};
use crate::config::ConfigError;
use std::io;
use std::path::Path;

/// Main bundler orchestrator.
///
/// Construction validates the target, so a [`Bundler`] value always refers to
/// a buildable OS/architecture pair.
///
/// # Examples
///
/// ```no_run
/// use exwrap::bundler::{Bundler, Settings};
///
/// # async fn example(settings: Settings) -> exwrap::bundler::Result<()> {
/// let bundler = Bundler::new(settings)?;
/// let artifact = bundler.bundle().await?;
/// println!("{} ({} bytes)", artifact.path.display(), artifact.size);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler {
    settings: Settings,
}

impl Bundler {
    /// Creates a bundler for `settings`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Root`] when the project root is not an existing directory
    /// - [`Error::UnsupportedTarget`] when the target is not a first-class pair
    /// - [`Error::MissingWrapper`] when no base wrapper exists for the target
    pub fn new(settings: Settings) -> Result<Self> {
        ensure_root_directory(settings.root())?;

        let target = settings.target();
        target.ensure_first_class()?;

        let wrapper = settings.wrapper_path();
        if !wrapper.is_file() {
            return Err(Error::MissingWrapper {
                os: target.os.to_string(),
                arch: target.arch.to_string(),
                path: wrapper,
            });
        }

        Ok(Self { settings })
    }

    /// Layout selected by the target OS and the Darwin options.
    pub fn layout(&self) -> Layout {
        if self.settings.creates_app_bundle() {
            Layout::AppBundle
        } else {
            Layout::Installer
        }
    }

    /// Builds the artifact.
    ///
    /// # Process
    ///
    /// 1. Recreates the build directory
    /// 2. Resolves attachments from the project root, extra directories and extra files
    /// 3. Runs the layout's bundler
    /// 4. Measures and hashes the result
    pub async fn bundle(&self) -> Result<BuiltArtifact> {
        let build_dir = self.settings.build_directory();
        fs::create_dir_all(build_dir, true)
            .await
            .fs_context("creating build directory", build_dir)?;

        let attachments = self.collect_attachments().await?;
        log::debug!("Resolved {} attachments", attachments.len());

        let layout = self.layout();
        let path = match layout {
            Layout::AppBundle => macos::app::bundle_project(&self.settings, &attachments).await?,
            Layout::Installer => installer::bundle_project(&self.settings, &attachments).await?,
        };

        let size = artifact_size(&path).await?;
        let checksum = calculate_sha256(&path).await?;

        log::info!("Created {layout}: {}", path.display());
        log::info!("SHA256: {checksum}");

        Ok(BuiltArtifact {
            layout,
            path,
            size,
            checksum,
        })
    }

    /// Returns a reference to the bundler settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    async fn collect_attachments(&self) -> Result<AttachmentMap> {
        let settings = self.settings.clone();
        tokio::task::spawn_blocking(move || attachments::collect(&settings))
            .await
            .map_err(|e| Error::GenericError(format!("Attachment walk panicked: {e}")))?
    }
}

fn ensure_root_directory(root: &Path) -> Result<()> {
    let metadata = std::fs::metadata(root).map_err(|source| ConfigError::Root {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ConfigError::Root {
            path: root.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        }
        .into());
    }
    Ok(())
}
