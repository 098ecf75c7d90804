//! First-run installation from the embedded payload.

use super::commands::run_commands;
use super::context::RuntimeContext;
use super::error::{Error, ErrorExt, Result};
use crate::bundler::{archive, utils::fs};
use crate::consts::{
    EMBEDDED_ARCHIVE, EMBEDDED_LAUNCH_SCRIPT, EMBEDDED_SETUP_SCRIPT, EXTRACTED_ARCHIVE_NAME,
};
use crate::descriptor::{LaunchScript, SetupScript};
use crate::embed;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Installs the application carried by the running executable.
///
/// The scratch extraction directory is removed before and after, also when
/// installation fails.
///
/// # Returns
///
/// The install directory.
pub async fn install(ctx: &RuntimeContext) -> Result<PathBuf> {
    let setup: SetupScript = read_descriptor(ctx.exe(), EMBEDDED_SETUP_SCRIPT).await?;
    let launch: LaunchScript = read_descriptor(ctx.exe(), EMBEDDED_LAUNCH_SCRIPT).await?;

    let extract_dir = ctx.extract_dir();
    fs::create_dir_all(extract_dir, true)
        .await
        .fs_context("creating extraction directory", extract_dir)?;

    let installed = install_from(ctx, &setup, &launch).await;

    if let Err(e) = fs::remove_dir_all(extract_dir).await {
        log::warn!(
            "Failed to remove extraction directory {}: {e}",
            extract_dir.display()
        );
    }

    let install_dir = installed?;

    run_commands(&install_dir, &setup.post_install_commands).await?;

    log::info!("Installation completed!");
    Ok(install_dir)
}

async fn install_from(
    ctx: &RuntimeContext,
    setup: &SetupScript,
    launch: &LaunchScript,
) -> Result<PathBuf> {
    let archive_path = ctx.extract_dir().join(EXTRACTED_ARCHIVE_NAME);
    embed::extract_to(ctx.exe(), EMBEDDED_ARCHIVE, &archive_path).await?;

    let install_dir = ctx.install_dir(&setup.install_directory).to_path_buf();
    log::info!("Installing into {}", install_dir.display());
    fs::create_dir_all(&install_dir, true)
        .await
        .fs_context("creating install directory", &install_dir)?;

    run_commands(&install_dir, &setup.pre_install_commands).await?;

    let count = archive::extract_archive(&archive_path, &install_dir)
        .await
        .map_err(|e| Error::Damaged(format!("cannot unpack application archive: {e}")))?;
    log::debug!("Unpacked {count} files");

    let profile = ctx.profile();
    let exe_file_name = profile.executable_name(&setup.exe_name);
    let exe_target = install_dir.join(&exe_file_name);
    fs::remove_file(&exe_target)
        .await
        .fs_context("removing previous executable", &exe_target)?;
    embed::strip(ctx.exe(), &exe_target).await?;
    fs::set_mode(&exe_target, 0o755)
        .await
        .fs_context("setting executable permissions", &exe_target)?;

    if profile.exec_bit {
        grant_execute(&install_dir, &setup.executables).await;
    }

    let script_path = install_dir.join(LaunchScript::file_name(&exe_file_name));
    let script = launch
        .to_persisted()
        .map_err(|e| Error::Damaged(format!("corrupt entrypoint: {e}")))?;
    fs::write_file(&script_path, script)
        .await
        .fs_context("writing launch script", &script_path)?;

    Ok(install_dir)
}

async fn read_descriptor<T: DeserializeOwned>(exe: &Path, name: &str) -> Result<T> {
    let data = embed::read(exe, name).await?;
    serde_json::from_slice(&data)
        .map_err(|e| Error::Damaged(format!("invalid {name} descriptor: {e}")))
}

async fn grant_execute(install_dir: &Path, executables: &[String]) {
    for executable in executables {
        let path = install_dir.join(executable);
        if let Err(e) = fs::set_executable(&path).await {
            log::warn!("Cannot mark {} executable: {e}", path.display());
        }
    }
}
