//! Self-installing executable: flat archive plus control documents embedded
//! into the target's base wrapper.

use crate::{
    bundler::{
        archive,
        attachments::AttachmentMap,
        error::{Context, ErrorExt, Result},
        settings::Settings,
        utils::fs,
    },
    consts::{
        APP_ARCHIVE_NAME, EMBEDDED_ARCHIVE, EMBEDDED_LAUNCH_SCRIPT, EMBEDDED_SETUP_SCRIPT,
        LAUNCH_SCRIPT_FILE, SETUP_SCRIPT_FILE,
    },
    descriptor::{LaunchScript, SetupScript},
    embed,
};
use std::path::{Path, PathBuf};

/// Builds the self-installing executable.
///
/// # Process
///
/// 1. Writes every attachment into `<build>/app.zip`
/// 2. Copies the base wrapper to `<build>/<name>-base`
/// 3. Writes the setup and launch descriptors
/// 4. Embeds archive and descriptors into `<build>/<name>`
/// 5. Removes the scratch files
///
/// # Returns
///
/// Path of the produced executable.
pub async fn bundle_project(settings: &Settings, attachments: &AttachmentMap) -> Result<PathBuf> {
    let build_dir = settings.build_directory();
    let profile = settings.profile();
    let name = settings.target_name();

    log::info!("Creating installer for {name} ({})", settings.target());

    let archive_path = build_dir.join(APP_ARCHIVE_NAME);
    let count = archive::create_archive(attachments, &archive_path)
        .await
        .context("failed to create application archive")?;
    log::debug!("Archived {count} files into {}", archive_path.display());

    let wrapper = settings.wrapper_path();
    let base_path = build_dir.join(profile.executable_name(&format!("{name}-base")));
    fs::copy_file(&wrapper, &base_path)
        .await
        .fs_context("copying application wrapper", &wrapper)?;

    let setup = SetupScript {
        install_directory: settings.install_path().to_string(),
        exe_name: name.to_string(),
        executables: settings.executables().to_vec(),
        pre_install_commands: settings.pre_install_commands().to_vec(),
        post_install_commands: settings.post_install_commands().to_vec(),
    };
    let setup_path = build_dir.join(SETUP_SCRIPT_FILE);
    fs::write_file(&setup_path, serde_json::to_vec(&setup)?)
        .await
        .fs_context("writing setup script", &setup_path)?;

    let launch = LaunchScript {
        entry_point: settings.entry_point().to_vec(),
    };
    let launch_path = build_dir.join(LAUNCH_SCRIPT_FILE);
    fs::write_file(&launch_path, serde_json::to_vec(&launch)?)
        .await
        .fs_context("writing launch script", &launch_path)?;

    let output = build_dir.join(profile.executable_name(name));
    fs::remove_file(&output)
        .await
        .fs_context("removing previous executable", &output)?;

    embed::embed(
        &base_path,
        &output,
        &[
            (EMBEDDED_ARCHIVE, archive_path.as_path()),
            (EMBEDDED_SETUP_SCRIPT, setup_path.as_path()),
            (EMBEDDED_LAUNCH_SCRIPT, launch_path.as_path()),
        ],
    )
    .await
    .with_context(|| format!("failed to embed payload into {}", output.display()))?;

    remove_scratch(&[&archive_path, &base_path, &setup_path, &launch_path]).await;

    Ok(output)
}

async fn remove_scratch(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path).await {
            log::warn!("Failed to remove {}: {e}", path.display());
        }
    }
}
