//! macOS `.app` bundle layout.
//!
//! ```text
//! <name>.app/Contents/
//!   Info.plist
//!   MacOS/<name>          base wrapper, launches the entry point
//!   MacOS/<name>.launch   persisted launch script
//!   MacOS/.exwrap-app     marker: resolve files from ../Resources
//!   Resources/...         attachments
//!   Frameworks/
//! ```

use crate::{
    bundler::{
        attachments::AttachmentMap,
        error::{Error, ErrorExt, Result},
        settings::Settings,
        utils::fs,
    },
    consts::APP_BUNDLE_MARKER,
    descriptor::LaunchScript,
};
use handlebars::Handlebars;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Info.plist used when the configuration names none.
pub const INFO_PLIST_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>CFBundleDevelopmentRegion</key>
    <string>en</string>
    <key>CFBundleExecutable</key>
    <string>{{exe}}</string>
    <key>CFBundleIconFile</key>
    <string>icon.icns</string>
    <key>CFBundleIdentifier</key>
    <string>com.exwrap.{{exe}}</string>
    <key>CFBundleInfoDictionaryVersion</key>
    <string>6.0</string>
    <key>CFBundleName</key>
    <string>{{exe}}</string>
    <key>CFBundlePackageType</key>
    <string>APPL</string>
    <key>NSHighResolutionCapable</key>
    <true/>
</dict>
</plist>
"#;

/// Placeholder accepted in user-supplied plists for compatibility.
const LEGACY_EXE_PLACEHOLDER: &str = "${EXE}";

/// Bundle project as a macOS `.app` directory.
///
/// A failure part-way removes the partial bundle before the error is returned.
///
/// # Returns
///
/// Path of the `.app` directory.
pub async fn bundle_project(settings: &Settings, attachments: &AttachmentMap) -> Result<PathBuf> {
    let app_dir = settings
        .build_directory()
        .join(format!("{}.app", settings.target_name()));

    log::info!("Creating app bundle {}", app_dir.display());

    match write_bundle(settings, attachments, &app_dir).await {
        Ok(()) => Ok(app_dir),
        Err(e) => {
            if let Err(cleanup) = fs::remove_dir_all(&app_dir).await {
                log::warn!(
                    "Failed to remove partial bundle {}: {cleanup}",
                    app_dir.display()
                );
            }
            Err(e)
        }
    }
}

async fn write_bundle(settings: &Settings, attachments: &AttachmentMap, app_dir: &Path) -> Result<()> {
    let contents = app_dir.join("Contents");
    let macos_dir = contents.join("MacOS");
    let resources_dir = contents.join("Resources");
    let frameworks_dir = contents.join("Frameworks");

    fs::create_dir_all(app_dir, true)
        .await
        .fs_context("creating bundle directory", app_dir)?;
    for dir in [&macos_dir, &resources_dir, &frameworks_dir] {
        fs::create_dir_all(dir, false)
            .await
            .fs_context("creating bundle structure", dir)?;
    }

    copy_resources(settings, attachments, &resources_dir).await?;

    let plist = render_info_plist(settings).await?;
    let plist_path = contents.join("Info.plist");
    fs::write_file(&plist_path, plist)
        .await
        .fs_context("writing Info.plist", &plist_path)?;

    let exe_name = settings.profile().executable_name(settings.target_name());
    let launch = LaunchScript {
        entry_point: settings.entry_point().to_vec(),
    };
    let launch_path = macos_dir.join(LaunchScript::file_name(&exe_name));
    fs::write_file(&launch_path, launch.to_persisted()?)
        .await
        .fs_context("writing launch script", &launch_path)?;

    let marker = macos_dir.join(APP_BUNDLE_MARKER);
    fs::write_file(&marker, b"")
        .await
        .fs_context("writing bundle marker", &marker)?;

    let exe_path = macos_dir.join(&exe_name);
    let wrapper = settings.wrapper_path();
    fs::copy_file(&wrapper, &exe_path)
        .await
        .fs_context("copying application wrapper", &wrapper)?;
    fs::set_executable(&exe_path)
        .await
        .fs_context("setting executable permissions", &exe_path)?;

    if let Some(icon) = settings.icon_file() {
        let dest = resources_dir.join("icon.icns");
        // Apps run without their icon.
        if let Err(e) = fs::copy_file(&icon, &dest).await {
            log::warn!("Skipping icon {}: {e}", icon.display());
        }
    }

    Ok(())
}

/// Copies attachments under `resources_dir`, keeping source permissions and
/// adding the execute bit to configured executables.
async fn copy_resources(
    settings: &Settings,
    attachments: &AttachmentMap,
    resources_dir: &Path,
) -> Result<()> {
    for (dest, src) in attachments {
        let target = resources_dir.join(dest);
        fs::copy_file(src, &target)
            .await
            .fs_context("copying resource", src)?;

        if settings
            .executables()
            .iter()
            .any(|exe| Path::new(exe) == dest.as_path())
        {
            fs::set_executable(&target)
                .await
                .fs_context("setting executable permissions", &target)?;
        }
    }
    Ok(())
}

async fn render_info_plist(settings: &Settings) -> Result<String> {
    let template = match &settings.darwin().plist_file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .fs_context("reading Info.plist template", path)?
            .replace(LEGACY_EXE_PLACEHOLDER, "{{exe}}"),
        None => INFO_PLIST_TEMPLATE.to_string(),
    };

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    let mut data = BTreeMap::new();
    data.insert("exe", settings.target_name());

    handlebars
        .render_template(&template, &data)
        .map_err(|e| Error::Template(format!("failed to render Info.plist: {e}")))
}
