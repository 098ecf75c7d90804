//! Payload archive: written at build time, unpacked at install time.

use crate::bundler::attachments::AttachmentMap;
use crate::bundler::error::{Error, ErrorExt, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;
use zip::write::SimpleFileOptions;

/// Writes every attachment into a new zip file at `dest`.
///
/// Entries carry no permission bits; executables are restored at install time.
/// Returns the number of entries written.
pub async fn create_archive(attachments: &AttachmentMap, dest: &Path) -> Result<usize> {
    let attachments = attachments.clone();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || write_zip(&attachments, &dest))
        .await
        .map_err(|e| Error::GenericError(format!("Archive task panicked: {e}")))?
}

/// Unpacks the zip file at `archive` into `dest_dir`.
///
/// Entries whose names would escape `dest_dir` are skipped.
/// Returns the number of files written.
pub async fn extract_archive(archive: &Path, dest_dir: &Path) -> Result<usize> {
    let archive = archive.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();

    tokio::task::spawn_blocking(move || extract_zip(&archive, &dest_dir))
        .await
        .map_err(|e| Error::GenericError(format!("Extraction task panicked: {e}")))?
}

fn write_zip(attachments: &AttachmentMap, dest: &Path) -> Result<usize> {
    let file = File::create(dest).fs_context("creating application archive", dest)?;
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, src) in attachments {
        let mut source = File::open(src).fs_context("opening attachment", src)?;
        zip.start_file(entry_name(name), options)?;
        io::copy(&mut source, &mut zip).fs_context("archiving attachment", src)?;
    }

    zip.finish()?;
    Ok(attachments.len())
}

/// Zip entry names always use forward slashes.
fn entry_name(dest: &Path) -> String {
    dest.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<usize> {
    let file = File::open(archive_path).fs_context("opening archive", archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    fs::create_dir_all(dest_dir).fs_context("creating directory", dest_dir)?;
    let mut extracted = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative_path: PathBuf = match entry.enclosed_name() {
            Some(path) => path,
            None => {
                log::warn!("Skipping archive entry with unsafe name {}", entry.name());
                continue;
            }
        };

        let absolute_path = dest_dir.join(&relative_path);
        if entry.is_dir() {
            fs::create_dir_all(&absolute_path).fs_context("creating directory", &absolute_path)?;
            continue;
        }

        if let Some(parent) = absolute_path.parent() {
            fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }

        let mut outfile = File::create(&absolute_path).fs_context("creating file", &absolute_path)?;
        io::copy(&mut entry, &mut outfile).fs_context("extracting file", &absolute_path)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&absolute_path, fs::Permissions::from_mode(mode & 0o7777))
                    .fs_context("setting permissions", &absolute_path)?;
            }
        }

        extracted += 1;
    }

    Ok(extracted)
}
