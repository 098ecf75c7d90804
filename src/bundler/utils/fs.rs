//! File system utilities shared by the build tool and the runtime.
//!
//! Helpers are idempotent where that makes sense (removing something absent
//! succeeds) and return plain IO errors so each layer can attach its own
//! context.

use std::{io, path::Path};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> io::Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path).await
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Removes the file if it exists.
pub async fn remove_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Copies a regular file, creating any parent directories of the destination.
///
/// Permission bits travel with the contents.
pub async fn copy_file(from: &Path, to: &Path) -> io::Result<u64> {
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir).await?;
    }
    fs::copy(from, to).await
}

/// Writes `contents` to `path`, creating any parent directories.
pub async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, contents).await
}

/// Grants the execute bit to user, group and others.
#[cfg(unix)]
pub async fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path).await?.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions).await
}

/// Windows has no execute bit; the file only has to exist.
#[cfg(not(unix))]
pub async fn set_executable(path: &Path) -> io::Result<()> {
    fs::metadata(path).await.map(|_| ())
}

/// Sets the exact permission bits of `path`.
#[cfg(unix)]
pub async fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
}

#[cfg(not(unix))]
pub async fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
