//! SHA-256 digests of built artifacts.

use crate::{
    bail,
    bundler::error::{ErrorExt, Result},
};
use sha2::{Digest, Sha256};
use std::path::{Component, Path};
use tokio::io::AsyncReadExt;

/// Hex-encoded SHA-256 of a file, or of a directory tree for bundles.
pub async fn calculate_sha256(path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading artifact metadata", path)?;

    let mut hasher = Sha256::new();
    if metadata.is_file() {
        hash_file(&mut hasher, path).await?;
    } else if metadata.is_dir() {
        hash_tree(&mut hasher, path).await?;
    } else {
        bail!("Path is neither file nor directory: {}", path.display());
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Total size of a file, or of every file below a directory.
pub async fn artifact_size(path: &Path) -> Result<u64> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading artifact metadata", path)?;
    if !metadata.is_dir() {
        return Ok(metadata.len());
    }

    let mut size = 0;
    for entry in walkdir::WalkDir::new(path) {
        let entry = entry?;
        if entry.file_type().is_file() {
            size += entry.metadata()?.len();
        }
    }
    Ok(size)
}

async fn hash_file(hasher: &mut Sha256, path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening file for hashing", path)?;
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hashing", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(())
}

/// Hashes relative path and contents of each file in sorted order, so the
/// digest does not depend on the host's directory iteration order or separator.
async fn hash_tree(hasher: &mut Sha256, dir: &Path) -> Result<()> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    for file in files {
        if let Ok(relative) = file.strip_prefix(dir) {
            let name = relative
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/");
            hasher.update(name.as_bytes());
        }
        hash_file(hasher, &file).await?;
    }
    Ok(())
}
