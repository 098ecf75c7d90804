//! Named attachments appended to an executable.
//!
//! An executable with attachments is the untouched base executable followed by
//! an overlay:
//!
//! ```text
//! [base executable]
//! [blob 0] [blob 1] ... [blob n]
//! [index: JSON array of { name, offset, len }]
//! [index length: u64 LE] [base length: u64 LE] [magic: "EXWRAP\0\x01"]
//! ```
//!
//! Offsets in the index are absolute file offsets. Operating systems load the
//! base image and ignore trailing data, so the result stays runnable, and
//! [`strip`] recovers the base byte for byte.

use serde::{Deserialize, Serialize};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWrite, AsyncWriteExt};

/// Trailing magic identifying an overlay.
pub const MAGIC: [u8; 8] = *b"EXWRAP\x00\x01";

const FOOTER_LEN: u64 = 24;

/// Result type alias for embedding operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading or writing attachments.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O failure on a specific file
    #[error("failed to {context} {}: {source}", .path.display())]
    Io {
        /// Operation that failed
        context: &'static str,
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// I/O failure writing an output file
    #[error("failed to {context} {}: {source}", .path.display())]
    Write {
        /// Operation that failed
        context: &'static str,
        /// File being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Output path is already taken
    #[error("output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// Footer or index cannot be trusted
    #[error("corrupt attachment data in {}: {reason}", .path.display())]
    Corrupt {
        /// File being read
        path: PathBuf,
        /// What was wrong
        reason: String,
    },

    /// Requested attachment is absent
    #[error("attachment {name:?} not found in {}", .path.display())]
    NotFound {
        /// Attachment name
        name: String,
        /// File being read
        path: PathBuf,
    },
}

trait IoContext<T> {
    fn io_context(self, context: &'static str, path: &Path) -> Result<T>;
    fn write_context(self, context: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context(self, context: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Io {
            context,
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_context(self, context: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Write {
            context,
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    name: String,
    offset: u64,
    len: u64,
}

#[derive(Debug)]
struct Overlay {
    base_len: u64,
    entries: Vec<IndexEntry>,
}

/// Reads the overlay of `path`, or `None` when the file carries no attachments.
async fn read_overlay(path: &Path) -> Result<Option<Overlay>> {
    let mut file = File::open(path).await.io_context("open", path)?;
    let file_len = file.metadata().await.io_context("stat", path)?.len();
    if file_len < FOOTER_LEN {
        return Ok(None);
    }

    let mut footer = [0u8; FOOTER_LEN as usize];
    file.seek(SeekFrom::Start(file_len - FOOTER_LEN))
        .await
        .io_context("seek in", path)?;
    file.read_exact(&mut footer)
        .await
        .io_context("read footer of", path)?;

    if footer[16..24] != MAGIC {
        return Ok(None);
    }

    let corrupt = |reason: String| Error::Corrupt {
        path: path.to_path_buf(),
        reason,
    };

    let mut word = [0u8; 8];
    word.copy_from_slice(&footer[0..8]);
    let index_len = u64::from_le_bytes(word);
    word.copy_from_slice(&footer[8..16]);
    let base_len = u64::from_le_bytes(word);

    let blobs_end = file_len
        .checked_sub(FOOTER_LEN)
        .and_then(|n| n.checked_sub(index_len))
        .filter(|end| *end >= base_len)
        .ok_or_else(|| corrupt(format!("index length {index_len} exceeds file")))?;

    let mut index = vec![0u8; index_len as usize];
    file.seek(SeekFrom::Start(blobs_end))
        .await
        .io_context("seek in", path)?;
    file.read_exact(&mut index)
        .await
        .io_context("read index of", path)?;

    let entries: Vec<IndexEntry> =
        serde_json::from_slice(&index).map_err(|e| corrupt(format!("invalid index: {e}")))?;

    for entry in &entries {
        let in_bounds = entry.offset >= base_len
            && entry
                .offset
                .checked_add(entry.len)
                .is_some_and(|end| end <= blobs_end);
        if !in_bounds {
            return Err(corrupt(format!(
                "attachment {:?} lies outside the overlay",
                entry.name
            )));
        }
    }

    Ok(Some(Overlay { base_len, entries }))
}

/// Length of the base executable inside `path`, ignoring any overlay.
async fn base_len(path: &Path) -> Result<u64> {
    match read_overlay(path).await? {
        Some(overlay) => Ok(overlay.base_len),
        None => Ok(fs::metadata(path).await.io_context("stat", path)?.len()),
    }
}

/// Opens `output` for writing, refusing to replace an existing file.
async fn create_output(output: &Path) -> Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o755);

    match options.open(output).await {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            Err(Error::OutputExists(output.to_path_buf()))
        }
        Err(e) => Err(Error::Write {
            context: "create",
            path: output.to_path_buf(),
            source: e,
        }),
    }
}

/// Copies the first `len` bytes of `source` into `out`.
async fn copy_prefix<W: AsyncWrite + Unpin>(
    source: &Path,
    len: u64,
    out: &mut W,
    output: &Path,
) -> Result<u64> {
    let file = File::open(source).await.io_context("open", source)?;
    copy_stream(&mut file.take(len), source, out, output).await
}

/// Copies `reader` to its end into `out`, blaming read errors on `source` and
/// write errors on `output`.
async fn copy_stream<R, W>(reader: &mut R, source: &Path, out: &mut W, output: &Path) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; 64 * 1024];
    let mut copied = 0;
    loop {
        let n = reader.read(&mut buffer).await.io_context("read", source)?;
        if n == 0 {
            return Ok(copied);
        }
        out.write_all(&buffer[..n])
            .await
            .write_context("write", output)?;
        copied += n as u64;
    }
}

/// Writes `base` plus `attachments` into a new file at `output`.
///
/// Any overlay already present on `base` is dropped first, so embedding into a
/// previously embedded executable starts from the clean image. The output is
/// removed again if writing fails part-way.
///
/// # Errors
///
/// Fails if `output` exists, or if reading an input or writing the output fails.
pub async fn embed<N, P>(base: &Path, output: &Path, attachments: &[(N, P)]) -> Result<()>
where
    N: AsRef<str>,
    P: AsRef<Path>,
{
    let base_len = base_len(base).await?;
    let mut out = create_output(output).await?;

    let written = write_embedded(base, base_len, attachments, &mut out, output).await;
    drop(out);

    if written.is_err() {
        let _ = fs::remove_file(output).await;
    }
    written
}

async fn write_embedded<N, P>(
    base: &Path,
    base_len: u64,
    attachments: &[(N, P)],
    out: &mut File,
    output: &Path,
) -> Result<()>
where
    N: AsRef<str>,
    P: AsRef<Path>,
{
    let mut position = copy_prefix(base, base_len, out, output).await?;
    if position != base_len {
        return Err(Error::Corrupt {
            path: base.to_path_buf(),
            reason: format!("expected {base_len} bytes, read {position}"),
        });
    }

    let mut entries = Vec::with_capacity(attachments.len());
    for (name, source) in attachments {
        let source = source.as_ref();
        log::debug!("Embedding {} from {}", name.as_ref(), source.display());

        let mut file = File::open(source).await.io_context("open", source)?;
        let len = copy_stream(&mut file, source, out, output).await?;

        entries.push(IndexEntry {
            name: name.as_ref().to_string(),
            offset: position,
            len,
        });
        position += len;
    }

    let index = serde_json::to_vec(&entries).map_err(|e| Error::Corrupt {
        path: output.to_path_buf(),
        reason: format!("cannot serialize index: {e}"),
    })?;

    out.write_all(&index).await.write_context("write", output)?;
    out.write_all(&(index.len() as u64).to_le_bytes())
        .await
        .write_context("write", output)?;
    out.write_all(&base_len.to_le_bytes())
        .await
        .write_context("write", output)?;
    out.write_all(&MAGIC).await.write_context("write", output)?;
    out.flush().await.write_context("flush", output)?;

    Ok(())
}

/// Writes a copy of `base` without attachments to a new file at `output`.
///
/// A file with no attachments is copied unchanged.
///
/// # Errors
///
/// Fails if `output` exists or any I/O fails; a partial output is removed.
pub async fn strip(base: &Path, output: &Path) -> Result<()> {
    let base_len = base_len(base).await?;
    let mut out = create_output(output).await?;

    let written = async {
        copy_prefix(base, base_len, &mut out, output).await?;
        out.flush().await.write_context("flush", output)
    }
    .await;
    drop(out);

    if written.is_err() {
        let _ = fs::remove_file(output).await;
    }
    written
}

/// Lists attachment names of `path` in the order they were embedded.
///
/// # Errors
///
/// Fails if the file cannot be read or its overlay is corrupt.
pub async fn list(path: &Path) -> Result<Vec<String>> {
    Ok(read_overlay(path)
        .await?
        .map(|overlay| overlay.entries.into_iter().map(|e| e.name).collect())
        .unwrap_or_default())
}

async fn find_entry(path: &Path, name: &str) -> Result<IndexEntry> {
    read_overlay(path)
        .await?
        .and_then(|overlay| overlay.entries.into_iter().find(|e| e.name == name))
        .ok_or_else(|| Error::NotFound {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
}

/// Reads the bytes of attachment `name` from `path`.
///
/// # Errors
///
/// Fails if the attachment does not exist or cannot be read.
pub async fn read(path: &Path, name: &str) -> Result<Vec<u8>> {
    let entry = find_entry(path, name).await?;

    let mut file = File::open(path).await.io_context("open", path)?;
    file.seek(SeekFrom::Start(entry.offset))
        .await
        .io_context("seek in", path)?;

    let mut data = vec![0u8; entry.len as usize];
    file.read_exact(&mut data)
        .await
        .io_context("read attachment from", path)?;
    Ok(data)
}

/// Streams attachment `name` from `path` into a new or truncated file at `dest`.
///
/// # Errors
///
/// Fails if the attachment does not exist or any I/O fails.
pub async fn extract_to(path: &Path, name: &str, dest: &Path) -> Result<u64> {
    let entry = find_entry(path, name).await?;

    let mut file = File::open(path).await.io_context("open", path)?;
    file.seek(SeekFrom::Start(entry.offset))
        .await
        .io_context("seek in", path)?;

    let mut out = File::create(dest).await.write_context("create", dest)?;
    let copied = copy_stream(&mut file.take(entry.len), path, &mut out, dest).await?;
    out.flush().await.write_context("flush", dest)?;
    Ok(copied)
}
