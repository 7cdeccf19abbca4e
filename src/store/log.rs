//! Append-only log file primitives.
//!
//! One file per channel, one record per line. Appends create missing parent
//! directories; reads start at a byte offset and only consume whole lines,
//! so a concurrent append that has not yet written its terminator is simply
//! invisible until the next read.

use std::io::SeekFrom;
use std::path::Path;

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// Complete lines read from a log, plus the offset just past the last one.
pub(crate) struct LineBatch {
    /// Records in file order.
    pub(crate) records: Vec<String>,
    /// Byte position immediately after the last complete line consumed.
    pub(crate) next_offset: u64,
}

/// Appends `payload` plus a line terminator, creating the file and its
/// parent directories on demand.
///
/// The payload and terminator are written as a single buffered write so the
/// line lands in one append at the OS level.
pub(crate) async fn append_line(path: &Path, payload: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    let mut line = Vec::with_capacity(payload.len() + 1);
    line.extend_from_slice(payload.as_bytes());
    line.push(b'\n');
    file.write_all(&line).await?;
    file.flush().await?;
    Ok(())
}

/// Returns the current length of the log, or `None` if it does not exist.
pub(crate) async fn file_len(path: &Path) -> std::io::Result<Option<u64>> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(Some(meta.len())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Reads all complete lines starting at `offset`.
///
/// A trailing line with no terminator yet is left unconsumed: it is not
/// returned and `next_offset` stops before it. A `\r` directly before the
/// terminator is stripped from the record content, but its byte still counts
/// toward `next_offset`.
pub(crate) async fn read_lines_from(path: &Path, offset: u64) -> std::io::Result<LineBatch> {
    let mut file = fs::File::open(path).await?;
    file.seek(SeekFrom::Start(offset)).await?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).await?;

    let mut records = Vec::new();
    let mut consumed = 0usize;
    let mut start = 0usize;
    for (i, byte) in buf.iter().enumerate() {
        if *byte != b'\n' {
            continue;
        }
        let mut line = &buf[start..i];
        if line.last() == Some(&b'\r') {
            line = &line[..line.len() - 1];
        }
        records.push(String::from_utf8_lossy(line).into_owned());
        start = i + 1;
        consumed = start;
    }

    Ok(LineBatch { records, next_offset: offset + consumed as u64 })
}
