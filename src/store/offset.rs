//! Persisted read offsets.
//!
//! Each channel keeps one sidecar file holding a decimal byte offset. The
//! write is the bus's sole durability checkpoint: once it returns, every
//! record up to that offset counts as delivered for replay purposes.

use std::path::Path;

use tokio::fs;
use tracing::warn;

/// Reads the persisted offset, degrading to 0 on any problem.
///
/// An absent file is the normal first-run case. Malformed or unreadable
/// content is logged as a warning and treated as 0, never raised.
pub(crate) async fn read_offset(path: &Path) -> u64 {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return 0,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "offset file unreadable, treating as 0");
            return 0;
        }
    };
    match raw.trim().parse::<u64>() {
        Ok(value) => value,
        Err(_) => {
            warn!(path = %path.display(), content = raw.trim(), "offset file malformed, treating as 0");
            0
        }
    }
}

/// Overwrites the sidecar with the decimal text of `value`, creating parent
/// directories on demand.
pub(crate) async fn write_offset(path: &Path, value: u64) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, value.to_string()).await
}
