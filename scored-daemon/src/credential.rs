//! Reference digest loading from the credential file.
//!
//! The file is re-read on every authentication attempt so a rotated
//! password takes effect without restarting the daemon. Only the first
//! line matters; anything past the digest on that line is ignored by
//! the comparison's length cap.

use std::fs;
use std::io;
use std::path::Path;

/// Read the stored reference digest from `path`.
///
/// Returns the first line, trimmed. A missing or unreadable file is an
/// error the caller maps to an authentication failure, never to success.
pub fn read_reference_digest(path: &Path) -> io::Result<String> {
    let contents = fs::read_to_string(path)?;
    let first_line = contents.lines().next().unwrap_or("");
    Ok(first_line.trim().to_owned())
}
