//! Utility functions for Sprig.

use std::fs;
use std::path::Path;

use crate::error::{Result, SprigError};

/// Maximum size of a single plant record file (1 MB).
///
/// Plant records are a few hundred bytes; anything near this limit is not a
/// record Sprig wrote.
pub const MAX_RECORD_SIZE: u64 = 1024 * 1024;

/// Read a file into a string, refusing files larger than `max_size` bytes.
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read (doesn't exist, permission denied, etc.)
/// * The file exceeds `max_size`
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| SprigError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(SprigError::storage(
            path,
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("file is too large ({} bytes, max {} bytes)", size, max_size),
            ),
        ));
    }

    fs::read_to_string(path).map_err(|e| SprigError::storage(path, e))
}

/// Read a plant record file with the default size limit.
pub fn read_record(path: &Path) -> Result<String> {
    read_to_string_with_limit(path, MAX_RECORD_SIZE)
}
