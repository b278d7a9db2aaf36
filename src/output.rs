//! Artifact file naming and saving.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::AdapterError;

/// Prefix of every generated image filename.
pub const FILENAME_PREFIX: &str = "dream_py_";

/// Filename for an image generated at `timestamp` (unix seconds).
///
/// Two generations within the same second share a name; the later one wins.
#[must_use]
pub fn artifact_filename(timestamp: u64) -> String {
    format!("{FILENAME_PREFIX}{timestamp}.png")
}

/// Current unix time in whole seconds.
#[must_use]
pub fn unix_timestamp() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Write image bytes into `output_dir`, creating the directory if needed.
///
/// Returns the path of the written file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be written.
pub fn save_image(
    output_dir: &Path,
    filename: &str,
    data: &[u8],
) -> Result<PathBuf, AdapterError> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(filename);
    std::fs::write(&path, data)?;
    Ok(path)
}
