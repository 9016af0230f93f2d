//! Locating per-collection result files under an analysis output tree.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use vinyx_common::error::{Result, VinyxError};

/// File name written by the analyze job for each collection.
pub const RESULT_FILE_NAME: &str = "output.txt";

/// File name of the filtered, sorted copy written next to each result file.
pub const FILTERED_FILE_NAME: &str = "output_top.csv";

/// Recursively find every `output.txt` under `root`.
///
/// Paths are returned sorted so that file indices, and with them the merge
/// tie-break order, are the same on every run.
pub fn find_result_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(VinyxError::Config(format!(
            "input directory not found: {}",
            root.display()
        )));
    }

    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| VinyxError::io(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| VinyxError::io(&dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| VinyxError::io(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && entry.file_name() == RESULT_FILE_NAME {
                debug!("Found result file {}", path.display());
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Where the filtered copy of `result_file` lives.
pub fn filtered_path_for(result_file: &Path) -> PathBuf {
    result_file.with_file_name(FILTERED_FILE_NAME)
}
