//! Input discovery.

use std::path::{Path, PathBuf};

use crate::{PipelineError, Result};

/// Lists the regular files in `dir` whose extension matches `extension`.
///
/// Matching ignores ASCII case and a leading dot in `extension`. The result
/// is sorted so runs visit files in a stable order. Subdirectories are not
/// descended into.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn scan_input_dir(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let wanted = extension.trim_start_matches('.');
    let scan_err = |source| PipelineError::Scan {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(scan_err)? {
        let entry = entry.map_err(scan_err)?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted));
        if matches && path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
