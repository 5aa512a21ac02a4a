use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Writes `bytes` next to `path` under a hidden temporary name, then renames
/// it over `path`. Readers see either the old file or the new one.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }

    let staged = staging_path(path);
    fs::write(&staged, bytes).map_err(|e| Error::io(&staged, e))?;

    if let Err(e) = fs::rename(&staged, path) {
        let _ = fs::remove_file(&staged);
        return Err(Error::io(path, e));
    }

    Ok(())
}

/// `dir/.name.tmp`: the leading dot and trailing `.tmp` keep the staged file
/// out of suffix-based scans of the same directory.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or(OsStr::new("autoloc")));
    name.push(".tmp");
    path.with_file_name(name)
}
