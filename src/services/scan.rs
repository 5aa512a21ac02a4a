use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Last observed modification time per qualifying file.
pub type Snapshot = BTreeMap<PathBuf, SystemTime>;

/// Files under `root` ending with `suffix` whose mtime differs from `previous`,
/// plus the snapshot of every qualifying file seen now.
pub fn detect(root: &Path, suffix: &str, previous: &Snapshot) -> Result<(Vec<PathBuf>, Snapshot)> {
    let mut changed = Vec::new();
    let mut snapshot = Snapshot::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            Error::io(path, source)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let qualifies = entry
            .file_name()
            .to_str()
            .map(|name| name.ends_with(suffix))
            .unwrap_or(false);
        if !qualifies {
            continue;
        }

        let path = entry.path().to_path_buf();
        let modified = entry
            .metadata()
            .map_err(|e| {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("metadata unavailable"));
                Error::io(&path, source)
            })?
            .modified()
            .map_err(|e| Error::io(&path, e))?;

        if previous.get(&path) != Some(&modified) {
            changed.push(path.clone());
        }
        snapshot.insert(path, modified);
    }

    tracing::debug!(
        event = "scan_changed",
        root = %root.display(),
        changed = changed.len(),
        seen = snapshot.len()
    );

    Ok((changed, snapshot))
}

/// Paths of `previous` that are gone from `current`.
pub fn removed(previous: &Snapshot, current: &Snapshot) -> Vec<PathBuf> {
    previous
        .keys()
        .filter(|path| !current.contains_key(*path))
        .cloned()
        .collect()
}
