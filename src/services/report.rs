use std::path::PathBuf;

use serde::Serialize;

/// What one tick did.
#[derive(Debug, Default, Serialize)]
pub struct TickReport {
    pub changed_files: usize,
    pub removed_files: usize,
    pub extracted: usize,
    pub translated: usize,
    pub source_lang: Option<String>,
    pub written: Vec<PathBuf>,
}

impl TickReport {
    /// Nothing changed on disk, so nothing was extracted or written.
    pub fn is_idle(&self) -> bool {
        self.changed_files == 0 && self.removed_files == 0 && self.written.is_empty()
    }
}
