use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::block::Block;
use crate::services::atomic::write_atomic;

/// Copy of `block` with its value replaced by `translated`; every other
/// character of the span is preserved.
pub fn splice(block: &Block, translated: &str) -> Block {
    let start = block.value_at.min(block.raw.len());
    let end = (start + block.value.len()).min(block.raw.len());

    let mut raw = String::with_capacity(block.raw.len() + translated.len());
    raw.push_str(&block.raw[..start]);
    raw.push_str(translated);
    raw.push_str(&block.raw[end..]);

    Block {
        raw,
        key: block.key.clone(),
        value: translated.to_string(),
        value_at: start,
    }
}

pub fn render(blocks: &[Block]) -> String {
    let mut out = String::new();
    for b in blocks {
        out.push_str(&b.raw);
        out.push('\n');
    }
    out
}

/// Replaces the resource at `path`; an interrupted write leaves the previous
/// file in place.
pub fn write(blocks: &[Block], path: &Path) -> Result<()> {
    write_atomic(path, render(blocks).as_bytes())
}

/// `<dir>/<source>-<target>.<suffix>`
pub fn output_path(dir: &Path, source: &str, target: &str, suffix: &str) -> PathBuf {
    let ext = suffix.trim_start_matches('.');
    dir.join(format!("{source}-{target}.{ext}"))
}
