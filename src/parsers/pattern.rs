use std::path::PathBuf;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::block::Block;

const REQUIRED_GROUPS: [&str; 3] = ["block", "key", "value"];

/// Decoded content of one source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

/// Compiled capture pattern with `block`, `key` and `value` groups.
#[derive(Debug, Clone)]
pub struct BlockPattern {
    re: Regex,
}

impl BlockPattern {
    pub fn new(source: &str) -> Result<Self> {
        let re = Regex::new(source).map_err(|e| Error::Pattern(e.to_string()))?;

        for group in REQUIRED_GROUPS {
            if !re.capture_names().flatten().any(|name| name == group) {
                return Err(Error::Pattern(format!(
                    "missing named group `{group}` in {source}"
                )));
            }
        }

        Ok(BlockPattern { re })
    }

    pub fn as_str(&self) -> &str {
        self.re.as_str()
    }

    /// All matches of the pattern in `text`, left to right.
    pub fn extract_text(&self, text: &str) -> Vec<Block> {
        let mut blocks = Vec::new();

        for caps in self.re.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            // Optional groups that did not take part fall back to the whole match / empty text.
            let block = caps.name("block").unwrap_or(whole);
            let key = caps.name("key").map(|m| m.as_str()).unwrap_or("");

            match caps.name("value") {
                Some(value) if value.start() >= block.start() && value.end() <= block.end() => {
                    blocks.push(Block {
                        raw: block.as_str().to_string(),
                        key: key.to_string(),
                        value: value.as_str().to_string(),
                        value_at: value.start() - block.start(),
                    });
                }
                Some(value) => blocks.push(Block::new(block.as_str(), key, value.as_str())),
                None => blocks.push(Block::new(block.as_str(), key, "")),
            }
        }

        blocks
    }
}

/// Blocks of every file, in file order then match order.
pub fn extract(files: &[SourceFile], pattern: &BlockPattern) -> Vec<Block> {
    files
        .iter()
        .flat_map(|file| pattern.extract_text(&file.content))
        .collect()
}
