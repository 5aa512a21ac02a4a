use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::block::Block;

/// Blocks seen in the main language and their translations, position-aligned.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Cache {
    #[serde(default)]
    pub main: Vec<Block>,

    #[serde(default)]
    pub languages: BTreeMap<String, Vec<Block>>,

    /// Source language of the last merge, configured or detected.
    #[serde(default)]
    pub source_lang: Option<String>,
}

impl Cache {
    pub fn language(&self, lang: &str) -> &[Block] {
        self.languages.get(lang).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `lang` has one translation per main entry.
    pub fn is_aligned(&self, lang: &str) -> bool {
        self.language(lang).len() == self.main.len()
    }
}
