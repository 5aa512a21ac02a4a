use serde::{Deserialize, Serialize};

/// One translatable unit cut out of a source file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Block {
    /// Full span of the unit, comments and delimiters included.
    pub raw: String,

    pub key: String,

    pub value: String,

    /// Byte offset of `value` inside `raw`.
    #[serde(default)]
    pub value_at: usize,
}

impl Block {
    /// Builds a block whose value sits at its last occurrence in `raw`.
    pub fn new(raw: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = value.into();
        let value_at = raw.rfind(&value).unwrap_or(raw.len());

        Block {
            raw,
            key: key.into(),
            value,
            value_at,
        }
    }

    /// Identity across runs: key and value, nothing else.
    pub fn same_as(&self, other: &Block) -> bool {
        self.key == other.key && self.value == other.value
    }
}
