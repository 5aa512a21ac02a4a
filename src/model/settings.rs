use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::parsers::catalog;

fn default_api_service() -> String {
    "yandex".to_string()
}

fn default_root_path() -> String {
    ".".to_string()
}

fn default_resource_path() -> String {
    "resources".to_string()
}

fn default_suffix() -> String {
    ".po".to_string()
}

fn default_watch_delay_ms() -> u64 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_api_service", alias = "apiservice")]
    pub api_service: String,

    #[serde(default, alias = "apikey")]
    pub api_key: String,

    #[serde(default = "default_root_path", alias = "rootpath")]
    pub root_path: String,

    #[serde(default = "default_resource_path")]
    pub resource_path: String,

    #[serde(default = "default_suffix")]
    pub suffix: String,

    /// Empty means "detect from the extracted text".
    #[serde(default)]
    pub main_lang: String,

    #[serde(default)]
    pub to_langs: Vec<String>,

    /// Suffix to capture pattern; entries override the built-in ones.
    #[serde(default, alias = "parse_regexp")]
    pub patterns: BTreeMap<String, String>,

    #[serde(default = "default_watch_delay_ms")]
    pub watch_delay_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub cache_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_service: default_api_service(),
            api_key: String::new(),
            root_path: default_root_path(),
            resource_path: default_resource_path(),
            suffix: default_suffix(),
            main_lang: String::new(),
            to_langs: Vec::new(),
            patterns: BTreeMap::new(),
            watch_delay_ms: default_watch_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            cache_path: None,
        }
    }
}

impl Settings {
    pub fn main_lang(&self) -> Option<&str> {
        let lang = self.main_lang.trim();
        if lang.is_empty() {
            None
        } else {
            Some(lang)
        }
    }

    /// Capture pattern for the configured suffix, user entries first.
    pub fn pattern_source(&self) -> Option<String> {
        self.patterns
            .get(&self.suffix)
            .cloned()
            .or_else(|| catalog::builtin_pattern(&self.suffix).map(str::to_string))
    }

    pub fn root_dir(&self) -> PathBuf {
        PathBuf::from(&self.root_path)
    }

    pub fn resource_dir(&self) -> PathBuf {
        PathBuf::from(&self.resource_path)
    }

    pub fn watch_delay(&self) -> Duration {
        Duration::from_millis(self.watch_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
