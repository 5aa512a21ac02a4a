use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::model::Cache;
use crate::error::{Error, Result};
use crate::services::atomic::write_atomic;

#[derive(Debug, Serialize, Deserialize)]
struct StoredCache {
    fingerprint: String,
    cache: Cache,
}

/// Loads the cache saved at `path`, or an empty one when it is missing,
/// unreadable or was built under other settings.
pub fn load(path: &Path, fingerprint: &str) -> Cache {
    if !path.exists() {
        return Cache::default();
    }

    let data = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(event = "cache_discarded", path = %path.display(), reason = %e);
            return Cache::default();
        }
    };

    let stored: StoredCache = match serde_json::from_str(&data) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(event = "cache_discarded", path = %path.display(), reason = %e);
            return Cache::default();
        }
    };

    if stored.fingerprint != fingerprint {
        tracing::warn!(
            event = "cache_discarded",
            path = %path.display(),
            reason = "settings changed since the cache was written"
        );
        return Cache::default();
    }

    tracing::info!(
        event = "cache_loaded",
        path = %path.display(),
        blocks = stored.cache.main.len(),
        languages = stored.cache.languages.len()
    );

    stored.cache
}

pub fn save(path: &Path, fingerprint: &str, cache: &Cache) -> Result<()> {
    let stored = StoredCache {
        fingerprint: fingerprint.to_string(),
        cache: cache.clone(),
    };

    let json =
        serde_json::to_string_pretty(&stored).map_err(|e| Error::CacheStore(e.to_string()))?;

    write_atomic(path, json.as_bytes())
}
