use sha2::{Digest, Sha256};

use crate::model::settings::Settings;

/// Fingerprint of the settings that give cached blocks their meaning.
pub fn settings_fingerprint(settings: &Settings, pattern: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [
        settings.suffix.as_str(),
        pattern,
        settings.main_lang().unwrap_or(""),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}
