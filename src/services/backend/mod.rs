//! Translation providers behind one contract.
//!
//! Every provider turns an ordered list of strings into an ordered list of
//! translations of the same length, and can guess the language of a sample.
//! Provider-specific status codes are folded into [`BackendError`] by each
//! adapter's `decode_*` functions, so callers never branch on the provider.

pub mod google;
pub mod yandex;

use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

use crate::error::{Error, Result};
use crate::model::settings::Settings;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("credential rejected: {0}")]
    Auth(String),

    #[error("translation quota exceeded: {0}")]
    Quota(String),

    #[error("request too large: {0}")]
    PayloadTooLarge(String),

    #[error("text cannot be translated: {0}")]
    Untranslatable(String),

    #[error("unsupported language pair: {0}")]
    UnsupportedLanguagePair(String),

    #[error("source language could not be detected")]
    DetectionFailed,

    #[error("expected {expected} translations, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("provider returned status {code}: {message}")]
    Status { code: u16, message: String },
}

pub trait TranslationBackend {
    /// Translates `texts` from `source` to `target`, keeping order and length.
    fn translate(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> std::result::Result<Vec<String>, BackendError>;

    /// Guesses the language of `sample`.
    fn detect_language(&self, sample: &[String]) -> std::result::Result<String, BackendError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Yandex,
    Google,
}

impl Provider {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "yandex" => Some(Provider::Yandex),
            "google" => Some(Provider::Google),
            _ => None,
        }
    }
}

pub fn backend_for(settings: &Settings) -> Result<Box<dyn TranslationBackend>> {
    let provider = Provider::from_name(&settings.api_service).ok_or_else(|| {
        Error::Settings(format!(
            "unsupported api_service `{}`",
            settings.api_service
        ))
    })?;

    let timeout = settings.request_timeout();
    let backend: Box<dyn TranslationBackend> = match provider {
        Provider::Yandex => Box::new(yandex::Yandex::new(&settings.api_key, timeout)?),
        Provider::Google => Box::new(google::Google::new(&settings.api_key, timeout)?),
    };

    Ok(backend)
}

pub(crate) fn http_client(timeout: Duration) -> std::result::Result<Client, BackendError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Start of a response body, for error messages.
pub(crate) fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > 400 {
        let head: String = trimmed.chars().take(400).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}
