use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use super::{http_client, snippet, BackendError, TranslationBackend};

const TRANSLATE_URL: &str = "https://translation.googleapis.com/language/translate/v2";
const DETECT_URL: &str = "https://translation.googleapis.com/language/translate/v2/detect";

/// Alternate provider: Google Cloud Translation v2 (basic).
pub struct Google {
    client: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct Translations {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct Detections {
    detections: Vec<Vec<Detection>>,
}

#[derive(Debug, Deserialize)]
struct Detection {
    language: String,
    #[serde(default)]
    confidence: f32,
}

impl Google {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Google {
            client: http_client(timeout)?,
            api_key: api_key.to_string(),
        })
    }

    fn post(&self, url: &str, body: &serde_json::Value) -> Result<(u16, String), BackendError> {
        let resp = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()?;
        let status = resp.status().as_u16();
        let text = resp.text()?;
        Ok((status, text))
    }
}

impl TranslationBackend for Google {
    fn translate(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> Result<Vec<String>, BackendError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "q": texts,
            "source": source,
            "target": target,
            "format": "text"
        });

        let (status, text) = self.post(TRANSLATE_URL, &body)?;
        decode_translate(status, &text)
    }

    fn detect_language(&self, sample: &[String]) -> Result<String, BackendError> {
        let (status, text) = self.post(DETECT_URL, &json!({ "q": sample }))?;
        decode_detect(status, &text)
    }
}

fn error_for(status: u16, err: ApiError) -> BackendError {
    let code = if err.code != 0 { err.code } else { status };
    let message = err.message;
    let reasons: Vec<&str> = err.errors.iter().map(|e| e.reason.as_str()).collect();
    let has_reason = |wanted: &dyn Fn(&str) -> bool| reasons.iter().any(|&r| wanted(r));

    // Limit reasons win: quota failures also arrive as 403 PERMISSION_DENIED.
    if code == 429
        || err.status == "RESOURCE_EXHAUSTED"
        || has_reason(&|r| r.ends_with("LimitExceeded") || r == "quotaExceeded")
    {
        return BackendError::Quota(message);
    }

    if code == 401
        || err.status == "UNAUTHENTICATED"
        || err.status == "PERMISSION_DENIED"
        || has_reason(&|r| r == "keyInvalid" || r == "forbidden")
        || message.contains("API key")
    {
        return BackendError::Auth(message);
    }

    if code == 413 || has_reason(&|r| r == "requestTooLarge") {
        return BackendError::PayloadTooLarge(message);
    }

    if code == 400 {
        if message.to_lowercase().contains("language") {
            return BackendError::UnsupportedLanguagePair(message);
        }
        return BackendError::Untranslatable(message);
    }

    BackendError::Status { code, message }
}

/// Unwraps `data`, mapping an `error` object or a failed status to its kind.
fn checked_data<T: for<'de> Deserialize<'de>>(status: u16, body: &str) -> Result<T, BackendError> {
    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) if (200..300).contains(&status) => {
            return Err(BackendError::MalformedResponse(e.to_string()))
        }
        Err(_) => {
            return Err(error_for(
                status,
                ApiError {
                    code: status,
                    message: snippet(body),
                    status: String::new(),
                    errors: Vec::new(),
                },
            ))
        }
    };

    if let Some(err) = envelope.error {
        return Err(error_for(status, err));
    }

    envelope
        .data
        .ok_or_else(|| BackendError::MalformedResponse("missing `data`".into()))
}

pub fn decode_translate(status: u16, body: &str) -> Result<Vec<String>, BackendError> {
    let data: Translations = checked_data(status, body)?;

    Ok(data
        .translations
        .into_iter()
        .map(|t| t.translated_text.trim().to_string())
        .collect())
}

/// Most confident language over the whole sample; `und` does not count.
pub fn decode_detect(status: u16, body: &str) -> Result<String, BackendError> {
    let data: Detections = checked_data(status, body)?;

    data.detections
        .into_iter()
        .flatten()
        .filter(|d| !d.language.is_empty() && d.language != "und")
        .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
        .map(|d| d.language)
        .ok_or(BackendError::DetectionFailed)
}
