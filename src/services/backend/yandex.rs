use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use super::{http_client, snippet, BackendError, TranslationBackend};

const TRANSLATE_URL: &str = "https://translate.yandex.net/api/v1.5/tr.json/translate";
const DETECT_URL: &str = "https://translate.yandex.net/api/v1.5/tr.json/detect";

/// Primary provider: Yandex Translate JSON API v1.5.
pub struct Yandex {
    client: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct Reply {
    code: Option<u16>,
    message: Option<String>,
    lang: Option<String>,
    text: Option<Vec<String>>,
}

impl Yandex {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Yandex {
            client: http_client(timeout)?,
            api_key: api_key.to_string(),
        })
    }

    fn post(&self, url: &str, params: &[(&str, &str)]) -> Result<(u16, String), BackendError> {
        let resp = self.client.post(url).form(params).send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;
        Ok((status, body))
    }
}

impl TranslationBackend for Yandex {
    fn translate(
        &self,
        texts: &[String],
        source: &str,
        target: &str,
    ) -> Result<Vec<String>, BackendError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let lang = format!("{source}-{target}");
        let mut params = vec![("key", self.api_key.as_str()), ("lang", lang.as_str())];
        params.extend(texts.iter().map(|t| ("text", t.as_str())));

        let (status, body) = self.post(TRANSLATE_URL, &params)?;
        decode_translate(status, &body)
    }

    fn detect_language(&self, sample: &[String]) -> Result<String, BackendError> {
        let text = sample.join("\n");
        let params = [("key", self.api_key.as_str()), ("text", text.as_str())];

        let (status, body) = self.post(DETECT_URL, &params)?;
        decode_detect(status, &body)
    }
}

fn error_for(code: u16, message: String) -> BackendError {
    match code {
        401 | 402 => BackendError::Auth(message),
        404 => BackendError::Quota(message),
        413 => BackendError::PayloadTooLarge(message),
        422 => BackendError::Untranslatable(message),
        501 => BackendError::UnsupportedLanguagePair(message),
        _ => BackendError::Status { code, message },
    }
}

/// Parses a reply and turns any non-200 code into its error kind.
fn checked_reply(status: u16, body: &str) -> Result<Reply, BackendError> {
    let reply: Reply = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) if status == 200 => return Err(BackendError::MalformedResponse(e.to_string())),
        Err(_) => return Err(error_for(status, snippet(body))),
    };

    let code = reply.code.unwrap_or(status);
    if code != 200 {
        let message = reply.message.clone().unwrap_or_else(|| snippet(body));
        return Err(error_for(code, message));
    }

    Ok(reply)
}

pub fn decode_translate(status: u16, body: &str) -> Result<Vec<String>, BackendError> {
    let reply = checked_reply(status, body)?;

    let text = reply
        .text
        .ok_or_else(|| BackendError::MalformedResponse("missing `text`".into()))?;

    Ok(text.into_iter().map(|t| t.trim().to_string()).collect())
}

pub fn decode_detect(status: u16, body: &str) -> Result<String, BackendError> {
    let reply = checked_reply(status, body)?;

    match reply.lang {
        Some(lang) if !lang.trim().is_empty() => Ok(lang.trim().to_string()),
        _ => Err(BackendError::DetectionFailed),
    }
}
