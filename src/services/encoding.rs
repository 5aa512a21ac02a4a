use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

use crate::error::{Error, Result};

/// Reads a source file as text whatever its encoding.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    let (text, encoding) = decode(&bytes);

    if encoding != UTF_8 {
        tracing::debug!(
            event = "source_decoded",
            path = %path.display(),
            encoding = encoding.name()
        );
    }

    Ok(text)
}

/// Decodes `bytes`, honouring a BOM and otherwise guessing the encoding.
pub fn decode(bytes: &[u8]) -> (String, &'static Encoding) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (text.into_owned(), encoding);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), UTF_8);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);

    let (text, _, _) = encoding.decode(bytes);
    (text.into_owned(), encoding)
}
