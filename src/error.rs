use std::path::PathBuf;

use thiserror::Error;

use crate::services::backend::BackendError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid block pattern: {0}")]
    Pattern(String),

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("cache store error: {0}")]
    CacheStore(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let err = Error::io(
            "locale/en.po",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("locale/en.po"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn backend_errors_convert_transparently() {
        let err: Error = BackendError::Quota("daily limit".into()).into();
        assert_eq!(err.to_string(), "translation quota exceeded: daily limit");
    }
}
