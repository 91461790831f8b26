use std::io;
use std::path::{Path, PathBuf};

use httpfs_core::Error as StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Path escapes the store root: {path}")]
    PathSecurity { path: String },

    #[error("One of a root path or a custom path resolver is required")]
    MissingRoot,

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("Multipart error: {0}")]
    Multipart(#[from] multer::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No unused name in {container} after {attempts} attempts")]
    NameExhausted { container: String, attempts: u32 },

    #[error("Upstream store error: {0}")]
    Upstream(#[from] StoreError),
}

impl Error {
    pub fn path_security(path: impl Into<String>) -> Self {
        Error::PathSecurity { path: path.into() }
    }

    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        match error {
            Error::PathSecurity { path } => StoreError::PathSecurity { path },
            Error::Upstream(error) => error,
            Error::Io { source, .. } => StoreError::Io(source),
            other => StoreError::ImplementationFailure {
                message: other.to_string(),
            },
        }
    }
}
