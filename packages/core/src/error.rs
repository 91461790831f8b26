/// Faults raised while answering a request.
///
/// Non-2xx statuses are ordinary [`Response`](crate::Response) values. An
/// `Error` means the request could not be answered at all.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Path escapes the store root: {path}")]
    PathSecurity { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid HTTP method: {method}")]
    InvalidMethod { method: String },

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("Store implementation failure: {message}")]
    ImplementationFailure { message: String },
}

impl Error {
    pub fn path_security(path: impl Into<String>) -> Self {
        Error::PathSecurity { path: path.into() }
    }

    pub fn implementation(message: impl Into<String>) -> Self {
        Error::ImplementationFailure {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_security_display_names_path() {
        let e = Error::path_security("/a/../b");
        assert!(e.to_string().contains("/a/../b"));
    }

    #[test]
    fn io_error_converts() {
        let e: Error = std::io::Error::other("disk on fire").into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("disk on fire"));
    }
}
