use std::path::Path;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use httpfs_core::headers::header_str;
use httpfs_core::{Method, Request};

use crate::media;

/// Derives the `Content-Type` of a stored resource.
pub trait ContentTypeResolver: Send + Sync {
    /// Content type from the request and resolved path alone.
    fn content_type(&self, request: &Request, path: &Path) -> Option<String>;

    /// Content type once the body has been read. `None` keeps the
    /// headers-only answer.
    fn refine(&self, _request: &Request, _path: &Path, _body: &Bytes) -> Option<String> {
        None
    }
}

/// The caller's own `Content-Type` if one was sent, else the media type of
/// the path's extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionContentType;

impl ContentTypeResolver for ExtensionContentType {
    fn content_type(&self, request: &Request, path: &Path) -> Option<String> {
        if !matches!(request.method(), Method::Head | Method::Get) {
            return None;
        }
        if let Some(provided) = header_str(request.headers(), CONTENT_TYPE) {
            return Some(provided.to_string());
        }
        media::lookup(&path.to_string_lossy()).map(str::to_string)
    }
}
