//! Splitting a `multipart/form-data` POST into one PUT per part.

use std::convert::Infallible;

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use httpfs_core::headers::{header_str, ENTITY_HEADERS};
use httpfs_core::{Method, Request, Response};

use crate::error::Result;
use crate::path::resolve_in_container;
use crate::store::{FetchOptions, FsStore};

const DEFAULT_PART_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Part {
    pub name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

pub(crate) async fn parse_parts(content_type: &str, body: Bytes) -> Result<Vec<Part>> {
    let boundary = multer::parse_boundary(content_type)?;
    let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = field
            .file_name()
            .or_else(|| field.name())
            .map(str::to_string);
        let content_type = field.content_type().map(|mime| mime.to_string());
        let data = field.bytes().await?;
        parts.push(Part {
            name,
            content_type,
            data,
        });
    }
    Ok(parts)
}

/// PUT every part into the container the request addresses.
///
/// Parts are stored one after another. The first failing PUT is returned as
/// is and parts stored before it stay stored. A part whose name would leave
/// the container is a fault, not a response.
pub(crate) async fn handle(store: &FsStore, request: Request) -> Result<Response> {
    let content_type = header_str(request.headers(), CONTENT_TYPE)
        .unwrap_or_default()
        .to_string();
    let body = request.body().cloned().unwrap_or_default();
    let parts = parse_parts(&content_type, body).await?;
    if parts.is_empty() {
        return store.warning(StatusCode::BAD_REQUEST, "No parts in multipart body");
    }

    let mut base_headers = request.headers().clone();
    for name in ENTITY_HEADERS {
        base_headers.remove(name);
    }

    let single = parts.len() == 1;
    for part in parts {
        let Some(name) = part.name else {
            return store.warning(StatusCode::BAD_REQUEST, "Multipart part has no name");
        };
        let url = resolve_in_container(request.url(), &name)?;

        let mut headers = base_headers.clone();
        let part_type = part.content_type.as_deref().unwrap_or(DEFAULT_PART_TYPE);
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(part_type)?);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(part.data.len()));

        log::debug!("multipart part {:?} -> {}", name, url);
        let put = Request::new(Method::Put, url)
            .with_headers(headers)
            .with_body(part.data);
        let response = store.fetch_with(put, FetchOptions::default()).await?;
        if single || !response.is_ok() {
            return Ok(response);
        }
    }

    Ok(store.response(StatusCode::NO_CONTENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "X-BOUNDARY";

    fn body() -> Bytes {
        Bytes::from(
            "--X-BOUNDARY\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             alpha\r\n\
             --X-BOUNDARY\r\n\
             Content-Disposition: form-data; name=\"b.json\"\r\n\r\n\
             {}\r\n\
             --X-BOUNDARY--\r\n",
        )
    }

    #[tokio::test]
    async fn parses_named_parts() {
        let content_type = format!("multipart/form-data; boundary={}", BOUNDARY);
        let parts = parse_parts(&content_type, body()).await.unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name.as_deref(), Some("a.txt"));
        assert_eq!(parts[0].content_type.as_deref(), Some("text/plain"));
        assert_eq!(parts[0].data.as_ref(), b"alpha");
        assert_eq!(parts[1].name.as_deref(), Some("b.json"));
        assert_eq!(parts[1].content_type, None);
    }

    #[tokio::test]
    async fn missing_boundary_is_an_error() {
        assert!(parse_parts("multipart/form-data", body()).await.is_err());
    }
}
