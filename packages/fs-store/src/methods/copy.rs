use http::header::{CONTENT_LOCATION, LOCATION};
use http::{HeaderValue, StatusCode};
use httpfs_core::headers::header_str;
use httpfs_core::{Method, Request, Response};
use url::Url;

use super::without_entity_headers;
use crate::error::Result;
use crate::store::{FetchOptions, FsStore};

const SOURCE: &str = "source";

fn is_local(source: &str) -> bool {
    source.starts_with('.') || source.starts_with('/')
}

/// Copy `Source` onto the request URL.
///
/// A local source is read with an unlocked GET. Taking its read lock while
/// holding the destination's write lock could deadlock against a COPY going
/// the other way.
pub(crate) async fn handle(store: &FsStore, request: Request) -> Result<Response> {
    let Some(source) = header_str(request.headers(), SOURCE).map(str::to_string) else {
        return store.warning(StatusCode::BAD_REQUEST, "Source header missing");
    };

    let source_response = if is_local(&source) {
        let source_url = request.url().join(&source)?;
        let source_request = Request::new(Method::Get, source_url.clone())
            .with_headers(without_entity_headers(request.headers(), &[SOURCE]));

        let source_resolved = store.resolve(&source_request).await?;
        let destination = store.resolve(&request).await?;
        let source_is_dir = source_url.path().ends_with('/')
            || source_resolved.stat.is_some_and(|stat| stat.is_dir());
        let destination_is_dir = request.url().path().ends_with('/')
            || destination.stat.is_some_and(|stat| stat.is_dir());
        if source_is_dir != destination_is_dir {
            return store.warning(
                StatusCode::BAD_REQUEST,
                "Source and destination must both be files or both be directories",
            );
        }
        if source_is_dir {
            return store.warning(StatusCode::NOT_IMPLEMENTED, "Copying a directory is not supported");
        }

        store
            .fetch_with(source_request, FetchOptions::internal())
            .await?
    } else {
        let Some(external) = &store.external else {
            log::warn!("no external resolver for COPY source {}", source);
            return store.warning(
                StatusCode::NOT_IMPLEMENTED,
                "External sources are not supported",
            );
        };
        let Ok(source_url) = Url::parse(&source) else {
            return store.warning(StatusCode::BAD_REQUEST, "Source must be an absolute URL");
        };
        let destination = store.resolve(&request).await?;
        if request.url().path().ends_with('/')
            || destination.stat.is_some_and(|stat| stat.is_dir())
        {
            return store.warning(StatusCode::BAD_REQUEST, "Cannot copy onto a directory");
        }
        external.fetch_external(&source_url, &request).await?
    };

    if !source_response.is_ok() {
        return Ok(source_response);
    }

    // The destination takes the source's entity headers in place of ours.
    let mut headers = request.headers().clone();
    headers.remove(SOURCE);
    let source_headers = source_response.headers();
    for name in source_headers.keys() {
        if name.as_str().starts_with("content-") && *name != CONTENT_LOCATION {
            headers.remove(name);
        }
    }
    for (name, value) in source_headers {
        if name.as_str().starts_with("content-") && *name != CONTENT_LOCATION {
            headers.append(name.clone(), value.clone());
        }
    }

    let body = source_response.body().cloned().unwrap_or_default();
    let put = Request::new(Method::Put, request.url().clone())
        .with_headers(headers)
        .with_body(body);
    let put_response = store.fetch_with(put, FetchOptions::internal()).await?;
    if !put_response.is_ok() {
        return Ok(put_response);
    }

    Ok(store
        .response(StatusCode::CREATED)
        .with_header(LOCATION, HeaderValue::from_str(request.url().as_str())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_and_absolute_paths_are_local() {
        assert!(is_local("./a.txt"));
        assert!(is_local("../a.txt"));
        assert!(is_local("/a.txt"));
        assert!(!is_local("https://elsewhere.test/a.txt"));
    }
}
