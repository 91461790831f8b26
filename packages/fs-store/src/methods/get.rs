use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use httpfs_core::{Method, Request, Response};

use crate::error::{Error, Result};
use crate::fs::Primitive;
use crate::listing::{self, LISTING_CONTENT_TYPE};
use crate::store::{FetchOptions, FsStore};

pub(crate) async fn handle(store: &FsStore, request: Request) -> Result<Response> {
    let resolved = store.resolve(&request).await?;

    // Same URL, same resolution: the HEAD evaluates conditions and links
    // for the target resolved above.
    let head_request = request.clone().with_method(Method::Head).without_body();
    let head = store
        .fetch_with(head_request, FetchOptions::internal())
        .await?;
    if !head.is_ok() {
        return Ok(head);
    }
    let Some(stat) = resolved.stat else {
        return Ok(store.response(StatusCode::NOT_FOUND));
    };
    let target = resolved.target(&request);

    if stat.is_dir() {
        if !store.capabilities().contains(Primitive::ReadDir) {
            log::warn!("cannot list {}: filesystem has no read_dir", target);
            return store.warning(
                StatusCode::NOT_IMPLEMENTED,
                "Listing a directory is not supported",
            );
        }
        let body = listing::render(store, &request, target, &stat).await?;
        return Ok(store
            .response(StatusCode::OK)
            .with_headers(head.headers().clone())
            .with_header(CONTENT_TYPE, HeaderValue::from_static(LISTING_CONTENT_TYPE))
            .with_header(CONTENT_LENGTH, HeaderValue::from(body.len()))
            .with_body(body));
    }

    let path = store.path(target)?;
    let body = store
        .fs()
        .read_file(&path)
        .await
        .map_err(|source| Error::io(&path, source))?;

    let mut response = store
        .response(StatusCode::OK)
        .with_headers(head.headers().clone())
        .with_header(CONTENT_LENGTH, HeaderValue::from(body.len()));
    if let Some(refined) = store.content_types.refine(&request, &path, &body) {
        response = response.with_header(CONTENT_TYPE, HeaderValue::from_str(&refined)?);
    }
    Ok(response.with_body(body))
}
