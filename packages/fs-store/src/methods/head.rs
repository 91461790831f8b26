use std::time::SystemTime;

use http::header::{
    CONTENT_LOCATION, CONTENT_LENGTH, CONTENT_TYPE, IF_MODIFIED_SINCE, IF_UNMODIFIED_SINCE,
    LAST_MODIFIED, LINK,
};
use http::{HeaderName, HeaderValue, StatusCode};
use httpfs_core::headers::header_str;
use httpfs_core::{Request, Response};

use crate::error::Result;
use crate::listing::{unix_seconds, LISTING_CONTENT_TYPE};
use crate::store::{FetchOptions, FsStore};

/// Seconds since the epoch named by a date header, if it parses.
fn date_header(request: &Request, name: HeaderName) -> Option<u64> {
    let value = header_str(request.headers(), name)?;
    httpdate::parse_http_date(value).ok().map(unix_seconds)
}

pub(crate) fn http_date(modified: SystemTime) -> Result<HeaderValue> {
    Ok(HeaderValue::from_str(&httpdate::fmt_http_date(modified))?)
}

/// Status, headers and links of the resolved target.
///
/// Conditions compare whole seconds, the resolution of an HTTP date.
/// `If-Unmodified-Since` is evaluated first.
pub(crate) async fn handle(
    store: &FsStore,
    request: Request,
    options: FetchOptions,
) -> Result<Response> {
    let resolved = store.resolve(&request).await?;
    let Some(stat) = resolved.stat else {
        return Ok(store.response(StatusCode::NOT_FOUND));
    };

    let modified = unix_seconds(stat.modified);
    let last_modified = http_date(stat.modified)?;
    if let Some(since) = date_header(&request, IF_UNMODIFIED_SINCE) {
        if modified > since {
            return Ok(store
                .response(StatusCode::PRECONDITION_FAILED)
                .with_header(LAST_MODIFIED, last_modified));
        }
    }
    if let Some(since) = date_header(&request, IF_MODIFIED_SINCE) {
        if modified <= since {
            return Ok(store
                .response(StatusCode::NOT_MODIFIED)
                .with_header(LAST_MODIFIED, last_modified));
        }
    }

    let links = if options.skip_links {
        Vec::new()
    } else {
        store
            .links
            .discover(store, &request, resolved.content_location.as_ref(), &stat)
            .await?
    };

    let target = resolved.target(&request);
    let mut response = store
        .response(StatusCode::OK)
        .with_header(LAST_MODIFIED, last_modified);

    let content_type = if stat.is_dir() {
        Some(LISTING_CONTENT_TYPE.to_string())
    } else {
        response = response.with_header(CONTENT_LENGTH, HeaderValue::from(stat.size));
        let path = store.path(target)?;
        store.content_types.content_type(&request, &path)
    };
    if let Some(content_type) = content_type {
        response = response.with_header(CONTENT_TYPE, HeaderValue::from_str(&content_type)?);
    }
    if let Some(content_location) = &resolved.content_location {
        response = response.with_header(
            CONTENT_LOCATION,
            HeaderValue::from_str(content_location.as_str())?,
        );
    }
    for link in links {
        response = response.with_appended_header(LINK, HeaderValue::from_str(&link.to_string())?);
    }
    Ok(response)
}
