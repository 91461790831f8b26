use http::header::{CONTENT_LOCATION, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED, LOCATION};
use http::{HeaderValue, StatusCode};
use httpfs_core::{Method, Request, Response};

use super::head::http_date;
use crate::error::{Error, Result};
use crate::fs::Primitive;
use crate::store::{FetchOptions, FsStore};

pub(crate) async fn handle(store: &FsStore, request: Request) -> Result<Response> {
    let resolved = store.resolve(&request).await?;
    let target = resolved.target(&request).clone();

    // Existence check only; conditions meant for reads do not apply.
    let mut probe_headers = request.headers().clone();
    probe_headers.remove(IF_MODIFIED_SINCE);
    probe_headers.remove(IF_NONE_MATCH);
    let probe = Request::new(Method::Head, target.clone()).with_headers(probe_headers);
    let head = store.fetch_with(probe, FetchOptions::probe()).await?;
    if !head.is_ok() && head.status() != StatusCode::NOT_FOUND {
        return Ok(head);
    }

    if target.path().ends_with('/') || resolved.stat.is_some_and(|stat| stat.is_dir()) {
        return store.warning(StatusCode::BAD_REQUEST, "Cannot write to directory");
    }

    let path = store.path(&target)?;
    if let Some(parent) = path.parent() {
        match store.stat_path(parent).await? {
            Some(stat) if stat.is_dir() => {}
            Some(_) => {
                return store.warning(StatusCode::BAD_REQUEST, "Parent is not a directory");
            }
            None => {
                if !store.capabilities().contains(Primitive::CreateDirAll) {
                    log::warn!("cannot create {}: filesystem has no create_dir_all", parent.display());
                    return store.warning(
                        StatusCode::NOT_IMPLEMENTED,
                        "Creating directories is not supported",
                    );
                }
                store
                    .fs()
                    .create_dir_all(parent)
                    .await
                    .map_err(|source| Error::io(parent, source))?;
            }
        }
    }

    let body = request.body().cloned().unwrap_or_default();
    store
        .fs()
        .write_file(&path, body)
        .await
        .map_err(|source| Error::io(&path, source))?;

    let written = match store.stat_path(&path).await? {
        Some(stat) if stat.is_file() => stat,
        _ => return store.warning(StatusCode::INTERNAL_SERVER_ERROR, "Could not save file"),
    };

    let created = head.status() == StatusCode::NOT_FOUND;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::NO_CONTENT
    };
    let mut response = store
        .response(status)
        .with_header(LAST_MODIFIED, http_date(written.modified)?);
    if created {
        response = response.with_header(LOCATION, HeaderValue::from_str(request.url().as_str())?);
    }
    if let Some(content_location) = &resolved.content_location {
        response = response.with_header(
            CONTENT_LOCATION,
            HeaderValue::from_str(content_location.as_str())?,
        );
    }
    Ok(response)
}
