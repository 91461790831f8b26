use http::StatusCode;
use httpfs_core::{Method, Request, Response};

use crate::error::{Error, Result};
use crate::fs::Primitive;
use crate::links::LinkRelation;
use crate::store::{FetchOptions, FsStore};

/// Remove the target, then every dependent it links to.
///
/// Dependents are deleted through the dispatcher after the target is gone.
/// A failed dependent does not undo anything: the response stays 204 and
/// names the first failure in a `Warning` header.
pub(crate) async fn handle(store: &FsStore, request: Request) -> Result<Response> {
    let resolved = store.resolve(&request).await?;
    let target = resolved.target(&request).clone();

    let probe = Request::new(Method::Head, target.clone()).with_headers(request.headers().clone());
    let head = store.fetch_with(probe, FetchOptions::probe()).await?;
    if !head.is_ok() {
        return Ok(head);
    }
    let Some(stat) = resolved.stat else {
        return Ok(store.response(StatusCode::NOT_FOUND));
    };

    let links = store
        .links
        .discover(store, &request, resolved.content_location.as_ref(), &stat)
        .await?;

    let path = store.path(&target)?;
    if stat.is_dir() {
        if !store.capabilities().contains(Primitive::RemoveDirAll) {
            log::warn!("cannot remove {}: filesystem has no remove_dir_all", path.display());
            return store.warning(
                StatusCode::NOT_IMPLEMENTED,
                "Removing a directory is not supported",
            );
        }
        store
            .fs()
            .remove_dir_all(&path)
            .await
            .map_err(|source| Error::io(&path, source))?;
    } else {
        store
            .fs()
            .unlink(&path)
            .await
            .map_err(|source| Error::io(&path, source))?;
    }

    let mut first_failure: Option<LinkRelation> = None;
    for link in links.into_iter().filter(|link| store.dependents.is_dependent(link)) {
        let cascade = Request::new(Method::Delete, link.target.clone());
        match store.fetch_with(cascade, FetchOptions::default()).await {
            Ok(response) if response.is_ok() || response.status() == StatusCode::NOT_FOUND => {
                log::debug!("deleted dependent {}", link);
            }
            Ok(response) => {
                log::warn!("deleting dependent {} answered {}", link.target, response.status());
                first_failure.get_or_insert(link);
            }
            Err(error) => {
                log::warn!("deleting dependent {} failed: {}", link.target, error);
                first_failure.get_or_insert(link);
            }
        }
    }

    match first_failure {
        Some(link) => store.warning(
            StatusCode::NO_CONTENT,
            &format!("Could not delete dependent {}", link.target),
        ),
        None => Ok(store.response(StatusCode::NO_CONTENT)),
    }
}
