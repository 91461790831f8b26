use httpfs_core::headers::is_content_type;
use httpfs_core::{Method, Request, Response};

use crate::content_location::find_available_member;
use crate::error::Result;
use crate::multipart;
use crate::store::{FetchOptions, FsStore};

/// Create a member of the container the request addresses.
///
/// A `multipart/form-data` body becomes one PUT per part. Any other body is
/// PUT under a fresh name, unless the content-location override picks one.
pub(crate) async fn handle(store: &FsStore, request: Request) -> Result<Response> {
    if is_content_type(request.headers(), "multipart/form-data") {
        return multipart::handle(store, request).await;
    }

    let context = store.context();
    let location = match store.locations.override_location(&request, &context).await? {
        Some(location) => location,
        None => find_available_member(request.url(), &context, store.max_name_attempts).await?,
    };
    log::debug!("POST {} creates {}", request.url(), location);

    let put = Request::new(Method::Put, location).with_headers(request.headers().clone());
    let put = match request.into_body() {
        Some(body) => put.with_body(body),
        None => put,
    };
    store.fetch_with(put, FetchOptions::default()).await
}
