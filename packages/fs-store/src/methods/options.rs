use http::header::ALLOW;
use http::StatusCode;
use httpfs_core::Response;

use crate::error::Result;
use crate::store::FsStore;

/// The enabled verbs, and nothing else.
pub(crate) fn handle(store: &FsStore) -> Result<Response> {
    Ok(store
        .response(StatusCode::OK)
        .with_header(ALLOW, store.allow_header()?))
}
