use async_trait::async_trait;
use httpfs_core::{Error as StoreError, Method, Request, Response, Store, Url};

use crate::methods::without_entity_headers;

/// Fetches a COPY source that lives outside this store.
#[async_trait]
pub trait ExternalResolver: Send + Sync {
    async fn fetch_external(&self, url: &Url, request: &Request) -> Result<Response, StoreError>;
}

/// Any store resolves external sources with a plain GET, carrying the COPY
/// request's headers minus its entity headers and `Source`.
#[async_trait]
impl<S: Store + ?Sized> ExternalResolver for S {
    async fn fetch_external(&self, url: &Url, request: &Request) -> Result<Response, StoreError> {
        let headers = without_entity_headers(request.headers(), &["source"]);
        self.fetch(Request::new(Method::Get, url.clone()).with_headers(headers))
            .await
    }
}
