use std::sync::Arc;

use async_trait::async_trait;

use crate::{Error, Request, Response};

/// Answers requests.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Arc<dyn Store>`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Handle one request.
    ///
    /// # Returns
    ///
    /// * `Ok(response)` - Any response, including 4xx and 5xx statuses.
    /// * `Err(Error)` - The request could not be answered.
    async fn fetch(&self, request: Request) -> Result<Response, Error>;
}

#[async_trait]
impl<T: Store + ?Sized> Store for Arc<T> {
    async fn fetch(&self, request: Request) -> Result<Response, Error> {
        self.as_ref().fetch(request).await
    }
}

#[async_trait]
impl<T: Store + ?Sized> Store for Box<T> {
    async fn fetch(&self, request: Request) -> Result<Response, Error> {
        self.as_ref().fetch(request).await
    }
}
