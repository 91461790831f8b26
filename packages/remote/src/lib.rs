//! # httpfs-remote
//!
//! A [`Store`] that forwards every request over HTTP.
//!
//! ```rust,no_run
//! use httpfs_core::{Method, Request, Store};
//! use httpfs_remote::RemoteStore;
//!
//! # async fn demo() -> Result<(), httpfs_core::Error> {
//! let remote = RemoteStore::new();
//! let response = remote
//!     .fetch(Request::parse(Method::Get, "https://example.com/doc.txt")?)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! Because every store can resolve external sources, a `RemoteStore` can be
//! handed to a filesystem store as its COPY resolver.

pub mod error;

use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};
use httpfs_core::{Error as StoreError, Request, Response, Store};
use reqwest::Client;
use url::Url;

pub use error::Error;

/// Forwards requests with a `reqwest` client.
///
/// Without a base URL, requests go to the URL they name. With one, the
/// request's path and query are rebased onto it.
#[derive(Debug, Clone, Default)]
pub struct RemoteStore {
    client: Client,
    base_url: Option<Url>,
    default_headers: HeaderMap,
}

impl RemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            ..Self::default()
        }
    }

    /// Rebase every request onto `base_url`.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            base_url: Some(base_url),
            ..Self::default()
        })
    }

    /// Add a header sent with every request unless the request sets it.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        self.default_headers
            .insert(HeaderName::try_from(name)?, HeaderValue::from_str(value)?);
        Ok(self)
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    fn target(&self, url: &Url) -> Result<Url, Error> {
        let Some(base_url) = &self.base_url else {
            return Ok(url.clone());
        };
        let mut target = base_url.join(url.path().trim_start_matches('/'))?;
        target.set_query(url.query());
        Ok(target)
    }

    async fn forward(&self, request: Request) -> Result<Response, Error> {
        let method = http::Method::try_from(request.method())?;
        let url = self.target(request.url())?;
        log::debug!("forwarding {} {} to {}", method, request.url(), url);

        let mut headers = self.default_headers.clone();
        for name in request.headers().keys() {
            headers.remove(name);
        }
        for (name, value) in request.headers() {
            headers.append(name.clone(), value.clone());
        }

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = request.into_body() {
            builder = builder.body(body);
        }
        let reply = builder.send().await?;

        let status = reply.status();
        let headers = reply.headers().clone();
        let body = reply.bytes().await?;

        let mut response = Response::new(status)
            .with_status_text(status.canonical_reason().map(str::to_string))
            .with_headers(headers);
        if !body.is_empty() {
            response = response.with_body(body);
        }
        Ok(response)
    }
}

#[async_trait]
impl Store for RemoteStore {
    async fn fetch(&self, request: Request) -> Result<Response, StoreError> {
        Ok(self.forward(request).await?)
    }
}
