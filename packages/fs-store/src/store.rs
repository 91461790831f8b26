//! The filesystem store and its request dispatcher.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use http::header::{ALLOW, WARNING};
use http::{HeaderValue, StatusCode};
use httpfs_core::{Error as StoreError, Method, Request, Response, StatusTexts, Store};
use url::Url;

use crate::builder::FsStoreBuilder;
use crate::config::FsStoreConfig;
use crate::content_location::{ContentLocationResult, ContentLocations, ResolveContext};
use crate::content_type::ContentTypeResolver;
use crate::error::Result;
use crate::external::ExternalResolver;
use crate::fs::{Capabilities, FileSystem, LocalFs, Stat};
use crate::links::{DependentPolicy, LinkDiscoverer};
use crate::lock::{LockClassifier, LockFactory, LockGuard, LockMode};
use crate::methods;
use crate::path::PathResolver;

/// How a request enters the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Skip lock acquisition. Set on sub-requests against a resource whose
    /// lock the caller already holds.
    pub ignore_lock: bool,
    /// Skip link discovery on HEAD.
    pub skip_links: bool,
}

impl FetchOptions {
    pub fn internal() -> Self {
        Self {
            ignore_lock: true,
            skip_links: false,
        }
    }

    /// For existence checks: no lock, no link discovery.
    pub fn probe() -> Self {
        Self {
            ignore_lock: true,
            skip_links: true,
        }
    }
}

/// A hierarchical filesystem served through request/response semantics.
pub struct FsStore {
    pub(crate) fs: Box<dyn FileSystem>,
    pub(crate) paths: Box<dyn PathResolver>,
    pub(crate) locations: ContentLocations,
    pub(crate) content_types: Box<dyn ContentTypeResolver>,
    pub(crate) links: Box<dyn LinkDiscoverer>,
    pub(crate) dependents: Box<dyn DependentPolicy>,
    pub(crate) locks: Box<dyn LockFactory>,
    pub(crate) classifier: Box<dyn LockClassifier>,
    pub(crate) external: Option<Box<dyn ExternalResolver>>,
    pub(crate) status_texts: Box<dyn StatusTexts>,
    pub(crate) max_name_attempts: u32,
    pub(crate) capabilities: Capabilities,
    pub(crate) allowed: Vec<Method>,
}

impl FsStore {
    /// A store on the local disk under `root`, configured by
    /// [`FsStoreConfig::default`].
    pub fn local(root: impl Into<PathBuf>) -> Self {
        FsStoreBuilder::from_config(LocalFs, &FsStoreConfig::with_root(root)).assemble_rooted()
    }

    pub fn builder<F: FileSystem + 'static>(fs: F) -> FsStoreBuilder {
        FsStoreBuilder::new(fs)
    }

    /// Enabled verbs, in `Allow` header order.
    pub fn allowed_methods(&self) -> &[Method] {
        &self.allowed
    }

    /// The filesystem primitives this store was built with.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Dispatch `request`.
    ///
    /// Disabled verbs are answered with 405 before anything else happens.
    /// The lock is keyed by the physical path the request URL names, without
    /// trailing separators, so a traversal attempt fails here before the
    /// filesystem is touched.
    pub fn fetch_with(
        &self,
        request: Request,
        options: FetchOptions,
    ) -> BoxFuture<'_, Result<Response>> {
        async move {
            if !self.allowed.contains(request.method()) {
                log::debug!("{} {}: method not allowed", request.method(), request.url());
                return self.method_not_allowed();
            }
            log::debug!("{} {}", request.method(), request.url());

            let _guard = if options.ignore_lock {
                LockGuard::unlocked()
            } else {
                self.lock(&request).await?
            };

            let method = request.method().clone();
            match method {
                Method::Head => methods::head::handle(self, request, options).await,
                Method::Get => methods::get::handle(self, request).await,
                Method::Put => methods::put::handle(self, request).await,
                Method::Delete => methods::delete::handle(self, request).await,
                Method::Copy => methods::copy::handle(self, request).await,
                Method::Post => methods::post::handle(self, request).await,
                Method::Options => methods::options::handle(self),
                Method::Other(_) => self.method_not_allowed(),
            }
        }
        .boxed()
    }

    /// HEAD `url` without locking and without link discovery.
    pub async fn probe(&self, url: &Url) -> Result<Response> {
        self.fetch_with(Request::new(Method::Head, url.clone()), FetchOptions::probe())
            .await
    }

    async fn lock(&self, request: &Request) -> Result<LockGuard> {
        // `dir` and `dir/` are one resource and take one lock.
        let key: PathBuf = self.paths.resolve(request.url())?.components().collect();
        let key = key.to_string_lossy();
        Ok(match self.classifier.classify(request.method()) {
            Some(LockMode::Write) => self.locks.write_lock(&key).await,
            Some(LockMode::Read) => self.locks.read_lock(&key).await,
            None => LockGuard::unlocked(),
        })
    }

    pub(crate) fn fs(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub(crate) fn context(&self) -> ResolveContext<'_> {
        ResolveContext::new(self.fs.as_ref(), self.paths.as_ref())
    }

    pub(crate) async fn resolve(&self, request: &Request) -> Result<ContentLocationResult> {
        self.locations.resolve(request, &self.context()).await
    }

    pub(crate) fn path(&self, url: &Url) -> Result<PathBuf> {
        self.paths.resolve(url)
    }

    pub(crate) async fn stat_path(&self, path: &Path) -> Result<Option<Stat>> {
        self.context().stat_path(path).await
    }

    /// An empty response with the configured reason phrase.
    pub(crate) fn response(&self, status: StatusCode) -> Response {
        Response::new(status).with_status_text(self.status_texts.reason(status))
    }

    /// A response explaining itself in a `Warning` header.
    pub(crate) fn warning(&self, status: StatusCode, text: &str) -> Result<Response> {
        let warning = HeaderValue::from_str(&format!("199 - {}", text))?;
        Ok(self.response(status).with_header(WARNING, warning))
    }

    pub(crate) fn allow_header(&self) -> Result<HeaderValue> {
        let allow = self
            .allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(HeaderValue::from_str(&allow)?)
    }

    fn method_not_allowed(&self) -> Result<Response> {
        Ok(self
            .response(StatusCode::METHOD_NOT_ALLOWED)
            .with_header(ALLOW, self.allow_header()?))
    }
}

impl std::fmt::Debug for FsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsStore")
            .field("capabilities", &self.capabilities)
            .field("allowed", &self.allowed)
            .field("max_name_attempts", &self.max_name_attempts)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Store for FsStore {
    async fn fetch(&self, request: Request) -> std::result::Result<Response, StoreError> {
        Ok(self.fetch_with(request, FetchOptions::default()).await?)
    }
}
