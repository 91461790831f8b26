//! Content-location resolution: which physical resource a request acts on.
//!
//! By default a request acts on the path its URL names. A
//! [`SuffixCandidates`] strategy may offer suffixed alternatives to probe
//! when that path is not a file, and a [`ContentLocationResolver`] may
//! replace the whole procedure.
//!
//! The [`Stat`] in a [`ContentLocationResult`] is taken once. A handler acts
//! on it moments later, so another request may change the resource in
//! between. Locks are keyed by the nominal path, not the resolved one, so
//! holding a lock does not close that window when the two differ.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use http::header::{ACCEPT, CONTENT_TYPE};
use httpfs_core::headers::{header_all, header_str, media_type};
use httpfs_core::{Method, Request};
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::fs::{FileSystem, Stat};
use crate::media::{self, MAGIC_EXTENSION};
use crate::negotiate;
use crate::path::{append_to_path, as_container, encode_segment, PathResolver};

/// Where a request lands, and what is there.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentLocationResult {
    /// Set only when the target differs from the request URL.
    pub content_location: Option<Url>,
    /// Status of the target when it was resolved.
    pub stat: Option<Stat>,
}

impl ContentLocationResult {
    /// The URL the request acts on.
    pub fn target<'a>(&'a self, request: &'a Request) -> &'a Url {
        self.content_location.as_ref().unwrap_or(request.url())
    }
}

/// Filesystem access handed to resolution strategies.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    fs: &'a dyn FileSystem,
    paths: &'a dyn PathResolver,
}

impl<'a> ResolveContext<'a> {
    pub fn new(fs: &'a dyn FileSystem, paths: &'a dyn PathResolver) -> Self {
        Self { fs, paths }
    }

    pub fn fs(&self) -> &'a dyn FileSystem {
        self.fs
    }

    pub fn path(&self, url: &Url) -> Result<PathBuf> {
        self.paths.resolve(url)
    }

    pub async fn stat(&self, url: &Url) -> Result<Option<Stat>> {
        let path = self.path(url)?;
        self.stat_path(&path).await
    }

    pub async fn stat_path(&self, path: &Path) -> Result<Option<Stat>> {
        self.fs
            .stat(path)
            .await
            .map_err(|source| Error::io(path, source))
    }

    /// Child names of a directory. `None` if the filesystem cannot list.
    pub async fn read_dir(&self, path: &Path) -> Result<Option<Vec<String>>> {
        match self.fs.read_dir(path).await {
            Ok(names) => Ok(Some(names)),
            Err(error) if error.kind() == io::ErrorKind::Unsupported => Ok(None),
            Err(error) => Err(Error::io(path, error)),
        }
    }
}

/// Replaces the default resolution algorithm.
///
/// Returning `None` means "use the request URL as is".
#[async_trait]
pub trait ContentLocationResolver: Send + Sync {
    async fn content_location(
        &self,
        request: &Request,
        context: &ResolveContext<'_>,
    ) -> Result<Option<Url>>;
}

/// Suffixes to try, in order, when the request path is not a file.
#[async_trait]
pub trait SuffixCandidates: Send + Sync {
    async fn candidates(&self, request: &Request, context: &ResolveContext<'_>)
        -> Result<Vec<String>>;
}

/// The resolution engine a store runs for every request.
#[derive(Default)]
pub struct ContentLocations {
    resolver: Option<Box<dyn ContentLocationResolver>>,
    suffixes: Option<Box<dyn SuffixCandidates>>,
}

impl ContentLocations {
    pub fn new(
        resolver: Option<Box<dyn ContentLocationResolver>>,
        suffixes: Option<Box<dyn SuffixCandidates>>,
    ) -> Self {
        Self { resolver, suffixes }
    }

    /// Only what a configured override says, without running the default
    /// algorithm.
    pub async fn override_location(
        &self,
        request: &Request,
        context: &ResolveContext<'_>,
    ) -> Result<Option<Url>> {
        match &self.resolver {
            Some(resolver) => resolver.content_location(request, context).await,
            None => Ok(None),
        }
    }

    pub async fn resolve(
        &self,
        request: &Request,
        context: &ResolveContext<'_>,
    ) -> Result<ContentLocationResult> {
        if let Some(resolver) = &self.resolver {
            let content_location = resolver.content_location(request, context).await?;
            let target = content_location.as_ref().unwrap_or(request.url());
            let stat = context.stat(target).await?;
            log::debug!(
                "{} {} resolved to {}",
                request.method(),
                request.url(),
                target
            );
            return Ok(ContentLocationResult {
                content_location,
                stat,
            });
        }

        let url = request.url();
        let stat = context.stat(url).await?;
        if stat.is_some_and(|stat| stat.is_file()) {
            return Ok(ContentLocationResult {
                content_location: None,
                stat,
            });
        }

        if let Some(suffixes) = &self.suffixes {
            for suffix in suffixes.candidates(request, context).await? {
                let candidate = append_to_path(url, &suffix);
                // First file wins; the remaining candidates are not probed.
                if let Some(found) = context.stat(&candidate).await? {
                    if found.is_file() {
                        log::debug!("{} matched suffix {:?}", url, suffix);
                        return Ok(ContentLocationResult {
                            content_location: Some(candidate),
                            stat: Some(found),
                        });
                    }
                }
            }
        }

        let content_location = match stat {
            Some(stat) if stat.is_dir() && !url.path().ends_with('/') => Some(as_container(url)),
            _ => None,
        };
        Ok(ContentLocationResult {
            content_location,
            stat,
        })
    }
}

/// `.ext` candidates for each concrete media type in `Accept`, most
/// preferred first.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptExtensions;

#[async_trait]
impl SuffixCandidates for AcceptExtensions {
    async fn candidates(
        &self,
        request: &Request,
        _context: &ResolveContext<'_>,
    ) -> Result<Vec<String>> {
        let accept = header_all(request.headers(), ACCEPT);
        let mut suffixes: Vec<String> = Vec::new();
        for media_type in negotiate::ordered_media_types(accept.as_deref()) {
            for extension in media::extensions(&media_type) {
                let suffix = format!(".{}", extension);
                if !suffixes.contains(&suffix) {
                    suffixes.push(suffix);
                }
            }
        }
        Ok(suffixes)
    }
}

/// Stores each resource under a `name$.ext` file whose extension records its
/// media type, and finds it again by negotiation.
#[derive(Debug, Clone)]
pub struct MagicExtensions {
    index_document: String,
    max_attempts: u32,
}

impl Default for MagicExtensions {
    fn default() -> Self {
        Self::new("index.html", 16)
    }
}

impl MagicExtensions {
    pub fn new(index_document: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            index_document: index_document.into(),
            max_attempts,
        }
    }

    fn put_location(&self, request: &Request, stat: Option<Stat>) -> Option<Url> {
        let url = request.url();
        if stat.is_some_and(|stat| stat.is_dir()) || url.path().ends_with('/') {
            return None;
        }
        let provided = header_str(request.headers(), CONTENT_TYPE)
            .map(media_type)
            .filter(|provided| !provided.is_empty());
        let from_path = media::lookup(url.path());
        if let (Some(from_path), Some(provided)) = (from_path, provided.as_deref()) {
            if from_path == provided {
                return None;
            }
        }
        // The sent type wins over the path's.
        let extension = provided
            .as_deref()
            .or(from_path)
            .and_then(media::extension)
            .unwrap_or("unknown");
        Some(append_to_path(url, &format!("$.{}", extension)))
    }

    async fn directory_location(
        &self,
        request: &Request,
        context: &ResolveContext<'_>,
        path: &Path,
    ) -> Result<Option<Url>> {
        let url = request.url();
        let accept = header_all(request.headers(), ACCEPT);
        if negotiate::accepts(accept.as_deref(), "text/html") {
            let index = path.join(&self.index_document);
            if context.stat_path(&index).await?.is_some_and(|stat| stat.is_file()) {
                let container = as_container(url);
                return Ok(Some(container.join(&encode_segment(&self.index_document))?));
            }
        }
        if url.path().ends_with('/') {
            Ok(None)
        } else {
            Ok(Some(as_container(url)))
        }
    }

    async fn scan_location(
        &self,
        request: &Request,
        context: &ResolveContext<'_>,
        path: &Path,
    ) -> Result<Option<Url>> {
        let (Some(directory), Some(name)) = (path.parent(), path.file_name()) else {
            return Ok(None);
        };
        let name = name.to_string_lossy();
        if !context.stat_path(directory).await?.is_some_and(|stat| stat.is_dir()) {
            return Ok(None);
        }
        let Some(entries) = context.read_dir(directory).await? else {
            log::warn!(
                "cannot list {} to look for magic extensions",
                directory.display()
            );
            return Ok(None);
        };

        let mut matching = Vec::new();
        for entry in entries {
            if !MAGIC_EXTENSION.is_match(&entry) || MAGIC_EXTENSION.replace(&entry, "") != name {
                continue;
            }
            if context
                .stat_path(&directory.join(&entry))
                .await?
                .is_some_and(|stat| stat.is_file())
            {
                matching.push(entry);
            }
        }

        let chosen = match matching.len() {
            0 => return Ok(None),
            1 => &matching[0],
            _ => {
                let types: Vec<&str> = matching
                    .iter()
                    .map(|entry| media::lookup(entry).unwrap_or("application/octet-stream"))
                    .collect();
                let accept = header_all(request.headers(), ACCEPT);
                negotiate::preferred(accept.as_deref(), &types)
                    .and_then(|preferred| types.iter().position(|t| *t == preferred))
                    .map_or(&matching[0], |index| &matching[index])
            }
        };
        let suffix = &chosen[name.len()..];
        log::debug!("{} matched magic extension {}", request.url(), suffix);
        Ok(Some(append_to_path(request.url(), &encode_segment(suffix))))
    }
}

#[async_trait]
impl ContentLocationResolver for MagicExtensions {
    async fn content_location(
        &self,
        request: &Request,
        context: &ResolveContext<'_>,
    ) -> Result<Option<Url>> {
        let url = request.url();
        if *request.method() == Method::Post {
            return find_available_member(url, context, self.max_attempts)
                .await
                .map(Some);
        }

        let last_segment = url.path().rsplit('/').next().unwrap_or_default();
        if *request.method() == Method::Put && MAGIC_EXTENSION.is_match(last_segment) {
            return Ok(None);
        }

        let path = context.path(url)?;
        let stat = context.stat_path(&path).await?;
        if stat.is_some_and(|stat| stat.is_file()) {
            return Ok(None);
        }
        if *request.method() == Method::Put {
            return Ok(self.put_location(request, stat));
        }
        if stat.is_some_and(|stat| stat.is_dir()) {
            return self.directory_location(request, context, &path).await;
        }
        self.scan_location(request, context, &path).await
    }
}

/// A fresh, unused member URL inside the container `url` addresses.
pub async fn find_available_member(
    url: &Url,
    context: &ResolveContext<'_>,
    max_attempts: u32,
) -> Result<Url> {
    let mut container = as_container(url);
    container.set_query(None);
    container.set_fragment(None);
    for _ in 0..max_attempts {
        let candidate = container.join(&Uuid::new_v4().to_string())?;
        if context.stat(&candidate).await?.is_none() {
            return Ok(candidate);
        }
        log::debug!("{} is taken, trying another name", candidate);
    }
    Err(Error::NameExhausted {
        container: container.to_string(),
        attempts: max_attempts,
    })
}
