//! Mapping request URLs onto filesystem paths.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

/// Characters escaped when a file name becomes a URL path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Turns a request URL into the physical path it addresses.
pub trait PathResolver: Send + Sync {
    fn resolve(&self, url: &Url) -> Result<PathBuf>;
}

impl<F> PathResolver for F
where
    F: Fn(&Url) -> Result<PathBuf> + Send + Sync,
{
    fn resolve(&self, url: &Url) -> Result<PathBuf> {
        self(url)
    }
}

/// Joins a fixed root directory with the URL's path component.
#[derive(Debug, Clone)]
pub struct RootPathResolver {
    root: PathBuf,
}

impl RootPathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PathResolver for RootPathResolver {
    fn resolve(&self, url: &Url) -> Result<PathBuf> {
        join_with_root(&self.root, url.path())
    }
}

/// Fails if any segment of `path` is a parent-directory reference.
///
/// Both `/` and `\` count as separators.
pub fn ensure_contained(path: &str) -> Result<()> {
    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(Error::path_security(path));
    }
    Ok(())
}

/// Join `root` with a percent-encoded URL path.
///
/// The decoded path is checked for traversal before anything is joined; it
/// is never normalized.
pub fn join_with_root(root: &Path, url_path: &str) -> Result<PathBuf> {
    lazy_static! {
        static ref LEADING_FLUFF: Regex = Regex::new(r"^(\.?/)+").unwrap();
    }

    let decoded = percent_decode_str(url_path).decode_utf8_lossy();
    ensure_contained(&decoded)?;
    let relative = LEADING_FLUFF.replace(&decoded, "");
    if relative.is_empty() {
        return Ok(root.to_path_buf());
    }
    Ok(root.join(relative.as_ref()))
}

/// Percent-encode a file name for use as one URL path segment.
pub fn encode_segment(name: &str) -> String {
    utf8_percent_encode(name, SEGMENT).to_string()
}

/// `url` with a trailing `/` on its path.
pub fn as_container(url: &Url) -> Url {
    let mut container = url.clone();
    if !container.path().ends_with('/') {
        let path = format!("{}/", container.path());
        container.set_path(&path);
    }
    container
}

/// `url` with `suffix` appended to its path. Query and fragment are kept.
pub fn append_to_path(url: &Url, suffix: &str) -> Url {
    let mut appended = url.clone();
    let path = format!("{}{}", url.path(), suffix);
    appended.set_path(&path);
    appended
}

/// Resolve a member `name` inside the container addressed by `container`.
///
/// Names may contain `/` to reach into sub-containers, but never leave the
/// container: absolute names and `..` segments are rejected.
pub fn resolve_in_container(container: &Url, name: &str) -> Result<Url> {
    ensure_contained(name)?;
    let relative = name.trim_start_matches("./");
    if relative.is_empty() || relative.starts_with('/') || relative.starts_with('\\') {
        return Err(Error::path_security(name));
    }
    let encoded = relative
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/");
    let mut base = as_container(container);
    base.set_query(None);
    base.set_fragment(None);
    Ok(base.join(&encoded)?)
}
