//! Link relations between a resource and its sidecars.

use std::fmt;

use async_trait::async_trait;
use httpfs_core::Request;
use url::Url;

use crate::error::Result;
use crate::fs::{FileKind, Stat};
use crate::path::append_to_path;
use crate::store::FsStore;

pub const TYPE: &str = "type";
pub const ACL: &str = "acl";
pub const DESCRIBED_BY: &str = "describedBy";

pub const LDP_BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
pub const LDP_RESOURCE: &str = "http://www.w3.org/ns/ldp#Resource";

/// A `(rel, target)` pair, rendered as one `Link` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    pub rel: String,
    pub target: Url,
}

impl LinkRelation {
    pub fn new(rel: impl Into<String>, target: Url) -> Self {
        Self {
            rel: rel.into(),
            target,
        }
    }
}

impl fmt::Display for LinkRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>; rel=\"{}\"", self.target, self.rel)
    }
}

/// Finds the links to advertise for a resource.
///
/// Discoverers may issue requests of their own through `store`; use
/// [`FsStore::probe`] for those so they neither lock nor recurse.
#[async_trait]
pub trait LinkDiscoverer: Send + Sync {
    async fn discover(
        &self,
        store: &FsStore,
        request: &Request,
        content_location: Option<&Url>,
        stat: &Stat,
    ) -> Result<Vec<LinkRelation>>;
}

/// A `type` link, plus `acl` and `describedBy` links for the sidecar files
/// that exist next to the resource.
#[derive(Debug, Clone)]
pub struct SidecarLinks {
    acl_suffix: String,
    meta_suffix: String,
}

impl Default for SidecarLinks {
    fn default() -> Self {
        Self::new(".acl", ".meta")
    }
}

impl SidecarLinks {
    pub fn new(acl_suffix: impl Into<String>, meta_suffix: impl Into<String>) -> Self {
        Self {
            acl_suffix: acl_suffix.into(),
            meta_suffix: meta_suffix.into(),
        }
    }

    async fn sidecars(&self, store: &FsStore, url: &Url) -> Result<Vec<LinkRelation>> {
        let mut base = url.clone();
        base.set_query(None);
        base.set_fragment(None);

        let mut links = Vec::new();
        for (rel, suffix) in [(ACL, &self.acl_suffix), (DESCRIBED_BY, &self.meta_suffix)] {
            let sidecar = append_to_path(&base, suffix);
            if store.probe(&sidecar).await?.is_ok() {
                links.push(LinkRelation::new(rel, sidecar));
            }
        }
        Ok(links)
    }
}

#[async_trait]
impl LinkDiscoverer for SidecarLinks {
    async fn discover(
        &self,
        store: &FsStore,
        request: &Request,
        content_location: Option<&Url>,
        stat: &Stat,
    ) -> Result<Vec<LinkRelation>> {
        let mut links = Vec::new();
        let kind = match stat.kind {
            FileKind::Directory => Some(LDP_BASIC_CONTAINER),
            FileKind::File => Some(LDP_RESOURCE),
            FileKind::Other => None,
        };
        if let Some(kind) = kind {
            links.push(LinkRelation::new(TYPE, Url::parse(kind)?));
        }

        let mut sidecars = self.sidecars(store, request.url()).await?;
        if sidecars.is_empty() {
            if let Some(content_location) = content_location {
                sidecars = self.sidecars(store, content_location).await?;
            }
        }
        links.extend(sidecars);
        Ok(links)
    }
}

/// Decides which links are removed along with their resource.
pub trait DependentPolicy: Send + Sync {
    fn is_dependent(&self, link: &LinkRelation) -> bool;
}

impl<F> DependentPolicy for F
where
    F: Fn(&LinkRelation) -> bool + Send + Sync,
{
    fn is_dependent(&self, link: &LinkRelation) -> bool {
        self(link)
    }
}

/// `acl` and `describedBy` sidecars are dependent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarDependents;

impl DependentPolicy for SidecarDependents {
    fn is_dependent(&self, link: &LinkRelation) -> bool {
        link.rel == ACL || link.rel == DESCRIBED_BY
    }
}
