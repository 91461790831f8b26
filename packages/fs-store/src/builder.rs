use std::path::PathBuf;

use httpfs_core::{CanonicalReasons, Method, StatusTexts};

use crate::config::FsStoreConfig;
use crate::content_location::{ContentLocationResolver, ContentLocations, MagicExtensions, SuffixCandidates};
use crate::content_type::{ContentTypeResolver, ExtensionContentType};
use crate::error::{Error, Result};
use crate::external::ExternalResolver;
use crate::fs::FileSystem;
use crate::links::{DependentPolicy, LinkDiscoverer, SidecarDependents, SidecarLinks};
use crate::lock::{DefaultClassifier, KeyedLocks, LockClassifier, LockFactory};
use crate::methods;
use crate::path::{PathResolver, RootPathResolver};
use crate::store::FsStore;

/// Assembles an [`FsStore`]. Every strategy has a default; only a root
/// directory or a custom [`PathResolver`] is required.
pub struct FsStoreBuilder {
    fs: Box<dyn FileSystem>,
    root: Option<PathBuf>,
    paths: Option<Box<dyn PathResolver>>,
    content_location: Option<Box<dyn ContentLocationResolver>>,
    suffixes: Option<Box<dyn SuffixCandidates>>,
    content_types: Box<dyn ContentTypeResolver>,
    links: Box<dyn LinkDiscoverer>,
    dependents: Box<dyn DependentPolicy>,
    locks: Box<dyn LockFactory>,
    classifier: Box<dyn LockClassifier>,
    external: Option<Box<dyn ExternalResolver>>,
    status_texts: Box<dyn StatusTexts>,
    max_name_attempts: u32,
}

impl FsStoreBuilder {
    /// A builder with the plain resolution engine and no content-location
    /// override. [`FsStoreBuilder::from_config`] and [`FsStore::local`] add
    /// [`MagicExtensions`] unless the config turns them off.
    pub fn new<F: FileSystem + 'static>(fs: F) -> Self {
        let defaults = FsStoreConfig::default();
        Self {
            fs: Box::new(fs),
            root: None,
            paths: None,
            content_location: None,
            suffixes: None,
            content_types: Box::new(ExtensionContentType),
            links: Box::new(SidecarLinks::default()),
            dependents: Box::new(SidecarDependents),
            locks: Box::new(KeyedLocks::new()),
            classifier: Box::new(DefaultClassifier),
            external: None,
            status_texts: Box::new(CanonicalReasons),
            max_name_attempts: defaults.max_name_attempts,
        }
    }

    /// A builder preloaded from `config`.
    pub fn from_config<F: FileSystem + 'static>(fs: F, config: &FsStoreConfig) -> Self {
        let mut builder = Self::new(fs)
            .links(SidecarLinks::new(&config.acl_suffix, &config.meta_suffix))
            .max_name_attempts(config.max_name_attempts);
        if let Some(root) = &config.root {
            builder = builder.root(root.clone());
        }
        if config.magic_extensions {
            builder = builder.content_location(MagicExtensions::new(
                &config.index_document,
                config.max_name_attempts,
            ));
        }
        builder
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Replaces root joining entirely.
    pub fn path_resolver(mut self, paths: impl PathResolver + 'static) -> Self {
        self.paths = Some(Box::new(paths));
        self
    }

    /// Replaces the default content-location algorithm.
    pub fn content_location(mut self, resolver: impl ContentLocationResolver + 'static) -> Self {
        self.content_location = Some(Box::new(resolver));
        self
    }

    pub fn suffix_candidates(mut self, suffixes: impl SuffixCandidates + 'static) -> Self {
        self.suffixes = Some(Box::new(suffixes));
        self
    }

    pub fn content_types(mut self, resolver: impl ContentTypeResolver + 'static) -> Self {
        self.content_types = Box::new(resolver);
        self
    }

    pub fn links(mut self, discoverer: impl LinkDiscoverer + 'static) -> Self {
        self.links = Box::new(discoverer);
        self
    }

    pub fn dependents(mut self, policy: impl DependentPolicy + 'static) -> Self {
        self.dependents = Box::new(policy);
        self
    }

    pub fn locks(mut self, locks: impl LockFactory + 'static) -> Self {
        self.locks = Box::new(locks);
        self
    }

    pub fn lock_classifier(mut self, classifier: impl LockClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Resolver for COPY sources outside the store. Without one, such
    /// copies answer 501.
    pub fn external(mut self, resolver: impl ExternalResolver + 'static) -> Self {
        self.external = Some(Box::new(resolver));
        self
    }

    pub fn status_texts(mut self, texts: impl StatusTexts + 'static) -> Self {
        self.status_texts = Box::new(texts);
        self
    }

    pub fn max_name_attempts(mut self, attempts: u32) -> Self {
        self.max_name_attempts = attempts;
        self
    }

    pub fn build(mut self) -> Result<FsStore> {
        let paths = match (self.paths.take(), self.root.take()) {
            (Some(paths), _) => paths,
            (None, Some(root)) => Box::new(RootPathResolver::new(root)),
            (None, None) => return Err(Error::MissingRoot),
        };
        Ok(self.assemble(paths))
    }

    /// Only for builders that were given a root.
    pub(crate) fn assemble_rooted(mut self) -> FsStore {
        let root = self.root.take().unwrap_or_default();
        self.assemble(Box::new(RootPathResolver::new(root)))
    }

    fn assemble(self, paths: Box<dyn PathResolver>) -> FsStore {
        let capabilities = self.fs.capabilities();
        let allowed: Vec<Method> = methods::ALLOW_ORDER
            .iter()
            .filter(|method| capabilities.contains_all(methods::required_primitives(method)))
            .cloned()
            .collect();
        log::debug!(
            "filesystem store enables {:?}",
            allowed.iter().map(Method::as_str).collect::<Vec<_>>()
        );

        FsStore {
            fs: self.fs,
            paths,
            locations: ContentLocations::new(self.content_location, self.suffixes),
            content_types: self.content_types,
            links: self.links,
            dependents: self.dependents,
            locks: self.locks,
            classifier: self.classifier,
            external: self.external,
            status_texts: self.status_texts,
            max_name_attempts: self.max_name_attempts,
            capabilities,
            allowed,
        }
    }
}
