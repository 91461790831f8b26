//! # httpfs-fs-store
//!
//! A filesystem served through request/response semantics.
//!
//! [`FsStore`] maps request URLs onto paths under a root directory and
//! answers HEAD, GET, PUT, DELETE, COPY, POST and OPTIONS against them:
//!
//! ```rust,no_run
//! use httpfs_core::{Method, Request, Store};
//! use httpfs_fs_store::FsStore;
//!
//! # async fn demo() -> Result<(), httpfs_core::Error> {
//! let store = FsStore::local("/srv/store");
//!
//! let put = Request::parse(Method::Put, "https://store.test/doc.txt")?
//!     .with_header("Content-Type", "text/plain")?
//!     .with_body("hello");
//! assert_eq!(store.fetch(put).await?.status(), 201);
//!
//! let get = Request::parse(Method::Get, "https://store.test/doc.txt")?;
//! let body = store.fetch(get).await?.into_body();
//! # Ok(())
//! # }
//! ```
//!
//! ## Strategies
//!
//! Every decision the store makes beyond the filesystem itself goes through
//! a trait with a default implementation, injected with [`FsStoreBuilder`]:
//!
//! | Trait | Default |
//! |---|---|
//! | [`PathResolver`] | [`RootPathResolver`] |
//! | [`ContentLocationResolver`] | [`MagicExtensions`] from [`FsStoreConfig`]; none from [`FsStoreBuilder::new`] |
//! | [`SuffixCandidates`] | none; [`AcceptExtensions`] is available |
//! | [`ContentTypeResolver`] | [`ExtensionContentType`] |
//! | [`LinkDiscoverer`] | [`SidecarLinks`] |
//! | [`DependentPolicy`] | [`SidecarDependents`] |
//! | [`LockFactory`] | [`KeyedLocks`] |
//! | [`LockClassifier`] | [`DefaultClassifier`] |
//! | [`ExternalResolver`] | none; any [`Store`](httpfs_core::Store) works |
//!
//! Verbs are enabled once, at construction, from the primitives the
//! [`FileSystem`] reports. A verb whose primitives are missing answers 405.

pub mod builder;
pub mod config;
pub mod content_location;
pub mod content_type;
pub mod error;
pub mod external;
pub mod fs;
pub mod links;
pub mod listing;
pub mod lock;
pub mod media;
mod methods;
mod multipart;
pub mod negotiate;
pub mod path;
pub mod store;

pub use builder::FsStoreBuilder;
pub use config::FsStoreConfig;
pub use content_location::{
    AcceptExtensions, ContentLocationResolver, ContentLocationResult, MagicExtensions,
    ResolveContext, SuffixCandidates,
};
pub use content_type::{ContentTypeResolver, ExtensionContentType};
pub use error::{Error, Result};
pub use external::ExternalResolver;
pub use fs::{Capabilities, FileKind, FileSystem, LocalFs, Primitive, Restricted, Stat};
pub use links::{DependentPolicy, LinkDiscoverer, LinkRelation, SidecarDependents, SidecarLinks};
pub use lock::{DefaultClassifier, KeyedLocks, LockClassifier, LockFactory, LockGuard, LockMode, NoLocks};
pub use path::{PathResolver, RootPathResolver};
pub use store::{FetchOptions, FsStore};
