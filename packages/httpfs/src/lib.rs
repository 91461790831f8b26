//! # httpfs
//!
//! Resource stores driven by requests and responses.
//!
//! - [`httpfs_core`]: request, response, method and the [`Store`] trait.
//! - [`fs`]: a filesystem store with content negotiation, container
//!   listings, locking and cascading deletes.
//! - [`remote`]: a store that forwards requests over HTTP.
//!
//! ```rust,no_run
//! use httpfs::{FsStore, RemoteStore};
//!
//! let store = FsStore::builder(httpfs::fs::LocalFs)
//!     .root("/srv/store")
//!     .external(RemoteStore::new())
//!     .build()
//!     .unwrap();
//! ```

pub use httpfs_core;
pub use httpfs_fs_store as fs;
pub use httpfs_remote as remote;

pub use httpfs_core::{Error, Method, Request, Response, Store};
pub use httpfs_fs_store::{FsStore, FsStoreBuilder, FsStoreConfig};
pub use httpfs_remote::RemoteStore;
