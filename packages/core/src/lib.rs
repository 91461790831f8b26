//! # httpfs-core
//!
//! Value types shared by every httpfs store.
//!
//! A store is anything that answers a [`Request`] with a [`Response`]. The
//! filesystem store, the remote store and any middleware built on top of them
//! all speak this one interface:
//!
//! ```rust
//! use httpfs_core::{Method, Request, Response, Store};
//!
//! async fn exists(store: &dyn Store, url: &str) -> Result<bool, httpfs_core::Error> {
//!     let request = Request::parse(Method::Head, url)?;
//!     Ok(store.fetch(request).await?.is_ok())
//! }
//! ```

pub mod error;
pub mod headers;
pub mod status;
pub mod store;
pub mod types;

pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
pub use url::Url;

pub use error::Error;
pub use status::{CanonicalReasons, StatusTable, StatusTexts};
pub use store::Store;
pub use types::{Method, Request, Response};
