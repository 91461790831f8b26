//! One handler per verb.
//!
//! Handlers run with the request's lock already held. Sub-requests against
//! the same resource go back through [`FsStore::fetch_with`](crate::FsStore::fetch_with) with the lock
//! ignored; sub-requests against other resources lock as usual.

pub(crate) mod copy;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod head;
pub(crate) mod options;
pub(crate) mod post;
pub(crate) mod put;

use http::HeaderMap;
use httpfs_core::headers::ENTITY_HEADERS;
use httpfs_core::Method;

use crate::fs::Primitive;

/// Verbs in the order the `Allow` header lists them.
pub(crate) const ALLOW_ORDER: [Method; 7] = [
    Method::Copy,
    Method::Delete,
    Method::Get,
    Method::Head,
    Method::Options,
    Method::Post,
    Method::Put,
];

/// Primitives a verb cannot work without. Directory primitives are missing
/// from this table: without them the verb stays enabled and answers 501 for
/// directories.
pub(crate) fn required_primitives(method: &Method) -> &'static [Primitive] {
    match method {
        Method::Head => &[Primitive::Stat],
        Method::Get => &[Primitive::Stat, Primitive::ReadFile],
        Method::Put | Method::Post => &[Primitive::Stat, Primitive::WriteFile],
        Method::Delete => &[Primitive::Stat, Primitive::Unlink],
        Method::Copy => &[Primitive::Stat, Primitive::ReadFile, Primitive::WriteFile],
        Method::Options => &[],
        Method::Other(_) => &[],
    }
}

/// `headers` without the entity headers of the body they came with, nor any
/// of `extra`.
pub(crate) fn without_entity_headers(headers: &HeaderMap, extra: &[&str]) -> HeaderMap {
    let mut headers = headers.clone();
    for name in ENTITY_HEADERS.iter().chain(extra) {
        headers.remove(*name);
    }
    headers
}
