//! Container listings as JSON-LD.
//!
//! A listing has one node for the container, naming its members through
//! `contains`, followed by one node per member. Members appear in the order
//! the filesystem enumerates them; they are never sorted.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use httpfs_core::{Method, Request};
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::error::{Error, Result};
use crate::fs::Stat;
use crate::path::{as_container, encode_segment};
use crate::store::FsStore;

pub const LISTING_CONTENT_TYPE: &str = "application/ld+json";

#[derive(Debug, Serialize)]
struct Listing {
    #[serde(rename = "@context")]
    context: Value,
    #[serde(rename = "@graph")]
    graph: Vec<Node>,
}

#[derive(Debug, Serialize)]
struct Node {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type")]
    types: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    contains: Option<Vec<String>>,
    modified: String,
    mtime: u64,
    size: u64,
}

impl Node {
    fn new(id: &Url, types: Value, stat: &Stat) -> Self {
        Self {
            id: id.to_string(),
            types,
            contains: None,
            modified: DateTime::<Utc>::from(stat.modified).to_rfc3339_opts(SecondsFormat::Secs, true),
            mtime: unix_seconds(stat.modified),
            size: stat.size,
        }
    }

    fn member(id: &Url, stat: &Stat) -> Self {
        let kind = if stat.is_dir() {
            "ldp:Container"
        } else {
            "ldp:Resource"
        };
        Self::new(id, json!(kind), stat)
    }
}

fn context() -> Value {
    json!({
        "ldp": "http://www.w3.org/ns/ldp#",
        "stat": "http://www.w3.org/ns/posix/stat#",
        "terms": "http://purl.org/dc/terms/",
        "xsd": "http://www.w3.org/2001/XMLSchema#",
        "contains": { "@id": "ldp:contains", "@type": "@id" },
        "modified": { "@id": "terms:modified", "@type": "xsd:dateTime" },
        "mtime": { "@id": "stat:mtime", "@type": "xsd:integer" },
        "size": { "@id": "stat:size", "@type": "xsd:integer" }
    })
}

pub(crate) fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Render the directory `container` addresses.
///
/// Each member is resolved the way a HEAD for it would be, so members whose
/// representation lives elsewhere are listed under that location.
pub(crate) async fn render(
    store: &FsStore,
    request: &Request,
    container: &Url,
    stat: &Stat,
) -> Result<Bytes> {
    let container = as_container(container);
    let path = store.path(&container)?;
    let names = store
        .fs()
        .read_dir(&path)
        .await
        .map_err(|source| Error::io(&path, source))?;

    let mut members = Vec::with_capacity(names.len());
    for name in names {
        // "./" keeps names like "a:b" from parsing as absolute URLs.
        let url = container.join(&format!("./{}", encode_segment(&name)))?;
        let head = Request::new(Method::Head, url.clone()).with_headers(request.headers().clone());
        let resolved = match store.resolve(&head).await {
            Ok(resolved) => resolved,
            Err(Error::PathSecurity { path }) => {
                log::warn!("skipping {:?} in {}: unsafe path {}", name, container, path);
                continue;
            }
            Err(error) => return Err(error),
        };
        let Some(member_stat) = resolved.stat else {
            log::debug!("{} vanished while listing", url);
            continue;
        };
        let id = resolved.content_location.unwrap_or(url);
        members.push(Node::member(&id, &member_stat));
    }

    let mut node = Node::new(
        &container,
        json!(["ldp:BasicContainer", "ldp:Container"]),
        stat,
    );
    node.contains = Some(members.iter().map(|member| member.id.clone()).collect());

    let mut graph = Vec::with_capacity(members.len() + 1);
    graph.push(node);
    graph.extend(members);

    let listing = Listing {
        context: context(),
        graph,
    };
    Ok(Bytes::from(serde_json::to_vec(&listing)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn member_nodes_carry_type_and_times() {
        let stat = Stat::file(4, UNIX_EPOCH + Duration::from_secs(1_600_000_000));
        let node = Node::member(&Url::parse("https://store.test/dir/a.txt").unwrap(), &stat);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["@type"], "ldp:Resource");
        assert_eq!(value["mtime"], 1_600_000_000u64);
        assert_eq!(value["size"], 4);
        assert_eq!(value["modified"], "2020-09-13T12:26:40Z");
        assert!(value.get("contains").is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unsafe_member_names_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a\\..\\b"), "x").unwrap();
        std::fs::write(dir.path().join("plain.txt"), "y").unwrap();
        let store = FsStore::local(dir.path());

        let container = Url::parse("https://store.test/").unwrap();
        let request = Request::new(Method::Get, container.clone());
        let stat = Stat::directory(SystemTime::now());
        let listing: Value = serde_json::from_slice(
            &render(&store, &request, &container, &stat).await.unwrap(),
        )
        .unwrap();

        let graph = listing["@graph"].as_array().unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph[1]["@id"], "https://store.test/plain.txt");
    }

    #[test]
    fn context_names_vocabularies() {
        let context = context();
        assert_eq!(context["ldp"], "http://www.w3.org/ns/ldp#");
        assert_eq!(context["contains"]["@type"], "@id");
    }
}
