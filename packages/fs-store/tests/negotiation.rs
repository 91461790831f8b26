mod common;

use httpfs_core::{Method, StatusCode};
use httpfs_fs_store::{AcceptExtensions, FsStoreBuilder, FsStoreConfig, LocalFs, MagicExtensions};
use serde_json::Value;

use common::{body, header, request, url, Harness};

fn magic() -> Harness {
    Harness::with(|builder| builder.content_location(MagicExtensions::default()))
}

#[tokio::test]
async fn test_magic_put_records_media_type() {
    let harness = magic();

    let put = harness.put("/doc", "text/turtle", "<#a> <#b> <#c> .").await;
    assert_eq!(put.status(), StatusCode::CREATED);
    assert_eq!(header(&put, "location"), Some(url("/doc").as_str()));
    assert_eq!(header(&put, "content-location"), Some(url("/doc$.ttl").as_str()));
    assert!(harness.file("doc$.ttl").is_file());
    assert!(!harness.file("doc").exists());

    let get = harness.get("/doc").await;
    assert_eq!(get.status(), StatusCode::OK);
    assert_eq!(header(&get, "content-type"), Some("text/turtle"));
    assert_eq!(header(&get, "content-location"), Some(url("/doc$.ttl").as_str()));
    assert_eq!(body(&get), b"<#a> <#b> <#c> .");

    let replace = harness.put("/doc", "text/turtle", "").await;
    assert_eq!(replace.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_magic_put_keeps_matching_extension() {
    let harness = magic();
    let put = harness.put("/notes.txt", "text/plain", "plain").await;
    assert_eq!(put.status(), StatusCode::CREATED);
    assert_eq!(header(&put, "content-location"), None);
    assert!(harness.file("notes.txt").is_file());
}

#[tokio::test]
async fn test_magic_negotiates_between_representations() {
    let harness = magic();
    harness.write("page$.html", "<p>hi</p>");
    harness.write("page$.json", "{}");

    let html = harness
        .send(
            request(Method::Get, "/page")
                .with_header("Accept", "text/html")
                .unwrap(),
        )
        .await;
    assert_eq!(header(&html, "content-location"), Some(url("/page$.html").as_str()));
    assert_eq!(header(&html, "content-type"), Some("text/html"));

    let json = harness
        .send(
            request(Method::Get, "/page")
                .with_header("Accept", "application/json;q=0.9, text/html;q=0.1")
                .unwrap(),
        )
        .await;
    assert_eq!(header(&json, "content-location"), Some(url("/page$.json").as_str()));
    assert_eq!(body(&json), b"{}");
}

#[tokio::test]
async fn test_magic_directory_serves_index_for_html() {
    let harness = magic();
    harness.write("site/index.html", "<h1>home</h1>");

    let html = harness
        .send(
            request(Method::Get, "/site/")
                .with_header("Accept", "text/html")
                .unwrap(),
        )
        .await;
    assert_eq!(html.status(), StatusCode::OK);
    assert_eq!(header(&html, "content-location"), Some(url("/site/index.html").as_str()));
    assert_eq!(body(&html), b"<h1>home</h1>");

    let listing = harness
        .send(
            request(Method::Get, "/site")
                .with_header("Accept", "application/ld+json")
                .unwrap(),
        )
        .await;
    assert_eq!(header(&listing, "content-location"), Some(url("/site/").as_str()));
    let graph: Value = serde_json::from_slice(body(&listing)).unwrap();
    assert_eq!(graph["@graph"][0]["@id"], url("/site/"));
}

#[tokio::test]
async fn test_magic_post_creates_fresh_member() {
    let harness = magic();
    harness.mkdir("inbox");

    let post = harness
        .send(
            request(Method::Post, "/inbox/")
                .with_header("Content-Type", "text/plain")
                .unwrap()
                .with_body("note"),
        )
        .await;
    assert_eq!(post.status(), StatusCode::CREATED);
    let location = header(&post, "location").unwrap();
    assert!(location.starts_with(&url("/inbox/")));
    assert_eq!(std::fs::read_dir(harness.file("inbox")).unwrap().count(), 1);
}

#[tokio::test]
async fn test_accept_extensions_find_suffixed_file() {
    let harness = Harness::with(|builder| builder.suffix_candidates(AcceptExtensions));
    harness.write("page.html", "<p>hi</p>");

    let get = harness
        .send(
            request(Method::Get, "/page")
                .with_header("Accept", "text/html")
                .unwrap(),
        )
        .await;
    assert_eq!(get.status(), StatusCode::OK);
    assert_eq!(header(&get, "content-location"), Some(url("/page.html").as_str()));
    assert_eq!(body(&get), b"<p>hi</p>");

    let json = harness
        .send(
            request(Method::Get, "/page")
                .with_header("Accept", "application/json")
                .unwrap(),
        )
        .await;
    assert_eq!(json.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = FsStoreConfig::from_json_str(&format!(
        r#"{{"root": {}, "magic_extensions": true, "acl_suffix": ".access"}}"#,
        serde_json::to_string(&dir.path()).unwrap()
    ))
    .unwrap();
    let store = FsStoreBuilder::from_config(LocalFs, &config).build().unwrap();

    let put = httpfs_core::Store::fetch(
        &store,
        request(Method::Put, "/doc")
            .with_header("Content-Type", "application/json")
            .unwrap()
            .with_body("{}"),
    )
    .await
    .unwrap();
    assert_eq!(header(&put, "content-location"), Some(url("/doc$.json").as_str()));

    std::fs::write(dir.path().join("doc$.json.access"), "").unwrap();
    let head = httpfs_core::Store::fetch(&store, request(Method::Head, "/doc"))
        .await
        .unwrap();
    let links: Vec<&str> = head
        .headers()
        .get_all("link")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    assert!(links.contains(&format!("<{}>; rel=\"acl\"", url("/doc$.json.access")).as_str()));
}
