mod common;

use httpfs_core::{Method, StatusCode};
use httpfs_remote::RemoteStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{body, header, request, url, Harness};

#[tokio::test]
async fn test_copy_local_file() {
    let harness = Harness::new();
    harness.put("/src.txt", "text/plain", "copied").await;

    let copy = harness
        .send(
            request(Method::Copy, "/nested/dst.txt")
                .with_header("Source", "/src.txt")
                .unwrap(),
        )
        .await;
    assert_eq!(copy.status(), StatusCode::CREATED);
    assert_eq!(header(&copy, "location"), Some(url("/nested/dst.txt").as_str()));

    let get = harness.get("/nested/dst.txt").await;
    assert_eq!(body(&get), b"copied");
    assert_eq!(body(&harness.get("/src.txt").await), b"copied");
}

#[tokio::test]
async fn test_copy_relative_source() {
    let harness = Harness::new();
    harness.write("dir/a.txt", "alpha");

    let copy = harness
        .send(
            request(Method::Copy, "/dir/b.txt")
                .with_header("Source", "./a.txt")
                .unwrap(),
        )
        .await;
    assert_eq!(copy.status(), StatusCode::CREATED);
    assert_eq!(std::fs::read_to_string(harness.file("dir/b.txt")).unwrap(), "alpha");
}

#[tokio::test]
async fn test_copy_requires_source() {
    let harness = Harness::new();
    let copy = harness.send(request(Method::Copy, "/dst.txt")).await;
    assert_eq!(copy.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&copy, "warning"), Some("199 - Source header missing"));
}

#[tokio::test]
async fn test_copy_missing_source_is_not_found() {
    let harness = Harness::new();
    let copy = harness
        .send(
            request(Method::Copy, "/dst.txt")
                .with_header("Source", "/nope.txt")
                .unwrap(),
        )
        .await;
    assert_eq!(copy.status(), StatusCode::NOT_FOUND);
    assert!(!harness.file("dst.txt").exists());
}

#[tokio::test]
async fn test_copy_rejects_file_directory_mismatch() {
    let harness = Harness::new();
    harness.mkdir("dir");
    harness.write("file.txt", "x");

    let dir_onto_file = harness
        .send(
            request(Method::Copy, "/copy.txt")
                .with_header("Source", "/dir/")
                .unwrap(),
        )
        .await;
    assert_eq!(dir_onto_file.status(), StatusCode::BAD_REQUEST);

    let file_onto_dir = harness
        .send(
            request(Method::Copy, "/dir/")
                .with_header("Source", "/file.txt")
                .unwrap(),
        )
        .await;
    assert_eq!(file_onto_dir.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_copy_directory_is_not_implemented() {
    let harness = Harness::new();
    harness.write("a/one.txt", "1");
    harness.mkdir("b");

    let copy = harness
        .send(
            request(Method::Copy, "/b/")
                .with_header("Source", "/a/")
                .unwrap(),
        )
        .await;
    assert_eq!(copy.status(), StatusCode::NOT_IMPLEMENTED);
    assert!(!harness.file("b/one.txt").exists());
}

#[tokio::test]
async fn test_copy_external_without_resolver() {
    let harness = Harness::new();
    let copy = harness
        .send(
            request(Method::Copy, "/dst.txt")
                .with_header("Source", "https://elsewhere.test/a.txt")
                .unwrap(),
        )
        .await;
    assert_eq!(copy.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_copy_external_through_remote_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/remote.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string("from afar"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::with(|builder| builder.external(RemoteStore::new()));
    let copy = harness
        .send(
            request(Method::Copy, "/copied.txt")
                .with_header("Source", &format!("{}/remote.txt", server.uri()))
                .unwrap(),
        )
        .await;
    assert_eq!(copy.status(), StatusCode::CREATED);
    assert_eq!(
        std::fs::read_to_string(harness.file("copied.txt")).unwrap(),
        "from afar"
    );
}

#[tokio::test]
async fn test_copy_external_failure_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.txt"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let harness = Harness::with(|builder| builder.external(RemoteStore::new()));
    let copy = harness
        .send(
            request(Method::Copy, "/copied.txt")
                .with_header("Source", &format!("{}/gone.txt", server.uri()))
                .unwrap(),
        )
        .await;
    assert_eq!(copy.status(), StatusCode::GONE);
    assert!(!harness.file("copied.txt").exists());
}
