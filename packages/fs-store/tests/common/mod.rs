#![allow(dead_code)]

use std::path::{Path, PathBuf};

use httpfs_core::{Method, Request, Response, Store};
use httpfs_fs_store::{FileSystem, FsStore, FsStoreBuilder, FsStoreConfig, LocalFs};
use tempfile::TempDir;

pub const BASE: &str = "https://store.test";

pub fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

pub fn request(method: Method, path: &str) -> Request {
    Request::parse(method, &url(path)).unwrap()
}

pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|value| value.to_str().ok())
}

pub fn headers<'a>(response: &'a Response, name: &str) -> Vec<&'a str> {
    response
        .headers()
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect()
}

pub fn body(response: &Response) -> &[u8] {
    response.body().map(|body| body.as_ref()).unwrap_or_default()
}

/// A store rooted in a fresh temporary directory.
pub struct Harness {
    dir: TempDir,
    pub store: FsStore,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(|builder| builder)
    }

    pub fn with(configure: impl FnOnce(FsStoreBuilder) -> FsStoreBuilder) -> Self {
        Self::on(LocalFs, configure)
    }

    pub fn on<F: FileSystem + 'static>(
        fs: F,
        configure: impl FnOnce(FsStoreBuilder) -> FsStoreBuilder,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = configure(FsStoreBuilder::new(fs).root(dir.path()))
            .build()
            .unwrap();
        Self { dir, store }
    }

    /// A store built from the default configuration.
    pub fn configured() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = FsStoreConfig::with_root(dir.path());
        let store = FsStoreBuilder::from_config(LocalFs, &config).build().unwrap();
        Self { dir, store }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.file(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn mkdir(&self, relative: &str) {
        std::fs::create_dir_all(self.file(relative)).unwrap();
    }

    pub async fn send(&self, request: Request) -> Response {
        self.store.fetch(request).await.unwrap()
    }

    pub async fn put(&self, path: &str, content_type: &str, contents: &str) -> Response {
        let request = request(Method::Put, path)
            .with_header("Content-Type", content_type)
            .unwrap()
            .with_body(contents.to_string());
        self.send(request).await
    }

    pub async fn get(&self, path: &str) -> Response {
        self.send(request(Method::Get, path)).await
    }

    pub async fn head(&self, path: &str) -> Response {
        self.send(request(Method::Head, path)).await
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.send(request(Method::Delete, path)).await
    }
}

/// A `multipart/form-data` content type and body, one part per
/// `(file name, content type, contents)`.
pub fn multipart(parts: &[(&str, &str, &str)]) -> (String, String) {
    let boundary = "httpfs-test-boundary";
    let mut body = String::new();
    for (name, content_type, contents) in parts {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n{}\r\n",
            boundary, name, content_type, contents
        ));
    }
    body.push_str(&format!("--{}--\r\n", boundary));
    (format!("multipart/form-data; boundary={}", boundary), body)
}
