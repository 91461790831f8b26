use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode};
use url::Url;

use crate::Error;

/// Request verb.
///
/// Every verb a store might be asked to handle. Anything else parses to
/// [`Method::Other`] so a store can answer it with 405 instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Head,
    Get,
    Put,
    Delete,
    Copy,
    Post,
    Options,
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Head => "HEAD",
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Copy => "COPY",
            Method::Post => "POST",
            Method::Options => "OPTIONS",
            Method::Other(method) => method.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Method::from_name(s))
    }
}

impl Method {
    /// Map a verb name onto a method, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        match upper.as_str() {
            "HEAD" => Method::Head,
            "GET" => Method::Get,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "COPY" => Method::Copy,
            "POST" => Method::Post,
            "OPTIONS" => Method::Options,
            _ => Method::Other(upper),
        }
    }
}

impl From<&http::Method> for Method {
    fn from(method: &http::Method) -> Self {
        Method::from_name(method.as_str())
    }
}

impl TryFrom<&Method> for http::Method {
    type Error = Error;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        http::Method::from_bytes(method.as_str().as_bytes()).map_err(|_| Error::InvalidMethod {
            method: method.to_string(),
        })
    }
}

/// An immutable request.
///
/// Use the `with_*` methods to rebuild a request with overrides.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Build a request from a method and an absolute URL string.
    pub fn parse(method: Method, url: &str) -> Result<Self, Error> {
        Ok(Self::new(method, Url::parse(url)?))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<Bytes> {
        self.body
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_url(mut self, url: Url) -> Self {
        self.url = url;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set a header, replacing any existing values.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        let name = HeaderName::from_str(name)?;
        let value = HeaderValue::from_str(value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn without_body(mut self) -> Self {
        self.body = None;
        self
    }
}

/// A response. Built once, then handed back to the caller.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    status_text: Option<String>,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            status_text: None,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_text.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<Bytes> {
        self.body
    }

    /// True for any 2xx status.
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn with_status_text(mut self, status_text: Option<String>) -> Self {
        self.status_text = status_text;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set a header, replacing any existing values.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a header value, keeping any existing values.
    pub fn with_appended_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("Copy".parse::<Method>().unwrap(), Method::Copy);
        assert_eq!(
            "propfind".parse::<Method>().unwrap(),
            Method::Other("PROPFIND".to_string())
        );
    }

    #[test]
    fn method_converts_from_http() {
        assert_eq!(Method::from(&http::Method::PUT), Method::Put);
        let copy = http::Method::from_bytes(b"COPY").unwrap();
        assert_eq!(Method::from(&copy), Method::Copy);
    }

    #[test]
    fn method_converts_to_http() {
        let method = http::Method::try_from(&Method::Copy).unwrap();
        assert_eq!(method.as_str(), "COPY");
        assert!(http::Method::try_from(&Method::Other("BAD VERB".to_string())).is_err());
    }

    #[test]
    fn request_rebuild_keeps_other_fields() {
        let request = Request::parse(Method::Put, "https://store.test/a.txt")
            .unwrap()
            .with_header("Content-Type", "text/plain")
            .unwrap()
            .with_body("hello");

        let head = request.clone().with_method(Method::Head).without_body();
        assert_eq!(head.method(), &Method::Head);
        assert_eq!(head.url().as_str(), "https://store.test/a.txt");
        assert_eq!(head.headers()["content-type"], "text/plain");
        assert!(head.body().is_none());
        assert_eq!(request.body().unwrap().as_ref(), b"hello");
    }

    #[test]
    fn response_ok_is_2xx() {
        assert!(Response::new(StatusCode::NO_CONTENT).is_ok());
        assert!(!Response::new(StatusCode::NOT_MODIFIED).is_ok());
        assert!(!Response::new(StatusCode::NOT_FOUND).is_ok());
    }

    #[test]
    fn response_appends_multi_valued_headers() {
        let response = Response::new(StatusCode::OK)
            .with_appended_header(http::header::LINK, HeaderValue::from_static("<a>; rel=\"acl\""))
            .with_appended_header(http::header::LINK, HeaderValue::from_static("<b>; rel=\"type\""));
        assert_eq!(response.headers().get_all(http::header::LINK).iter().count(), 2);
    }
}
