//! Small helpers over [`http::HeaderMap`].

use http::header::AsHeaderName;
use http::HeaderMap;

/// First value of a header as a string, if present and valid UTF-8.
pub fn header_str<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// All values of a header joined with `,`, the way a multi-valued header
/// folds onto one line.
pub fn header_all<K: AsHeaderName>(headers: &HeaderMap, name: K) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.join(","))
    }
}

/// The media type of a `Content-Type` value, lowercased, parameters removed.
pub fn media_type(content_type: &str) -> String {
    // media-type = type "/" subtype *( OWS ";" OWS parameter )
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether the request entity is of the given media type.
pub fn is_content_type(headers: &HeaderMap, expected: &str) -> bool {
    header_str(headers, http::header::CONTENT_TYPE)
        .is_some_and(|value| media_type(value) == expected.to_ascii_lowercase())
}

/// Headers describing the entity body. These are replaced, not merged, when
/// a body is swapped for another.
pub const ENTITY_HEADERS: [&str; 5] = [
    "content-length",
    "content-type",
    "content-encoding",
    "content-md5",
    "content-range",
];
