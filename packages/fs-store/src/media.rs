//! Media types by file extension, and back.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A magic extension at the end of a file name: `name$.ext`.
    pub static ref MAGIC_EXTENSION: Regex = Regex::new(r"\$\.[^./$]+$").unwrap();
}

/// Conventional extension for common media types. Consulted before
/// `mime_guess`, whose extension lists are not ordered by preference.
const PREFERRED: &[(&str, &str)] = &[
    ("text/plain", "txt"),
    ("text/html", "html"),
    ("text/css", "css"),
    ("text/csv", "csv"),
    ("text/markdown", "md"),
    ("text/turtle", "ttl"),
    ("text/n3", "n3"),
    ("application/json", "json"),
    ("application/ld+json", "jsonld"),
    ("application/javascript", "js"),
    ("application/xml", "xml"),
    ("application/pdf", "pdf"),
    ("application/octet-stream", "bin"),
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/svg+xml", "svg"),
];

/// The extension of the last path segment. A magic extension wins over an
/// ordinary one.
pub fn extension_of(path: &str) -> Option<&str> {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    if let Some(found) = MAGIC_EXTENSION.find(name) {
        return Some(&name[found.start() + 2..]);
    }
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension)
}

/// The media type registered for an extension.
pub fn type_for_extension(extension: &str) -> Option<&'static str> {
    let extension = extension.to_ascii_lowercase();
    PREFERRED
        .iter()
        .find(|(_, ext)| *ext == extension)
        .map(|(media_type, _)| *media_type)
        .or_else(|| mime_guess::from_ext(&extension).first_raw())
}

/// The media type of a path, by its extension.
pub fn lookup(path: &str) -> Option<&'static str> {
    extension_of(path).and_then(type_for_extension)
}

/// The preferred file extension for a media type.
pub fn extension(media_type: &str) -> Option<&'static str> {
    extensions(media_type).into_iter().next()
}

/// Every known extension for a media type, preferred first.
pub fn extensions(media_type: &str) -> Vec<&'static str> {
    let media_type = media_type.to_ascii_lowercase();
    let mut found: Vec<&'static str> = PREFERRED
        .iter()
        .filter(|(known, _)| *known == media_type)
        .map(|(_, ext)| *ext)
        .collect();
    if let Some(guessed) = mime_guess::get_mime_extensions_str(&media_type) {
        for ext in guessed {
            if !found.contains(ext) {
                found.push(ext);
            }
        }
    }
    found
}
