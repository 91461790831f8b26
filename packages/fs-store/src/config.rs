use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Store settings that can be written down. Strategies that need code are
/// injected through [`FsStoreBuilder`](crate::FsStoreBuilder) instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FsStoreConfig {
    /// Directory request paths are joined onto.
    pub root: Option<PathBuf>,
    /// Served for a container when the client accepts HTML.
    pub index_document: String,
    pub acl_suffix: String,
    pub meta_suffix: String,
    /// Store resources as `name$.ext` and negotiate between them. On by
    /// default: without it a GET reports the media type of the path's
    /// extension rather than the one sent with the PUT.
    pub magic_extensions: bool,
    /// Attempts at a fresh member name before a POST gives up.
    pub max_name_attempts: u32,
}

impl Default for FsStoreConfig {
    fn default() -> Self {
        Self {
            root: None,
            index_document: "index.html".to_string(),
            acl_suffix: ".acl".to_string(),
            meta_suffix: ".meta".to_string(),
            magic_extensions: true,
            max_name_attempts: 16,
        }
    }
}

impl FsStoreConfig {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = FsStoreConfig::from_json_str(r#"{"root": "/srv/store"}"#).unwrap();
        assert_eq!(config.root.as_deref(), Some(Path::new("/srv/store")));
        assert_eq!(config.index_document, "index.html");
        assert_eq!(config.acl_suffix, ".acl");
        assert!(config.magic_extensions);
        assert_eq!(config.max_name_attempts, 16);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = FsStoreConfig::from_json_str(r#"{"rooot": "/srv"}"#);
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(
            &path,
            r#"{"root": "/data", "magic_extensions": false, "meta_suffix": ".meta.ttl"}"#,
        )
        .unwrap();

        let config = FsStoreConfig::from_path(&path).unwrap();
        assert!(!config.magic_extensions);
        assert_eq!(config.meta_suffix, ".meta.ttl");
        assert!(matches!(
            FsStoreConfig::from_path(dir.path().join("missing.json")),
            Err(Error::Io { .. })
        ));
    }
}
