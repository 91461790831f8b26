//! Filesystem primitives consumed by the store.
//!
//! A [`FileSystem`] advertises which [`Primitive`]s it implements. The store
//! reads that table once, at construction, to decide which verbs it can
//! serve. Primitives a filesystem does not implement fail with
//! [`io::ErrorKind::Unsupported`].

use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bytes::Bytes;

/// One filesystem operation the store may rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Primitive {
    Stat,
    ReadFile,
    WriteFile,
    Unlink,
    ReadDir,
    CreateDirAll,
    RemoveDirAll,
}

impl Primitive {
    pub const ALL: [Primitive; 7] = [
        Primitive::Stat,
        Primitive::ReadFile,
        Primitive::WriteFile,
        Primitive::Unlink,
        Primitive::ReadDir,
        Primitive::CreateDirAll,
        Primitive::RemoveDirAll,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Stat => "stat",
            Primitive::ReadFile => "read_file",
            Primitive::WriteFile => "write_file",
            Primitive::Unlink => "unlink",
            Primitive::ReadDir => "read_dir",
            Primitive::CreateDirAll => "create_dir_all",
            Primitive::RemoveDirAll => "remove_dir_all",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of primitives a filesystem implements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Capabilities {
    primitives: BTreeSet<Primitive>,
}

impl Capabilities {
    pub fn all() -> Self {
        Primitive::ALL.into_iter().collect()
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, primitive: Primitive) -> Self {
        self.primitives.insert(primitive);
        self
    }

    pub fn without(mut self, primitive: Primitive) -> Self {
        self.primitives.remove(&primitive);
        self
    }

    pub fn contains(&self, primitive: Primitive) -> bool {
        self.primitives.contains(&primitive)
    }

    pub fn contains_all(&self, required: &[Primitive]) -> bool {
        required.iter().all(|primitive| self.contains(*primitive))
    }

    pub fn iter(&self) -> impl Iterator<Item = Primitive> + '_ {
        self.primitives.iter().copied()
    }
}

impl FromIterator<Primitive> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Primitive>>(iter: I) -> Self {
        Self {
            primitives: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Other,
}

/// Filesystem status of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub kind: FileKind,
    pub size: u64,
    pub modified: SystemTime,
}

impl Stat {
    pub fn file(size: u64, modified: SystemTime) -> Self {
        Self {
            kind: FileKind::File,
            size,
            modified,
        }
    }

    pub fn directory(modified: SystemTime) -> Self {
        Self {
            kind: FileKind::Directory,
            size: 0,
            modified,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

impl From<&std::fs::Metadata> for Stat {
    fn from(metadata: &std::fs::Metadata) -> Self {
        let kind = if metadata.is_file() {
            FileKind::File
        } else if metadata.is_dir() {
            FileKind::Directory
        } else {
            FileKind::Other
        };
        Self {
            kind,
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(UNIX_EPOCH),
        }
    }
}

pub(crate) fn unsupported(primitive: Primitive) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{} is not supported by this filesystem", primitive),
    )
}

/// The filesystem a store is rooted on.
///
/// Only [`stat`](FileSystem::stat) is mandatory. Every other primitive has a
/// default that fails with `Unsupported`; implementors override the ones
/// they list in [`capabilities`](FileSystem::capabilities).
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// The primitives this filesystem implements.
    fn capabilities(&self) -> Capabilities;

    /// Status of `path`, or `None` if nothing is there.
    async fn stat(&self, path: &Path) -> io::Result<Option<Stat>>;

    async fn read_file(&self, _path: &Path) -> io::Result<Bytes> {
        Err(unsupported(Primitive::ReadFile))
    }

    async fn write_file(&self, _path: &Path, _data: Bytes) -> io::Result<()> {
        Err(unsupported(Primitive::WriteFile))
    }

    async fn unlink(&self, _path: &Path) -> io::Result<()> {
        Err(unsupported(Primitive::Unlink))
    }

    /// Child names of a directory, in the order the filesystem yields them.
    async fn read_dir(&self, _path: &Path) -> io::Result<Vec<String>> {
        Err(unsupported(Primitive::ReadDir))
    }

    async fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Err(unsupported(Primitive::CreateDirAll))
    }

    async fn remove_dir_all(&self, _path: &Path) -> io::Result<()> {
        Err(unsupported(Primitive::RemoveDirAll))
    }
}

/// The local disk, through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl FileSystem for LocalFs {
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    async fn stat(&self, path: &Path) -> io::Result<Option<Stat>> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(Some(Stat::from(&metadata))),
            Err(error) if error.kind() == io::ErrorKind::PermissionDenied => Err(error),
            // Missing entries and paths through a regular file both read as absent.
            Err(error) => {
                log::debug!("stat {} failed: {}", path.display(), error);
                Ok(None)
            }
        }
    }

    async fn read_file(&self, path: &Path) -> io::Result<Bytes> {
        tokio::fs::read(path).await.map(Bytes::from)
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> io::Result<()> {
        tokio::fs::write(path, data).await
    }

    async fn unlink(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => log::debug!("skipping non UTF-8 entry {:?}", name),
            }
        }
        Ok(names)
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_dir_all(path).await
    }
}

/// A filesystem with some of its primitives hidden.
///
/// Hidden primitives are dropped from [`FileSystem::capabilities`] and fail
/// with `Unsupported` when called.
pub struct Restricted<F> {
    inner: F,
    capabilities: Capabilities,
}

impl<F: FileSystem> Restricted<F> {
    pub fn new(inner: F, hidden: &[Primitive]) -> Self {
        let capabilities = hidden
            .iter()
            .fold(inner.capabilities(), |caps, primitive| caps.without(*primitive));
        Self {
            inner,
            capabilities,
        }
    }

    /// Stat, read and directory listing only.
    pub fn read_only(inner: F) -> Self {
        Self::new(
            inner,
            &[
                Primitive::WriteFile,
                Primitive::Unlink,
                Primitive::CreateDirAll,
                Primitive::RemoveDirAll,
            ],
        )
    }

    fn check(&self, primitive: Primitive) -> io::Result<()> {
        if self.capabilities.contains(primitive) {
            Ok(())
        } else {
            Err(unsupported(primitive))
        }
    }
}

#[async_trait]
impl<F: FileSystem> FileSystem for Restricted<F> {
    fn capabilities(&self) -> Capabilities {
        self.capabilities.clone()
    }

    async fn stat(&self, path: &Path) -> io::Result<Option<Stat>> {
        self.check(Primitive::Stat)?;
        self.inner.stat(path).await
    }

    async fn read_file(&self, path: &Path) -> io::Result<Bytes> {
        self.check(Primitive::ReadFile)?;
        self.inner.read_file(path).await
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> io::Result<()> {
        self.check(Primitive::WriteFile)?;
        self.inner.write_file(path, data).await
    }

    async fn unlink(&self, path: &Path) -> io::Result<()> {
        self.check(Primitive::Unlink)?;
        self.inner.unlink(path).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        self.check(Primitive::ReadDir)?;
        self.inner.read_dir(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.check(Primitive::CreateDirAll)?;
        self.inner.create_dir_all(path).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.check(Primitive::RemoveDirAll)?;
        self.inner.remove_dir_all(path).await
    }
}
