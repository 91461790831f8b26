//! Per-resource read/write locking.
//!
//! The store takes one lock per external request before its handler runs.
//! The lock is held by a [`LockGuard`] and released when the guard drops,
//! on every exit path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use async_trait::async_trait;
use httpfs_core::Method;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Read,
    Write,
}

/// Decides which lock, if any, a request needs.
pub trait LockClassifier: Send + Sync {
    fn classify(&self, method: &Method) -> Option<LockMode>;
}

/// PUT, POST, COPY and DELETE write; GET and HEAD read; anything else takes
/// no lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl LockClassifier for DefaultClassifier {
    fn classify(&self, method: &Method) -> Option<LockMode> {
        match method {
            Method::Put | Method::Post | Method::Copy | Method::Delete => Some(LockMode::Write),
            Method::Get | Method::Head => Some(LockMode::Read),
            Method::Options | Method::Other(_) => None,
        }
    }
}

impl<F> LockClassifier for F
where
    F: Fn(&Method) -> Option<LockMode> + Send + Sync,
{
    fn classify(&self, method: &Method) -> Option<LockMode> {
        self(method)
    }
}

/// A held lock. Dropping it runs the release exactly once.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl LockGuard {
    /// A guard that runs `release` when dropped.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A guard that keeps `guard` alive until dropped.
    pub fn holding<T: Send + 'static>(guard: T) -> Self {
        Self::new(move || drop(guard))
    }

    /// A guard that holds nothing.
    pub fn unlocked() -> Self {
        Self { release: None }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("held", &self.release.is_some())
            .finish()
    }
}

/// Acquires locks keyed by resource.
///
/// Whether readers exclude each other, or writers exclude readers, is up to
/// the implementation.
#[async_trait]
pub trait LockFactory: Send + Sync {
    async fn write_lock(&self, key: &str) -> LockGuard;
    async fn read_lock(&self, key: &str) -> LockGuard;
}

/// One `tokio` `RwLock` per key: writers are exclusive, readers share.
///
/// Entries are dropped once no guard refers to them.
#[derive(Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Weak<RwLock<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &str) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(key).and_then(Weak::upgrade) {
            return lock;
        }
        locks.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(RwLock::new(()));
        locks.insert(key.to_string(), Arc::downgrade(&lock));
        lock
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.values().filter(|lock| lock.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LockFactory for KeyedLocks {
    async fn write_lock(&self, key: &str) -> LockGuard {
        let guard = self.entry(key).write_owned().await;
        LockGuard::holding(guard)
    }

    async fn read_lock(&self, key: &str) -> LockGuard {
        let guard = self.entry(key).read_owned().await;
        LockGuard::holding(guard)
    }
}

/// Takes no locks at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocks;

#[async_trait]
impl LockFactory for NoLocks {
    async fn write_lock(&self, _key: &str) -> LockGuard {
        LockGuard::unlocked()
    }

    async fn read_lock(&self, _key: &str) -> LockGuard {
        LockGuard::unlocked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn default_classification() {
        assert_eq!(DefaultClassifier.classify(&Method::Put), Some(LockMode::Write));
        assert_eq!(DefaultClassifier.classify(&Method::Copy), Some(LockMode::Write));
        assert_eq!(DefaultClassifier.classify(&Method::Head), Some(LockMode::Read));
        assert_eq!(DefaultClassifier.classify(&Method::Options), None);
    }

    #[test]
    fn release_runs_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let guard = LockGuard::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(guard);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_runs_on_panic() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = LockGuard::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            panic!("handler fault");
        });
        assert!(result.is_err());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn writers_are_exclusive() {
        let locks = Arc::new(KeyedLocks::new());
        let first = locks.write_lock("a").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _second = locks.write_lock("a").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(first);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn readers_share_and_keys_are_independent() {
        let locks = KeyedLocks::new();
        let _r1 = locks.read_lock("a").await;
        let _r2 = tokio::time::timeout(Duration::from_millis(100), locks.read_lock("a"))
            .await
            .unwrap();
        let _w = tokio::time::timeout(Duration::from_millis(100), locks.write_lock("b"))
            .await
            .unwrap();
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn entries_are_dropped_with_their_guards() {
        let locks = KeyedLocks::new();
        let guard = locks.write_lock("a").await;
        assert_eq!(locks.len(), 1);
        drop(guard);
        assert!(locks.is_empty());
    }
}
