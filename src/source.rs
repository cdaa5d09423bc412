use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use thiserror::Error;

use crate::data::loader;
use crate::data::model::RawListing;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a dataset load failed. Either way the pipeline does not run for
/// this load; the next refresh retries.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport failure: network, HTTP status, unreadable file.
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// The payload arrived but is not a valid listing array.
    #[error("parse failed: {0}")]
    Parse(String),
}

/// A snapshot of the raw listings, shared between the cache and its readers.
pub type Snapshot = Arc<Vec<RawListing>>;

// ---------------------------------------------------------------------------
// DatasetSource
// ---------------------------------------------------------------------------

/// Where listings come from.
pub trait DatasetSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<RawListing>, SourceError>;

    /// Short human-readable origin, for the status bar and logs.
    fn describe(&self) -> String;
}

impl<S: DatasetSource + ?Sized> DatasetSource for Box<S> {
    fn fetch(&self) -> Result<Vec<RawListing>, SourceError> {
        (**self).fetch()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// JSON array served over HTTP(S).
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Fetch(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl DatasetSource for HttpSource {
    fn fetch(&self) -> Result<Vec<RawListing>, SourceError> {
        log::info!("Fetching listings from {}", self.url);

        let body = self
            .client
            .get(&self.url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(|e| SourceError::Fetch(e.to_string()))?;

        loader::parse_json(&body).map_err(|e| SourceError::Parse(format!("{e:#}")))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Local `.json`, `.csv` or `.parquet` file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for FileSource {
    fn fetch(&self) -> Result<Vec<RawListing>, SourceError> {
        if let Err(e) = std::fs::metadata(&self.path) {
            return Err(SourceError::Fetch(format!("{}: {e}", self.path.display())));
        }
        loader::load_file(&self.path).map_err(|e| SourceError::Parse(format!("{e:#}")))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// CachedSource – time-based snapshot cache
// ---------------------------------------------------------------------------

struct CacheEntry {
    fetched_at: Instant,
    invalidated: bool,
    listings: Snapshot,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < ttl
    }
}

/// Serves the last fetched snapshot until it is `ttl` old.
///
/// A failed refetch leaves the previous snapshot in place.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl<S: DatasetSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Cached snapshot if still fresh, otherwise a new fetch.
    ///
    /// The lock is not held while fetching, so readers such as
    /// [`time_until_stale`](Self::time_until_stale) never wait on the network.
    pub fn get(&self) -> Result<Snapshot, SourceError> {
        if let Some(cached) = self.lock().as_ref().filter(|c| c.is_fresh(self.ttl)) {
            log::debug!("Serving cached listings from {}", self.inner.describe());
            return Ok(Arc::clone(&cached.listings));
        }

        let listings: Snapshot = Arc::new(self.inner.fetch()?);
        log::info!(
            "Fetched {} listings from {}",
            listings.len(),
            self.inner.describe()
        );
        *self.lock() = Some(CacheEntry {
            fetched_at: Instant::now(),
            invalidated: false,
            listings: Arc::clone(&listings),
        });
        Ok(listings)
    }

    /// Make the next [`get`](Self::get) refetch.
    pub fn invalidate(&self) {
        if let Some(cached) = self.lock().as_mut() {
            cached.invalidated = true;
        }
    }

    /// Time left before the snapshot goes stale; zero when nothing is cached.
    pub fn time_until_stale(&self) -> Duration {
        self.lock()
            .as_ref()
            .filter(|cached| !cached.invalidated)
            .map(|cached| self.ttl.saturating_sub(cached.fetched_at.elapsed()))
            .unwrap_or(Duration::ZERO)
    }

    pub fn describe(&self) -> String {
        self.inner.describe()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CacheEntry>> {
        // Entries are only ever swapped whole.
        self.entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Counts fetches; fails once `fail` is set.
    struct FakeSource {
        calls: AtomicUsize,
        fail: Mutex<bool>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: Mutex::new(false),
            }
        }
    }

    impl DatasetSource for FakeSource {
        fn fetch(&self) -> Result<Vec<RawListing>, SourceError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.fail.lock().unwrap() {
                return Err(SourceError::Fetch("offline".into()));
            }
            Ok(vec![RawListing {
                title: format!("fetch {n}"),
                ai_note: Some(3),
                ..Default::default()
            }])
        }

        fn describe(&self) -> String {
            "fake".into()
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("listings-source-{}-{name}", std::process::id()))
    }

    #[test]
    fn serves_snapshot_within_ttl() {
        let cache = CachedSource::new(FakeSource::new(), Duration::from_secs(3600));
        let first = cache.get().unwrap();
        let second = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 1);
        assert!(cache.time_until_stale() > Duration::from_secs(3500));
    }

    #[test]
    fn refetches_after_invalidate() {
        let cache = CachedSource::new(FakeSource::new(), Duration::from_secs(3600));
        cache.get().unwrap();
        cache.invalidate();
        let fresh = cache.get().unwrap();
        assert_eq!(fresh[0].title, "fetch 1");
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn zero_ttl_always_refetches() {
        let cache = CachedSource::new(FakeSource::new(), Duration::ZERO);
        cache.get().unwrap();
        cache.get().unwrap();
        assert_eq!(cache.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.time_until_stale(), Duration::ZERO);
    }

    #[test]
    fn failed_refetch_keeps_previous_snapshot() {
        let cache = CachedSource::new(FakeSource::new(), Duration::from_secs(3600));
        cache.get().unwrap();
        cache.invalidate();
        *cache.inner.fail.lock().unwrap() = true;

        assert!(matches!(cache.get(), Err(SourceError::Fetch(_))));

        *cache.inner.fail.lock().unwrap() = false;
        cache.invalidate();
        assert_eq!(cache.get().unwrap()[0].title, "fetch 2");
        assert!(cache.entry.lock().unwrap().is_some());
    }

    #[test]
    fn missing_file_is_a_fetch_error() {
        let source = FileSource::new(temp_path("does-not-exist.json"));
        assert!(matches!(source.fetch(), Err(SourceError::Fetch(_))));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let path = temp_path("broken.json");
        std::fs::write(&path, r#"[{"title": "no price", "ai_note": 1}]"#).unwrap();
        let result = FileSource::new(&path).fetch();
        std::fs::remove_file(&path).ok();

        match result {
            Err(SourceError::Parse(msg)) => assert!(msg.contains("Row 0"), "{msg}"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn file_source_reads_json() {
        let path = temp_path("ok.json");
        std::fs::write(&path, r#"[{"title": "a", "price": "9 000 €", "ai_note": 5}]"#).unwrap();
        let listings = FileSource::new(&path).fetch().unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].ai_note, Some(5));
    }
}
