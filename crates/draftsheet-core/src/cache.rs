// Time- and file-aware memo for ranking reports.
//
// Callers that recompute repeatedly (a dashboard polling the CLI, a watch
// loop) hold one of these. A cached value is reused until its TTL elapses or
// one of the watched files changes its modification time.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::pipeline::RankingReport;

pub const DEFAULT_TTL_SECS: i64 = 300;

/// Modification time per watched path; `None` when the file is missing.
type Snapshot = Vec<(PathBuf, Option<SystemTime>)>;

struct CachedValue<T> {
    value: Arc<T>,
    computed_at: DateTime<Utc>,
    mtimes: Snapshot,
}

pub struct RankingCache<T = RankingReport> {
    ttl: Duration,
    watched: Vec<PathBuf>,
    slot: Mutex<Option<CachedValue<T>>>,
}

impl<T> RankingCache<T> {
    pub fn new(watched: Vec<PathBuf>, ttl: Duration) -> Self {
        Self {
            ttl,
            watched,
            slot: Mutex::new(None),
        }
    }

    pub fn with_default_ttl(watched: Vec<PathBuf>) -> Self {
        Self::new(watched, Duration::seconds(DEFAULT_TTL_SECS))
    }

    /// Return the cached value, or run `compute` and cache its result.
    ///
    /// The lock is held across `compute`, so concurrent callers wait for a
    /// single recompute. A failed compute leaves the previous entry cleared.
    pub fn get_or_compute<E, F>(&self, now: DateTime<Utc>, compute: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let mut slot = self.lock();
        let mtimes = self.snapshot();

        if let Some(cached) = slot.as_ref() {
            let age = now - cached.computed_at;
            if age <= self.ttl && cached.mtimes == mtimes {
                debug!("ranking cache hit (age {}s)", age.num_seconds());
                return Ok(Arc::clone(&cached.value));
            }
            if age > self.ttl {
                info!("ranking cache expired after {}s", age.num_seconds());
            } else {
                info!("watched input changed; recomputing rankings");
            }
        }

        *slot = None;
        let value = Arc::new(compute()?);
        *slot = Some(CachedValue {
            value: Arc::clone(&value),
            computed_at: now,
            mtimes,
        });
        Ok(value)
    }

    /// Drop the cached value so the next call recomputes.
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    pub fn is_cached(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedValue<T>>> {
        // A panic inside `compute` poisons the lock; the slot is still usable.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn snapshot(&self) -> Snapshot {
        self.watched
            .iter()
            .map(|p| {
                let mtime = std::fs::metadata(p).and_then(|m| m.modified()).ok();
                (p.clone(), mtime)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("draftsheet_cache_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reuses_value_within_ttl() {
        let cache: RankingCache<u32> = RankingCache::with_default_ttl(vec![]);
        let calls = Cell::new(0);
        let now = Utc::now();
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, Infallible>(7)
        };

        assert_eq!(*cache.get_or_compute(now, compute).unwrap(), 7);
        assert_eq!(*cache.get_or_compute(now + Duration::seconds(300), compute).unwrap(), 7);
        assert_eq!(calls.get(), 1);

        cache.get_or_compute(now + Duration::seconds(301), compute).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let cache: RankingCache<u32> = RankingCache::with_default_ttl(vec![]);
        let calls = Cell::new(0);
        let now = Utc::now();
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, Infallible>(calls.get())
        };
        cache.get_or_compute(now, compute).unwrap();
        assert!(cache.is_cached());
        cache.invalidate();
        assert!(!cache.is_cached());
        assert_eq!(*cache.get_or_compute(now, compute).unwrap(), 2);
    }

    #[test]
    fn watched_file_appearing_forces_recompute() {
        let dir = temp_dir("watch");
        let watched = dir.join("adp.csv");
        let cache: RankingCache<u32> = RankingCache::with_default_ttl(vec![watched.clone()]);
        let calls = Cell::new(0);
        let now = Utc::now();
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, Infallible>(0)
        };

        cache.get_or_compute(now, compute).unwrap();
        cache.get_or_compute(now, compute).unwrap();
        assert_eq!(calls.get(), 1);

        std::fs::write(&watched, "Player,ADP\n").unwrap();
        cache.get_or_compute(now, compute).unwrap();
        assert_eq!(calls.get(), 2);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_compute_is_not_cached() {
        let cache: RankingCache<u32> = RankingCache::with_default_ttl(vec![]);
        let now = Utc::now();
        assert!(cache.get_or_compute(now, || Err::<u32, _>("boom")).is_err());
        assert!(!cache.is_cached());
        assert_eq!(*cache.get_or_compute(now, || Ok::<_, &str>(3)).unwrap(), 3);
    }
}
