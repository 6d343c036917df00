//! Explicit memoizing wrapper around a statistics source.
//!
//! Results are keyed by query and window. The cache is owned by whoever builds
//! it; there is no process-wide state. Call `clear()` after new draws land.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{FrequencySnapshot, QuadrantTotal, RecencyEntry, StatisticsError, StatisticsSource};

#[derive(Debug, Default)]
struct Entries {
    frequencies: HashMap<Option<u32>, FrequencySnapshot>,
    recency: Option<Vec<RecencyEntry>>,
    quadrants: HashMap<Option<u32>, Vec<QuadrantTotal>>,
    hits: u64,
    misses: u64,
}

/// Memoizes reads from `S`. Errors are never cached.
#[derive(Debug)]
pub struct StatisticsCache<S> {
    inner: S,
    entries: Mutex<Entries>,
}

impl<S: StatisticsSource> StatisticsCache<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Drop every memoized result.
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.frequencies.clear();
        entries.recency = None;
        entries.quadrants.clear();
    }

    /// Drop results computed for one window. Recency has no window and is kept.
    pub fn invalidate(&self, window: Option<u32>) {
        let mut entries = self.lock();
        entries.frequencies.remove(&window);
        entries.quadrants.remove(&window);
    }

    /// Number of memoized results.
    pub fn len(&self) -> usize {
        let entries = self.lock();
        entries.frequencies.len() + entries.quadrants.len() + usize::from(entries.recency.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(hits, misses)` since construction.
    pub fn hit_stats(&self) -> (u64, u64) {
        let entries = self.lock();
        (entries.hits, entries.misses)
    }
}

impl<S: StatisticsSource> StatisticsSource for StatisticsCache<S> {
    fn frequencies(&self, window: Option<u32>) -> Result<FrequencySnapshot, StatisticsError> {
        {
            let mut entries = self.lock();
            if let Some(found) = entries.frequencies.get(&window).cloned() {
                entries.hits += 1;
                return Ok(found);
            }
            entries.misses += 1;
        }
        let fresh = self.inner.frequencies(window)?;
        self.lock().frequencies.insert(window, fresh.clone());
        Ok(fresh)
    }

    fn recency(&self) -> Result<Vec<RecencyEntry>, StatisticsError> {
        {
            let mut entries = self.lock();
            if let Some(found) = entries.recency.clone() {
                entries.hits += 1;
                return Ok(found);
            }
            entries.misses += 1;
        }
        let fresh = self.inner.recency()?;
        self.lock().recency = Some(fresh.clone());
        Ok(fresh)
    }

    fn quadrants(&self, window: Option<u32>) -> Result<Vec<QuadrantTotal>, StatisticsError> {
        {
            let mut entries = self.lock();
            if let Some(found) = entries.quadrants.get(&window).cloned() {
                entries.hits += 1;
                return Ok(found);
            }
            entries.misses += 1;
        }
        let fresh = self.inner.quadrants(window)?;
        self.lock().quadrants.insert(window, fresh.clone());
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::{Draw, DrawHistory};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often the wrapped source is actually read.
    struct CountingSource {
        history: DrawHistory,
        reads: AtomicUsize,
    }

    impl StatisticsSource for CountingSource {
        fn frequencies(&self, window: Option<u32>) -> Result<FrequencySnapshot, StatisticsError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.history.frequencies(window)
        }

        fn recency(&self) -> Result<Vec<RecencyEntry>, StatisticsError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.history.recency()
        }

        fn quadrants(&self, window: Option<u32>) -> Result<Vec<QuadrantTotal>, StatisticsError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.history.quadrants(window)
        }
    }

    fn counting() -> StatisticsCache<CountingSource> {
        let history = DrawHistory::new(vec![Draw::new(1, vec![1, 2, 3, 4, 5, 6])]).unwrap();
        StatisticsCache::new(CountingSource {
            history,
            reads: AtomicUsize::new(0),
        })
    }

    #[test]
    fn repeated_reads_hit_cache() {
        let cache = counting();
        cache.frequencies(Some(10)).unwrap();
        cache.frequencies(Some(10)).unwrap();
        cache.recency().unwrap();
        cache.recency().unwrap();
        assert_eq!(cache.inner().reads.load(Ordering::SeqCst), 2);
        assert_eq!(cache.hit_stats(), (2, 2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn windows_are_cached_separately() {
        let cache = counting();
        cache.quadrants(Some(10)).unwrap();
        cache.quadrants(None).unwrap();
        assert_eq!(cache.inner().reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_drops_one_window() {
        let cache = counting();
        cache.frequencies(Some(10)).unwrap();
        cache.frequencies(None).unwrap();
        cache.invalidate(Some(10));
        assert_eq!(cache.len(), 1);
        cache.frequencies(Some(10)).unwrap();
        assert_eq!(cache.inner().reads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn clear_empties_everything() {
        let cache = counting();
        cache.frequencies(None).unwrap();
        cache.recency().unwrap();
        cache.quadrants(None).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = counting();
        assert!(cache.frequencies(Some(0)).is_err());
        assert!(cache.is_empty());
    }
}
