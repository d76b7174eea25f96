use crate::schema::news::{NewsItem, NewsSource};
use crate::schema::stock::series::{DateRange, PriceSeries, PriceSource};
use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use tracing::trace;

/// Bounded least-recently-used memo of successful fetches.
///
/// Serving from the cache and refetching are interchangeable; a capacity of `0` disables it.
#[derive(Debug)]
pub struct ResultCache<K: Hash + Eq, V: Clone> {
    inner: Option<LruCache<K, V>>,
    hits: u64,
    misses: u64,
}

impl<K: Hash + Eq + std::fmt::Debug, V: Clone> ResultCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: NonZeroUsize::new(capacity).map(LruCache::new),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        let found = self.inner.as_mut().and_then(|cache| cache.get(key).cloned());
        match found {
            Some(_) => {
                self.hits += 1;
                trace!("cache hit for {key:?}");
            }
            None => self.misses += 1,
        }
        found
    }

    pub fn put(&mut self, key: K, value: V) {
        if let Some(cache) = self.inner.as_mut() {
            cache.put(key, value);
        }
    }

    pub fn clear(&mut self) {
        if let Some(cache) = self.inner.as_mut() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |cache| cache.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.as_ref().map_or(0, |cache| cache.cap().get())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.len(),
            capacity: self.capacity(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

// -------------------------------------------------------------------------------------------------

/// One price request; symbols compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceKey {
    pub source: PriceSource,
    pub symbol: String,
    pub range: DateRange,
}

impl PriceKey {
    pub fn new(source: PriceSource, symbol: &str, range: DateRange) -> Self {
        Self {
            source,
            symbol: symbol.trim().to_uppercase(),
            range,
        }
    }
}

/// One single-provider news request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewsKey {
    pub source: NewsSource,
    pub symbol: String,
}

impl NewsKey {
    pub fn new(source: NewsSource, symbol: &str) -> Self {
        Self {
            source,
            symbol: symbol.trim().to_uppercase(),
        }
    }
}

pub type PriceCache = ResultCache<PriceKey, PriceSeries>;
pub type NewsCache = ResultCache<NewsKey, Vec<NewsItem>>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
    }

    #[test]
    fn hit_after_put() {
        let mut cache: ResultCache<&str, i32> = ResultCache::new(2);
        assert_eq!(cache.get(&"a"), None);

        cache.put("a", 1);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, entries: 1, capacity: 2 });
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let mut cache: ResultCache<&str, i32> = ResultCache::new(2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.get(&"a");
        cache.put("c", 3);

        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"c"), Some(3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let mut cache: ResultCache<&str, i32> = ResultCache::new(0);
        cache.put("a", 1);

        assert_eq!(cache.get(&"a"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 0);
    }

    #[test]
    fn price_keys_ignore_symbol_case() {
        assert_eq!(
            PriceKey::new(PriceSource::Yahoo, " aapl", range()),
            PriceKey::new(PriceSource::Yahoo, "AAPL", range())
        );
        assert_ne!(
            PriceKey::new(PriceSource::Yahoo, "AAPL", range()),
            PriceKey::new(PriceSource::AlphaVantage, "AAPL", range())
        );
        assert_eq!(NewsKey::new(NewsSource::Yahoo, "msft"), NewsKey::new(NewsSource::Yahoo, "MSFT"));
    }
}
