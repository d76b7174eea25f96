use crate::api::HttpClient;
use crate::cache::{CacheStats, NewsCache, NewsKey, PriceCache, PriceKey};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::export;
use crate::schema::news::{NewsItem, NewsSource};
use crate::schema::stock::search::{self, SymbolCandidate};
use crate::schema::stock::series::{DateRange, PriceSeries, PriceSource};
use crate::schema::{AlphaVantage, Yahoo};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Owns the HTTP client, the configuration and the result caches; every user action goes
/// through here, one request at a time.
pub struct Dashboard {
    http_client: HttpClient,
    config: Config,
    prices: PriceCache,
    news: NewsCache,
}

impl Dashboard {
    pub fn new(config: Config) -> Result<Self> {
        let http_client = stockdash_util::build_client(&config.user_agent, config.timeout)?;
        Ok(Self::with_client(config, http_client))
    }

    pub fn with_client(config: Config, http_client: HttpClient) -> Self {
        Self {
            prices: PriceCache::new(config.cache_capacity),
            news: NewsCache::new(config.cache_capacity),
            http_client,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache_stats(&self) -> (CacheStats, CacheStats) {
        (self.prices.stats(), self.news.stats())
    }

    pub fn clear_cache(&mut self) {
        self.prices.clear();
        self.news.clear();
    }

    /// Company name -> ticker candidates (never cached; searches are cheap to repeat).
    pub async fn search(&self, company: &str) -> Result<Vec<SymbolCandidate>> {
        AlphaVantage::search(&self.http_client, &self.config, company).await
    }

    /// Daily prices with derived columns, served from the cache when the same request
    /// succeeded before.
    pub async fn prices(&mut self, symbol: &str, range: DateRange, source: PriceSource) -> Result<PriceSeries> {
        let key = PriceKey::new(source, symbol, range);
        if let Some(series) = self.prices.get(&key) {
            debug!("[{}] prices for {range} served from cache", key.symbol);
            return Ok(series);
        }

        let series = match source {
            PriceSource::AlphaVantage => {
                AlphaVantage::daily(&self.http_client, &self.config, &key.symbol, range).await?
            }
            PriceSource::Yahoo => Yahoo::daily(&self.http_client, &self.config, &key.symbol, range).await?,
        };
        self.prices.put(key, series.clone());

        Ok(series)
    }

    /// News from every provider behind `source`. A failing provider becomes a warning,
    /// never an error.
    pub async fn news(&mut self, symbol: &str, source: NewsSource) -> (Vec<NewsItem>, Vec<String>) {
        let mut items = Vec::new();
        let mut warnings = Vec::new();

        for provider in source.providers() {
            let key = NewsKey::new(*provider, symbol);
            if let Some(cached) = self.news.get(&key) {
                items.extend(cached);
                continue;
            }

            let fetched = match provider {
                NewsSource::Yahoo => Yahoo::news(&self.http_client, &self.config, &key.symbol).await,
                _ => AlphaVantage::news(&self.http_client, &self.config, &key.symbol).await,
            };
            match fetched {
                Ok(fetched) => {
                    self.news.put(key, fetched.clone());
                    items.extend(fetched);
                }
                Err(e) => {
                    warn!("[{}] {provider} news failed: {e}", key.symbol);
                    warnings.push(format!("{provider} news unavailable: {e}"));
                }
            }
        }

        (items, warnings)
    }

    /// Fetch prices (and optionally news) for the session's symbol, replacing its snapshot.
    ///
    /// On failure the previous snapshot is dropped, so nothing stale can be exported.
    pub async fn refresh<'s>(
        &mut self,
        session: &'s mut Session,
        source: PriceSource,
        news: Option<NewsSource>,
    ) -> Result<&'s Snapshot> {
        session.snapshot = None;
        let symbol = session.symbol.clone().ok_or(Error::NoSelection)?;
        let range = session.range;

        info!("fetching [{symbol}] from {source} for {range}");
        let series = self.prices(&symbol, range, source).await.map_err(|e| {
            error!("[{symbol}] price fetch failed: {e}");
            e
        })?;

        let (news, warnings) = match news {
            Some(news_source) => self.news(&symbol, news_source).await,
            None => (vec![], vec![]),
        };

        let label = session.label();
        Ok(session.snapshot.insert(Snapshot {
            label,
            series,
            news,
            warnings,
        }))
    }
}

// -------------------------------------------------------------------------------------------------

/// Everything one fetch produced, held until the next fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub label: String,
    pub series: PriceSeries,
    pub news: Vec<NewsItem>,
    pub warnings: Vec<String>,
}

/// The user's working state between actions: what was searched, what was picked,
/// which range, and the last fetch result (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub query: String,
    pub candidates: Vec<SymbolCandidate>,
    pub symbol: Option<String>,
    pub range: DateRange,
    pub snapshot: Option<Snapshot>,
}

impl Session {
    pub fn new(range: DateRange) -> Self {
        Self {
            query: String::new(),
            candidates: vec![],
            symbol: None,
            range,
            snapshot: None,
        }
    }

    /// Record a search result; any earlier selection no longer applies.
    pub fn set_candidates(&mut self, query: &str, candidates: Vec<SymbolCandidate>) {
        self.query = query.trim().to_string();
        self.candidates = candidates;
        self.symbol = None;
    }

    /// Pick a candidate by picker label or symbol.
    pub fn select(&mut self, choice: &str) -> Option<&SymbolCandidate> {
        let chosen = search::select(&self.candidates, choice)?;
        self.symbol = Some(chosen.symbol.clone());
        Some(chosen)
    }

    pub fn select_first(&mut self) -> Option<&SymbolCandidate> {
        let first = self.candidates.first()?;
        self.symbol = Some(first.symbol.clone());
        Some(first)
    }

    /// Use a ticker directly, skipping the search.
    pub fn set_symbol(&mut self, symbol: &str) {
        self.symbol = Some(symbol.trim().to_uppercase());
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.range = range;
    }

    pub fn selected(&self) -> Option<&SymbolCandidate> {
        let symbol = self.symbol.as_deref()?;
        self.candidates.iter().find(|c| c.symbol == symbol)
    }

    /// `"Apple Inc (AAPL)"` after a search, the bare symbol otherwise.
    pub fn label(&self) -> String {
        match (self.selected(), &self.symbol) {
            (Some(candidate), _) => candidate.label(),
            (None, Some(symbol)) => symbol.clone(),
            (None, None) => self.query.clone(),
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// The last fetch as CSV bytes; `None` when nothing has been fetched yet.
    pub fn export_csv(&self) -> Result<Option<Vec<u8>>> {
        match &self.snapshot {
            Some(snapshot) => export::to_csv_bytes(&snapshot.series).map(Some),
            None => {
                debug!("nothing fetched yet; CSV export skipped");
                Ok(None)
            }
        }
    }

    /// Write the last fetch to `dir/<label>_data.csv` (or `path` when it names a file).
    /// `None` when nothing has been fetched yet.
    pub async fn save_csv(&self, path: Option<&Path>) -> Result<Option<PathBuf>> {
        let Some(snapshot) = &self.snapshot else {
            debug!("nothing fetched yet; CSV export skipped");
            return Ok(None);
        };

        let path = match path {
            Some(path) if !path.is_dir() => path.to_path_buf(),
            Some(dir) => dir.join(export::file_name(&self.query_or_label())),
            None => PathBuf::from(export::file_name(&self.query_or_label())),
        };
        export::save_csv(&snapshot.series, &path).await?;

        Ok(Some(path))
    }

    // downloads are named after what the user typed
    fn query_or_label(&self) -> String {
        if self.query.is_empty() {
            self.label()
        } else {
            self.query.clone()
        }
    }
}
