/// Company news. Includes:
/// 1. Alpha Vantage   [*source*]: "https://www.alphavantage.co/query?function=NEWS_SENTIMENT"
/// 2. Yahoo! Finance  [*source*]: "https://query1.finance.yahoo.com/v1/finance/search"
pub mod news;

/// Symbol search & daily prices. Includes:
/// 1. Alpha Vantage   [*source*]: "https://www.alphavantage.co/query?function=SYMBOL_SEARCH"
/// 2. Alpha Vantage   [*source*]: "https://www.alphavantage.co/query?function=TIME_SERIES_DAILY"
/// 3. Yahoo! Finance  [*source*]: "https://query1.finance.yahoo.com/v8/finance/chart"
pub mod stock;

/// Common deserialization helpers.
pub mod common;

use crate::config::Config;
use crate::error::{Error, Result};
use url::Url;

/// Alpha Vantage; every endpoint is a `function` on one query URL.
pub struct AlphaVantage;

impl AlphaVantage {
    pub(crate) fn url(config: &Config, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = config.alpha_vantage_url.clone();
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("apikey", config.api_key()?);
        Ok(url)
    }
}

/// Yahoo! Finance; keyless, path-addressed endpoints.
pub struct Yahoo;

impl Yahoo {
    pub(crate) fn url(config: &Config, path: &[&str], params: &[(&str, &str)]) -> Result<Url> {
        let mut url = config.yahoo_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("YAHOO_URL cannot be a base: {}", config.yahoo_url)))?
            .pop_if_empty()
            .extend(path);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }
}
