use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";
pub const YAHOO_URL: &str = "https://query1.finance.yahoo.com";

/// Runtime settings, read from the environment (and `.env`, via [`dotenv`]).
///
/// | variable                  | default                              |
/// |---------------------------|--------------------------------------|
/// | `ALPHAVANTAGE_API_KEY`    | *(required for Alpha Vantage calls)* |
/// | `ALPHAVANTAGE_URL`        | `https://www.alphavantage.co/query`  |
/// | `ALPHAVANTAGE_OUTPUTSIZE` | `compact`                            |
/// | `YAHOO_URL`               | `https://query1.finance.yahoo.com`   |
/// | `USER_AGENT`              | `stockdash/<version>`                |
/// | `HTTP_TIMEOUT_SECS`       | `30`                                 |
/// | `CACHE_CAPACITY`          | `32` (`0` disables caching)          |
/// | `NEWS_LIMIT`              | `10`                                 |
///
/// [`dotenv`]: https://docs.rs/dotenv/latest/dotenv/
#[derive(Debug, Clone)]
pub struct Config {
    pub alpha_vantage_key: Option<String>,
    pub alpha_vantage_url: Url,
    pub output_size: OutputSize,
    pub yahoo_url: Url,
    pub user_agent: String,
    pub timeout: Duration,
    pub cache_capacity: usize,
    pub news_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Build the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let config = Config {
            alpha_vantage_key: get("ALPHAVANTAGE_API_KEY"),
            alpha_vantage_url: parse_url("ALPHAVANTAGE_URL", get("ALPHAVANTAGE_URL"), ALPHA_VANTAGE_URL)?,
            output_size: parse_or("ALPHAVANTAGE_OUTPUTSIZE", get("ALPHAVANTAGE_OUTPUTSIZE"), OutputSize::Compact)?,
            yahoo_url: parse_url("YAHOO_URL", get("YAHOO_URL"), YAHOO_URL)?,
            user_agent: get("USER_AGENT")
                .unwrap_or_else(|| format!("stockdash/{}", env!("CARGO_PKG_VERSION"))),
            timeout: Duration::from_secs(parse_or("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"), 30)?),
            cache_capacity: parse_or("CACHE_CAPACITY", get("CACHE_CAPACITY"), 32)?,
            news_limit: parse_or("NEWS_LIMIT", get("NEWS_LIMIT"), 10)?,
        };
        debug!(
            "config loaded: alpha vantage at {}, yahoo at {}, cache capacity {}",
            config.alpha_vantage_url, config.yahoo_url, config.cache_capacity
        );

        Ok(config)
    }

    /// The Alpha Vantage key, required only once an Alpha Vantage endpoint is hit.
    pub fn api_key(&self) -> Result<&str> {
        self.alpha_vantage_key
            .as_deref()
            .ok_or_else(|| Error::Config("ALPHAVANTAGE_API_KEY is not set".to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None).expect("built-in defaults are valid")
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{key}: invalid value {raw:?}"))),
        None => Ok(default),
    }
}

fn parse_url(key: &str, raw: Option<String>, default: &str) -> Result<Url> {
    let raw = raw.as_deref().unwrap_or(default);
    let url = Url::parse(raw).map_err(|e| Error::Config(format!("{key}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::Config(format!("{key}: unsupported scheme {scheme:?}"))),
    }
}

// -------------------------------------------------------------------------------------------------

/// Alpha Vantage `outputsize`; `compact` returns the latest 100 trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSize {
    Compact,
    Full,
}

impl OutputSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        }
    }
}

impl FromStr for OutputSize {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(OutputSize::Compact),
            "full" => Ok(OutputSize::Full),
            other => Err(format!("unknown output size {other:?}")),
        }
    }
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.alpha_vantage_key, None);
        assert_eq!(config.alpha_vantage_url.as_str(), ALPHA_VANTAGE_URL);
        assert_eq!(config.yahoo_url.as_str(), "https://query1.finance.yahoo.com/");
        assert_eq!(config.output_size, OutputSize::Compact);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.cache_capacity, 32);
        assert_eq!(config.news_limit, 10);
        assert!(config.user_agent.starts_with("stockdash/"));
    }

    #[test]
    fn values_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("ALPHAVANTAGE_API_KEY", " secret "),
            ("ALPHAVANTAGE_OUTPUTSIZE", "FULL"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("CACHE_CAPACITY", "0"),
            ("USER_AGENT", "me@example.com"),
        ]))
        .unwrap();

        assert_eq!(config.api_key().unwrap(), "secret");
        assert_eq!(config.output_size, OutputSize::Full);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.cache_capacity, 0);
        assert_eq!(config.user_agent, "me@example.com");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = Config::from_lookup(lookup(&[("ALPHAVANTAGE_API_KEY", "  ")])).unwrap();
        assert!(matches!(config.api_key(), Err(Error::Config(_))));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let bad_number = Config::from_lookup(lookup(&[("NEWS_LIMIT", "ten")]));
        assert!(matches!(bad_number, Err(Error::Config(msg)) if msg.contains("NEWS_LIMIT")));

        let bad_scheme = Config::from_lookup(lookup(&[("YAHOO_URL", "ftp://example.com")]));
        assert!(matches!(bad_scheme, Err(Error::Config(_))));

        let bad_size = Config::from_lookup(lookup(&[("ALPHAVANTAGE_OUTPUTSIZE", "huge")]));
        assert!(matches!(bad_size, Err(Error::Config(_))));
    }
}
