use crate::error::{Error, Result};
use async_trait::async_trait;
pub use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use stockdash_util::Util;
use tracing::{error, trace, warn};
use url::Url;

/// Fetch framework.
///
/// Each data provider is a unit struct implementing `Http<T>` once per response schema `T`;
/// the provider's own methods build the URL, call [`Http::fetch`], and transform `T` into the
/// dashboard's types.
#[async_trait]
pub trait Http<T>
where
    T: DeserializeOwned + Debug + Send + 'static,
{
    /// GET `url` and deserialize the body as `T`.
    async fn fetch(http_client: &HttpClient, url: &Url) -> Result<T> {
        let shown = redact(url);
        trace!("fetching {shown}");
        let body = http_client.get_bytes(url.as_str()).await.map_err(|e| {
            error!("failed fetching response from {shown}");
            transport(e, &shown)
        })?;

        trace!("deserializing response from {shown}");
        decode(&body, &shown)
    }

    /// As [`Http::fetch`], but a non-2xx response whose body still deserializes as `T` is
    /// returned; for services that explain a refusal in the body rather than the status.
    async fn fetch_any_status(http_client: &HttpClient, url: &Url) -> Result<T> {
        let shown = redact(url);
        trace!("fetching {shown}");
        let (status, body) = http_client.get_body(url.as_str()).await.map_err(|e| {
            error!("failed fetching response from {shown}");
            transport(e, &shown)
        })?;

        if status.is_success() {
            trace!("deserializing response from {shown}");
            return decode(&body, &shown);
        }
        match serde_json::from_slice::<T>(&body) {
            Ok(parsed) => {
                warn!("{shown} responded with {status}; reading its error body");
                Ok(parsed)
            }
            Err(_) => {
                error!("{shown} responded with {status}");
                Err(Error::Status { status, url: shown })
            }
        }
    }
}

/// Map a transport error, attributing it to the already redacted `shown` URL.
pub fn transport(e: reqwest::Error, shown: &str) -> Error {
    match e.status() {
        Some(status) => Error::Status {
            status,
            url: shown.to_string(),
        },
        None => Error::Network(e.without_url()),
    }
}

/// Deserialize a response body, attributing failures to `url`.
pub fn decode<T: DeserializeOwned>(body: &[u8], url: &str) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| {
        error!("failed deserializing from {url}: {source}");
        Error::Decode {
            url: url.to_string(),
            source,
        }
    })
}

/// Render `url` for logs and messages with the `apikey` value masked.
pub fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(key, _)| key == "apikey") {
        return url.to_string();
    }

    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == "apikey" { "***".into() } else { value };
            (key.into_owned(), value.into_owned())
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    struct Probe {
        value: i32,
    }

    #[test]
    fn redact_masks_only_the_key() {
        let url = Url::parse("https://example.com/query?function=SYMBOL_SEARCH&apikey=SECRET&keywords=apple").unwrap();
        let shown = redact(&url);

        assert!(!shown.contains("SECRET"));
        assert!(shown.contains("apikey=***") || shown.contains("apikey=%2A%2A%2A"));
        assert!(shown.contains("keywords=apple"));
    }

    #[test]
    fn redact_leaves_keyless_urls_alone() {
        let url = Url::parse("https://example.com/v8/finance/chart/AAPL?interval=1d").unwrap();
        assert_eq!(redact(&url), url.to_string());
    }

    #[test]
    fn decode_reports_the_url() {
        let ok: Probe = decode(br#"{"value": 7}"#, "https://example.com").unwrap();
        assert_eq!(ok.value, 7);

        let err = decode::<Probe>(b"<html>", "https://example.com").unwrap_err();
        assert!(matches!(err, Error::Decode { url, .. } if url == "https://example.com"));
    }
}
