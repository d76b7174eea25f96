use super::super::common::{non_blank, Notice};
use super::super::AlphaVantage;
use super::NewsItem;
use crate::api::*;
use crate::config::Config;
use crate::error::{Error, Result};
use serde::Deserialize;
use tracing::{debug, error, trace, warn};

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// API Documentation: https://www.alphavantage.co/documentation/#news-sentiment
//
////////////////////////////////////////////////////////////////////////////////////////////////////

impl AlphaVantage {
    /// Latest articles mentioning `symbol`.
    ///
    /// A refusal (rate limit, bad key) is [`Error::Service`]; a response with neither a feed
    /// nor a notice is an empty list.
    pub async fn news(http_client: &HttpClient, config: &Config, symbol: &str) -> Result<Vec<NewsItem>> {
        let limit = config.news_limit.to_string();
        let url = Self::url(
            config,
            &[
                ("function", "NEWS_SENTIMENT"),
                ("tickers", symbol),
                ("limit", limit.as_str()),
            ],
        )?;

        trace!("Fetching news for [{symbol}] from Alpha Vantage");
        let response: NewsFeed = Self::fetch(http_client, &url).await?;
        let items = response.into_items(symbol, config.news_limit)?;
        debug!("{} Alpha Vantage articles for [{symbol}]", items.len());

        Ok(items)
    }
}

impl Http<NewsFeed> for AlphaVantage {}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Deserialization
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Deserialize, Debug)]
pub struct NewsFeed {
    pub feed: Option<Vec<Article>>,
    #[serde(flatten)]
    pub notice: Notice,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Article {
    pub title: Option<String>,
    pub url: Option<String>,
    pub time_published: Option<String>,
    pub summary: Option<String>,
    pub banner_image: Option<String>,
    pub source: Option<String>,
    pub overall_sentiment_label: Option<String>,
}

impl NewsFeed {
    pub fn into_items(self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>> {
        let Some(feed) = self.feed else {
            return match self.notice.message() {
                Some(message) => {
                    error!("[{symbol}] news refused: {message}");
                    Err(Error::Service(message.to_string()))
                }
                None => {
                    warn!("[{symbol}] response has no \"feed\" array");
                    Ok(vec![])
                }
            };
        };

        Ok(feed
            .into_iter()
            .take(limit)
            .map(|article| NewsItem {
                source: non_blank(article.source),
                sentiment: non_blank(article.overall_sentiment_label),
                ..NewsItem::with_defaults(
                    article.title,
                    article.url,
                    article.time_published,
                    article.summary,
                    article.banner_image,
                )
            })
            .collect())
    }
}
