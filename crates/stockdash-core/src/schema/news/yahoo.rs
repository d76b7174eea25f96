use super::super::common::non_blank;
use super::super::Yahoo;
use super::NewsItem;
use crate::api::*;
use crate::config::Config;
use crate::error::Result;
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, trace};

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// News from Yahoo Finance search, per ticker
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

impl Yahoo {
    /// Latest stories for `symbol`. Search results carry no summary, so every item shows the
    /// placeholder.
    pub async fn news(http_client: &HttpClient, config: &Config, symbol: &str) -> Result<Vec<NewsItem>> {
        let tckr = symbol.to_uppercase();
        let count = config.news_limit.to_string();
        let url = Self::url(
            config,
            &["v1", "finance", "search"],
            &[
                ("q", tckr.as_str()),
                ("quotesCount", "0"),
                ("newsCount", count.as_str()),
            ],
        )?;

        trace!("Fetching news for [{tckr}] from Yahoo Finance");
        let response: SearchNews = Self::fetch(http_client, &url).await?;
        let items = response.into_items(config.news_limit);
        debug!("{} Yahoo articles for [{tckr}]", items.len());

        Ok(items)
    }
}

impl Http<SearchNews> for Yahoo {}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Deserialization
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Deserialize, Debug)]
pub struct SearchNews {
    #[serde(default)]
    pub news: Vec<Story>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Story {
    pub title: Option<String>,
    pub link: Option<String>,
    pub provider_publish_time: Option<i64>,
    pub publisher: Option<String>,
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Thumbnail {
    pub resolutions: Vec<Resolution>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Resolution {
    pub url: Option<String>,
}

impl SearchNews {
    pub fn into_items(self, limit: usize) -> Vec<NewsItem> {
        self.news
            .into_iter()
            .take(limit)
            .map(|story| {
                // epoch seconds -> "2024-01-05T13:30:00+00:00"
                let published_at = story
                    .provider_publish_time
                    .and_then(|ts| DateTime::from_timestamp(ts, 0))
                    .map(|time| time.to_rfc3339());
                let image_url = story
                    .thumbnail
                    .and_then(|thumb| thumb.resolutions.into_iter().find_map(|res| non_blank(res.url)));

                NewsItem {
                    source: non_blank(story.publisher),
                    ..NewsItem::with_defaults(story.title, story.link, published_at, None, image_url)
                }
            })
            .collect()
    }
}
