/// Alpha Vantage `NEWS_SENTIMENT`.
pub mod alpha_vantage;

/// Yahoo! Finance search news.
pub mod yahoo;

use super::common::non_blank;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NO_TITLE: &str = "No title available";
pub const NO_SUMMARY: &str = "No summary available";
pub const UNKNOWN_DATE: &str = "Unknown date";

/// A news card. `published_at` keeps whatever format the provider used.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub published_at: String,
    pub summary: String,
    pub image_url: Option<String>,
    pub source: Option<String>,
    pub sentiment: Option<String>,
}

impl NewsItem {
    /// Fill every absent field with its placeholder; no field is ever an error.
    pub(crate) fn with_defaults(
        title: Option<String>,
        link: Option<String>,
        published_at: Option<String>,
        summary: Option<String>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            title: non_blank(title).unwrap_or_else(|| NO_TITLE.to_string()),
            link: non_blank(link).unwrap_or_default(),
            published_at: non_blank(published_at).unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            summary: non_blank(summary).unwrap_or_else(|| NO_SUMMARY.to_string()),
            image_url: non_blank(image_url),
            source: None,
            sentiment: None,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }
}

/// Which news provider(s) to ask.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewsSource {
    AlphaVantage,
    Yahoo,
    Both,
}

impl NewsSource {
    /// The single providers behind this choice, in display order.
    pub fn providers(&self) -> &'static [NewsSource] {
        match self {
            NewsSource::AlphaVantage => &[NewsSource::AlphaVantage],
            NewsSource::Yahoo => &[NewsSource::Yahoo],
            NewsSource::Both => &[NewsSource::AlphaVantage, NewsSource::Yahoo],
        }
    }
}

impl fmt::Display for NewsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewsSource::AlphaVantage => f.write_str("Alpha Vantage"),
            NewsSource::Yahoo => f.write_str("Yahoo! Finance"),
            NewsSource::Both => f.write_str("Alpha Vantage & Yahoo! Finance"),
        }
    }
}

impl FromStr for NewsSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alpha" | "alphavantage" | "alpha-vantage" => Ok(NewsSource::AlphaVantage),
            "yahoo" => Ok(NewsSource::Yahoo),
            "both" => Ok(NewsSource::Both),
            other => Err(format!("unknown news source {other:?}")),
        }
    }
}
