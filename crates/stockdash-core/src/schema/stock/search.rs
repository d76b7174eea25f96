use super::super::common::{non_blank, numeric, Notice};
use super::super::AlphaVantage;
use crate::api::*;
use crate::config::Config;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, trace};

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// API Documentation: https://www.alphavantage.co/documentation/#symbolsearch
//
////////////////////////////////////////////////////////////////////////////////////////////////////

impl AlphaVantage {
    /// Resolve a free-text company name to ticker candidates, in the service's order.
    ///
    /// No matches is `Ok(vec![])`; a refusal (rate limit, bad key) is [`Error::Service`].
    pub async fn search(
        http_client: &HttpClient,
        config: &Config,
        keywords: &str,
    ) -> Result<Vec<SymbolCandidate>> {
        let keywords = keywords.trim();
        if keywords.is_empty() {
            debug!("blank search; skipping symbol lookup");
            return Ok(vec![]);
        }

        let url = Self::url(config, &[("function", "SYMBOL_SEARCH"), ("keywords", keywords)])?;
        let response: SymbolSearch = Self::fetch(http_client, &url).await?;
        let candidates = response.into_candidates()?;
        debug!("{} candidates found for {keywords:?}", candidates.len());

        Ok(candidates)
    }
}

impl Http<SymbolSearch> for AlphaVantage {}

// -------------------------------------------------------------------------------------------------

/// A ticker the user can pick; only `symbol` and `display_name` are guaranteed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SymbolCandidate {
    pub symbol: String,
    pub display_name: String,
    pub kind: Option<String>,
    pub region: Option<String>,
    pub currency: Option<String>,
    pub match_score: Option<f64>,
}

impl SymbolCandidate {
    pub fn new(symbol: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
            kind: None,
            region: None,
            currency: None,
            match_score: None,
        }
    }

    /// `"Apple Inc (AAPL)"`; the text shown in a picker.
    pub fn label(&self) -> String {
        format!("{} ({})", self.display_name, self.symbol)
    }
}

impl fmt::Display for SymbolCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Find the candidate behind a picker label (or a bare symbol, case-insensitively).
pub fn select<'a>(candidates: &'a [SymbolCandidate], choice: &str) -> Option<&'a SymbolCandidate> {
    let choice = choice.trim();
    candidates
        .iter()
        .find(|c| c.label() == choice)
        .or_else(|| candidates.iter().find(|c| c.symbol.eq_ignore_ascii_case(choice)))
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Deserialization
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// ```json
/// {
///     "bestMatches": [
///         {
///             "1. symbol": "AAPL",
///             "2. name": "Apple Inc",
///             "3. type": "Equity",
///             "4. region": "United States",
///             "8. currency": "USD",
///             "9. matchScore": "0.8889"
///         }
///     ]
/// }
/// ```
#[derive(Deserialize, Debug)]
pub struct SymbolSearch {
    #[serde(rename = "bestMatches")]
    pub best_matches: Option<Vec<Match>>,
    #[serde(flatten)]
    pub notice: Notice,
}

#[derive(Deserialize, Debug)]
pub struct Match {
    #[serde(rename = "1. symbol")]
    pub symbol: String,
    #[serde(rename = "2. name", default)]
    pub name: Option<String>,
    #[serde(rename = "3. type", default)]
    pub kind: Option<String>,
    #[serde(rename = "4. region", default)]
    pub region: Option<String>,
    #[serde(rename = "8. currency", default)]
    pub currency: Option<String>,
    #[serde(rename = "9. matchScore", default)]
    pub match_score: Value,
}

impl SymbolSearch {
    pub fn into_candidates(self) -> Result<Vec<SymbolCandidate>> {
        match (self.best_matches, self.notice.message()) {
            (Some(matches), _) => {
                trace!("transforming {} search matches", matches.len());
                Ok(matches
                    .into_iter()
                    .map(|m| SymbolCandidate {
                        display_name: non_blank(m.name).unwrap_or_else(|| m.symbol.clone()),
                        symbol: m.symbol,
                        kind: non_blank(m.kind),
                        region: non_blank(m.region),
                        currency: non_blank(m.currency),
                        match_score: numeric(&m.match_score),
                    })
                    .collect())
            }
            (None, Some(message)) => {
                error!("symbol search refused: {message}");
                Err(Error::Service(message.to_string()))
            }
            (None, None) => Ok(vec![]),
        }
    }
}
