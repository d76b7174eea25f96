use super::super::common::{count, numeric, Notice};
use super::super::AlphaVantage;
use super::series::{DateRange, PriceBar, PriceSeries, PriceSource};
use crate::api::*;
use crate::config::Config;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{error, trace, warn};

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// API Documentation: https://www.alphavantage.co/documentation/#daily
//
////////////////////////////////////////////////////////////////////////////////////////////////////

impl AlphaVantage {
    /// Daily OHLCV for `symbol`, clipped to `range`.
    pub async fn daily(
        http_client: &HttpClient,
        config: &Config,
        symbol: &str,
        range: DateRange,
    ) -> Result<PriceSeries> {
        let url = Self::url(
            config,
            &[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("outputsize", config.output_size.as_str()),
            ],
        )?;
        trace!("Fetching price data for [{symbol}] from Alpha Vantage");
        let response: DailySeries = Self::fetch(http_client, &url).await?;
        response.into_series(symbol, range)
    }
}

impl Http<DailySeries> for AlphaVantage {}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Deserialization
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// ```json
/// {
///     "Meta Data": { "2. Symbol": "IBM", ... },
///     "Time Series (Daily)": {
///         "2024-01-05": {
///             "1. open": "181.9900",
///             "2. high": "182.7600",
///             "3. low": "180.1700",
///             "4. close": "181.1800",
///             "5. volume": "62379661"
///         },
///         ...
///     }
/// }
/// ```
#[derive(Deserialize, Debug)]
pub struct DailySeries {
    #[serde(rename = "Time Series (Daily)")]
    pub series: Option<BTreeMap<String, DailyCell>>,
    #[serde(flatten)]
    pub notice: Notice,
}

#[derive(Deserialize, Debug, Default)]
pub struct DailyCell {
    #[serde(rename = "1. open", default)]
    pub open: Value,
    #[serde(rename = "2. high", default)]
    pub high: Value,
    #[serde(rename = "3. low", default)]
    pub low: Value,
    #[serde(rename = "4. close", default)]
    pub close: Value,
    #[serde(rename = "5. volume", default)]
    pub volume: Value,
}

impl DailySeries {
    pub fn into_series(self, symbol: &str, range: DateRange) -> Result<PriceSeries> {
        let Some(cells) = self.series else {
            let reason = self
                .notice
                .message()
                .unwrap_or("response has no \"Time Series (Daily)\" object")
                .to_string();
            error!("[{symbol}] contained no price data: {reason}");
            return Err(Error::NoData {
                symbol: symbol.to_string(),
                reason,
            });
        };

        trace!("Transforming {} price rows for [{symbol}]", cells.len());
        let bars = cells.into_iter().filter_map(|(dated, cell)| {
            let Ok(date) = NaiveDate::parse_from_str(&dated, "%Y-%m-%d") else {
                warn!("[{symbol}] skipping row with unreadable date {dated:?}");
                return None;
            };
            let Some(close) = numeric(&cell.close) else {
                warn!("[{symbol}] skipping {date}: close {:?} is not numeric", cell.close);
                return None;
            };
            Some(PriceBar {
                date,
                open: numeric(&cell.open),
                high: numeric(&cell.high),
                low: numeric(&cell.low),
                close,
                volume: count(&cell.volume),
            })
        });

        PriceSeries::from_bars(symbol, PriceSource::AlphaVantage, range, bars)
    }
}
