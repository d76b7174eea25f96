use super::super::Yahoo;
use super::series::{DateRange, PriceBar, PriceSeries, PriceSource};
use crate::api::*;
use crate::config::Config;
use crate::error::{Error, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::{error, trace, warn};

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Prices from Yahoo Finance, per ticker
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

impl Yahoo {
    /// Daily OHLCV for `symbol`, clipped to `range`.
    pub async fn daily(
        http_client: &HttpClient,
        config: &Config,
        symbol: &str,
        range: DateRange,
    ) -> Result<PriceSeries> {
        let tckr = symbol.to_uppercase();
        let (period1, period2) = periods(range);
        let (period1, period2) = (period1.to_string(), period2.to_string());
        let url = Self::url(
            config,
            &["v8", "finance", "chart", tckr.as_str()],
            &[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
            ],
        )?;

        // an unknown ticker is a 404 whose body still explains itself in `chart.error`
        trace!("Fetching price data for [{tckr}] from Yahoo Finance");
        let response: PriceHistory = Self::fetch_any_status(http_client, &url).await?;
        response.into_series(&tckr, range)
    }
}

impl Http<PriceHistory> for Yahoo {}

fn pick(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten().filter(|v| v.is_finite())
}

/// Unix seconds bounding `range`, padded a day past `end` so the last session is included.
fn periods(range: DateRange) -> (i64, i64) {
    let at_midnight = |date: NaiveDate| date.and_time(NaiveTime::MIN).and_utc().timestamp();
    let after_end = range.end.checked_add_days(Days::new(1)).unwrap_or(range.end);
    (at_midnight(range.start), at_midnight(after_end))
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Deserialization
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

// Input: Yahoo Finance
#[derive(Deserialize, Debug)]
pub struct PriceHistory {
    pub chart: PriceResponse,
}

#[derive(Deserialize, Debug)]
pub struct PriceResponse {
    pub result: Option<Vec<PriceCategories>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct PriceCategories {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

/// Seconds east of UTC for the listing exchange; session timestamps are dated in its local time.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Meta {
    pub gmtoffset: i64,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

// Yahoo pads halted sessions with `null`
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Quote {
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub volume: Vec<Option<u64>>,
}

impl PriceHistory {
    pub fn into_series(self, ticker: &str, range: DateRange) -> Result<PriceSeries> {
        let no_data = |reason: String| {
            error!("[{ticker}] contained no \"chart.result\" object: {reason}");
            Error::NoData {
                symbol: ticker.to_string(),
                reason,
            }
        };

        let reason = self
            .chart
            .error
            .as_ref()
            .and_then(|e| e.description.clone().or(e.code.clone()))
            .unwrap_or_else(|| "response has no \"chart.result\" object".to_string());

        let Some(base) = self.chart.result.and_then(|data| data.into_iter().next()) else {
            return Err(no_data(reason));
        };
        let Some(price) = base.indicators.quote.into_iter().next() else {
            return Err(no_data("response has no quote indicators".to_string()));
        };

        trace!("Transforming {} price rows for [{ticker}]", base.timestamp.len());
        let bars = base
            .timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, timestamp)| {
                let local = timestamp.saturating_add(base.meta.gmtoffset);
                let Some(time) = DateTime::from_timestamp(local, 0) else {
                    warn!("[{ticker}] skipping invalid timestamp {timestamp}");
                    return None;
                };
                let Some(close) = pick(&price.close, i) else {
                    warn!("[{ticker}] skipping {}: no close", time.date_naive());
                    return None;
                };
                Some(PriceBar {
                    date: time.date_naive(),
                    open: pick(&price.open, i),
                    high: pick(&price.high, i),
                    low: pick(&price.low, i),
                    close,
                    volume: price.volume.get(i).copied().flatten(),
                })
            })
            .collect::<Vec<_>>();

        PriceSeries::from_bars(ticker, PriceSource::Yahoo, range, bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing;

    // 2024-01-02 .. 2024-01-05, 14:30 UTC each
    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"currency": "USD", "symbol": "AAPL"},
                "timestamp": [1704205800, 1704292200, 1704378600, 1704465000],
                "indicators": {
                    "quote": [{
                        "open":   [187.15, 184.22, null, 181.99],
                        "high":   [188.44, 185.88, null, 182.76],
                        "low":    [183.89, 183.43, null, 180.17],
                        "close":  [185.64, 184.25, null, 181.18],
                        "volume": [82488700, 58414500, null, 62379661]
                    }],
                    "adjclose": [{"adjclose": [185.4, 184.0, null, 180.9]}]
                }
            }],
            "error": null
        }
    }"#;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn null_sessions_are_skipped() {
        let history: PriceHistory = serde_json::from_str(CHART).unwrap();
        let series = history.into_series("AAPL", DateRange::new(day(1), day(31))).unwrap();

        let dates: Vec<_> = series.bars.iter().map(|b| b.date).collect();
        assert_eq!(dates, [day(2), day(3), day(5)]);
        assert_eq!(series.closes(), [185.64, 184.25, 181.18]);
        assert_eq!(series.bars[2].volume, Some(62379661));
        assert_eq!(series.source, PriceSource::Yahoo);
    }

    #[test]
    fn range_is_applied() {
        let history: PriceHistory = serde_json::from_str(CHART).unwrap();
        let series = history.into_series("AAPL", DateRange::new(day(3), day(3))).unwrap();
        assert_eq!(series.closes(), [184.25]);
    }

    #[test]
    fn null_result_is_no_data() {
        let history: PriceHistory = serde_json::from_str(
            r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#,
        )
        .unwrap();
        let err = history.into_series("ZZZZ", DateRange::new(day(1), day(31))).unwrap_err();
        assert!(matches!(err, Error::NoData { reason, .. } if reason.contains("delisted")));
    }

    #[test]
    fn sessions_are_dated_in_exchange_time() {
        // ASX open, 2024-01-01T23:00:00Z, is 10:00 on 2024-01-02 in Sydney (UTC+11)
        let history: PriceHistory = serde_json::from_str(
            r#"{"chart": {"result": [{
                "meta": {"symbol": "BHP.AX", "gmtoffset": 39600},
                "timestamp": [1704150000],
                "indicators": {"quote": [{"close": [45.7]}]}
            }], "error": null}}"#,
        )
        .unwrap();
        let series = history.into_series("BHP.AX", DateRange::new(day(1), day(31))).unwrap();
        assert_eq!(series.bars[0].date, day(2));
    }

    #[tokio::test]
    async fn unknown_ticker_404_is_no_data() {
        let base = testing::serve(
            "404 Not Found",
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        )
        .await;
        let config = Config::from_lookup(|key| (key == "YAHOO_URL").then(|| base.clone())).unwrap();

        let err = Yahoo::daily(&HttpClient::new(), &config, "zzzzq", DateRange::new(day(1), day(31)))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NoDataFound);
        assert!(matches!(err, Error::NoData { symbol, reason } if symbol == "ZZZZQ" && reason.contains("delisted")));
    }

    #[tokio::test]
    async fn server_error_page_is_a_status_error() {
        let base = testing::serve("502 Bad Gateway", "<html>bad gateway</html>").await;
        let config = Config::from_lookup(|key| (key == "YAHOO_URL").then(|| base.clone())).unwrap();

        let err = Yahoo::daily(&HttpClient::new(), &config, "AAPL", DateRange::new(day(1), day(31)))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NetworkOrService);
        assert!(matches!(err, Error::Status { status, .. } if status.as_u16() == 502));
    }

    #[test]
    fn periods_cover_the_whole_end_day() {
        let (start, end) = periods(DateRange::new(day(2), day(5)));
        assert_eq!(start, 1704153600); // 2024-01-02T00:00:00Z
        assert_eq!(end, 1704499200); // 2024-01-06T00:00:00Z
    }
}
