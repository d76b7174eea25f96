use crate::error::{Error, Result};
use crate::metrics::{self, Derived, Summary};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error};

/// Inclusive calendar range, `start..=end`.
///
/// Ordering is the caller's responsibility; an inverted range contains no dates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` days leading up to (and including) `end`.
    pub fn last_days(end: NaiveDate, days: u64) -> Self {
        let start = end.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

// -------------------------------------------------------------------------------------------------

/// Where a price table was fetched from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceSource {
    AlphaVantage,
    Yahoo,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSource::AlphaVantage => f.write_str("Alpha Vantage"),
            PriceSource::Yahoo => f.write_str("Yahoo! Finance"),
        }
    }
}

impl FromStr for PriceSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alpha" | "alphavantage" | "alpha-vantage" => Ok(PriceSource::AlphaVantage),
            "yahoo" => Ok(PriceSource::Yahoo),
            other => Err(format!("unknown price source {other:?}")),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// One trading day. Only `close` is guaranteed; rows without a usable close never get this far.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}

/// A bar with its derived values, as shown in tables and written to CSV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row<'a> {
    pub bar: &'a PriceBar,
    pub daily_return_pct: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
}

/// Daily bars for one symbol over a range, ascending by date, with derived columns.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub source: PriceSource,
    pub range: DateRange,
    pub bars: Vec<PriceBar>,
    pub derived: Derived,
}

impl PriceSeries {
    /// Order `bars` by date (last one wins on duplicates), clip them to `range`
    /// and derive the metric columns.
    ///
    /// An empty result is [`Error::NoData`]; a partial series is never returned.
    pub fn from_bars(
        symbol: &str,
        source: PriceSource,
        range: DateRange,
        bars: impl IntoIterator<Item = PriceBar>,
    ) -> Result<Self> {
        let ordered: BTreeMap<NaiveDate, PriceBar> =
            bars.into_iter().map(|bar| (bar.date, bar)).collect();
        let available = ordered.len();
        let bars = clip(ordered.into_values(), range);

        if bars.is_empty() {
            error!("[{symbol}] none of {available} bars fall within {range}");
            return Err(Error::NoData {
                symbol: symbol.to_string(),
                reason: format!("no trading days between {range}"),
            });
        }
        debug!("[{symbol}] {} of {available} bars kept for {range}", bars.len());

        let derived = metrics::derive(&bars);
        Ok(Self {
            symbol: symbol.to_string(),
            source,
            range,
            bars,
            derived,
        })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn rows(&self) -> impl DoubleEndedIterator<Item = Row<'_>> + ExactSizeIterator + '_ {
        self.bars.iter().enumerate().map(|(i, bar)| Row {
            bar,
            daily_return_pct: self.derived.daily_return_pct.get(i).copied().flatten(),
            ma20: self.derived.ma20.get(i).copied().flatten(),
            ma50: self.derived.ma50.get(i).copied().flatten(),
        })
    }

    /// The last `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> Vec<Row<'_>> {
        let skip = self.len().saturating_sub(n);
        self.rows().skip(skip).collect()
    }

    pub fn summary(&self) -> Option<Summary> {
        Summary::of(self)
    }
}

/// Keep the bars dated within `range`, preserving their order.
pub fn clip(bars: impl IntoIterator<Item = PriceBar>, range: DateRange) -> Vec<PriceBar> {
    bars.into_iter()
        .filter(|bar| range.contains(bar.date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn clip_excludes_out_of_range_and_keeps_order() {
        let bars: Vec<_> = [2, 3, 4, 5, 8, 9]
            .into_iter()
            .map(|d| PriceBar::new(day(d), d as f64))
            .collect();

        let clipped = clip(bars, DateRange::new(day(3), day(8)));
        let dates: Vec<_> = clipped.iter().map(|b| b.date).collect();
        assert_eq!(dates, [day(3), day(4), day(5), day(8)]);
    }

    #[test]
    fn from_bars_sorts_and_dedupes() {
        let bars = vec![
            PriceBar::new(day(5), 3.0),
            PriceBar::new(day(2), 1.0),
            PriceBar::new(day(3), 2.0),
            PriceBar::new(day(5), 4.0),
        ];

        let series = PriceSeries::from_bars("AAPL", PriceSource::Yahoo, DateRange::new(day(1), day(31)), bars).unwrap();
        assert_eq!(series.closes(), [1.0, 2.0, 4.0]);
        assert_eq!(series.derived.daily_return_pct.len(), 3);
    }

    #[test]
    fn empty_range_is_no_data() {
        let bars = vec![PriceBar::new(day(2), 1.0)];
        let err = PriceSeries::from_bars("AAPL", PriceSource::Yahoo, DateRange::new(day(10), day(20)), bars).unwrap_err();
        assert!(matches!(err, Error::NoData { symbol, .. } if symbol == "AAPL"));
    }

    #[test]
    fn inverted_range_contains_nothing() {
        let range = DateRange::new(day(9), day(2));
        assert!(range.is_inverted());
        assert!(!range.contains(day(5)));
    }

    #[test]
    fn tail_returns_latest_rows_oldest_first() {
        let bars: Vec<_> = (1..=6).map(|d| PriceBar::new(day(d), d as f64)).collect();
        let series = PriceSeries::from_bars("X", PriceSource::Yahoo, DateRange::new(day(1), day(6)), bars).unwrap();

        let tail = series.tail(2);
        let dates: Vec<_> = tail.iter().map(|row| row.bar.date).collect();
        assert_eq!(dates, [day(5), day(6)]);
        assert_eq!(series.tail(50).len(), 6);
    }

    #[test]
    fn last_days_spans_back_from_end() {
        let range = DateRange::last_days(day(31), 30);
        assert_eq!(range.start, day(1));
        assert_eq!(range.end, day(31));
    }

    #[test]
    fn price_source_parses_aliases() {
        assert_eq!("alpha".parse::<PriceSource>(), Ok(PriceSource::AlphaVantage));
        assert_eq!("Yahoo".parse::<PriceSource>(), Ok(PriceSource::Yahoo));
        assert!("bloomberg".parse::<PriceSource>().is_err());
    }
}
