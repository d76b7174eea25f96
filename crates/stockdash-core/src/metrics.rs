//! Derived columns over a price table's closes.
//!
//! Every value at index `i` depends only on closes `0..=i`; nothing looks ahead.

use crate::schema::stock::series::{PriceBar, PriceSeries};
use serde::{Deserialize, Serialize};

pub const SHORT_WINDOW: usize = 20;
pub const LONG_WINDOW: usize = 50;

/// Columns appended to a [`PriceSeries`], aligned index-for-index with its bars.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Derived {
    pub daily_return_pct: Vec<Option<f64>>,
    pub ma20: Vec<Option<f64>>,
    pub ma50: Vec<Option<f64>>,
}

pub fn derive(bars: &[PriceBar]) -> Derived {
    let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
    Derived {
        daily_return_pct: pct_change(&closes),
        ma20: rolling_mean(&closes, SHORT_WINDOW),
        ma50: rolling_mean(&closes, LONG_WINDOW),
    }
}

/// `(c[i] - c[i-1]) / c[i-1] * 100`; undefined for the first close and after a zero close.
pub fn pct_change(closes: &[f64]) -> Vec<Option<f64>> {
    let mut changes = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return changes;
    }

    changes.push(None);
    changes.extend(closes.windows(2).map(|pair| {
        let (prev, curr) = (pair[0], pair[1]);
        (prev != 0.0).then(|| (curr - prev) / prev * 100.0)
    }));
    changes
}

/// Trailing mean over `window` closes; undefined until a full window is available.
pub fn rolling_mean(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; closes.len()];
    }

    let warmup = closes.len().min(window - 1);
    let mut means = vec![None; warmup];
    // each window is summed on its own so long series don't accumulate drift
    means.extend(
        closes
            .windows(window)
            .map(|w| Some(w.iter().sum::<f64>() / window as f64)),
    );
    means
}

// -------------------------------------------------------------------------------------------------

/// Headline numbers for a fetched series.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub bars: usize,
    pub first_close: f64,
    pub last_close: f64,
    pub change_pct: Option<f64>,
    pub min_close: f64,
    pub max_close: f64,
    pub mean_return_pct: Option<f64>,
    /// Sample standard deviation of the daily returns.
    pub volatility_pct: Option<f64>,
}

impl Summary {
    pub fn of(series: &PriceSeries) -> Option<Self> {
        let first = series.bars.first()?.close;
        let last = series.bars.last()?.close;
        let (min_close, max_close) = series
            .bars
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), bar| {
                (lo.min(bar.close), hi.max(bar.close))
            });

        let returns: Vec<f64> = series.derived.daily_return_pct.iter().flatten().copied().collect();
        let n = returns.len() as f64;
        let mean_return_pct = (!returns.is_empty()).then(|| returns.iter().sum::<f64>() / n);
        let volatility_pct = mean_return_pct.filter(|_| returns.len() > 1).map(|mean| {
            let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        });

        Some(Self {
            bars: series.len(),
            first_close: first,
            last_close: last,
            change_pct: (first != 0.0).then(|| (last - first) / first * 100.0),
            min_close,
            max_close,
            mean_return_pct,
            volatility_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::stock::series::{DateRange, PriceSource};
    use chrono::{Days, NaiveDate};

    const EPS: f64 = 1e-9;

    fn close_enough(a: Option<f64>, b: Option<f64>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => (a - b).abs() < EPS,
            (None, None) => true,
            _ => false,
        }
    }

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar::new(start.checked_add_days(Days::new(i as u64)).unwrap(), *close));
        let end = start.checked_add_days(Days::new(closes.len() as u64)).unwrap();
        PriceSeries::from_bars("TEST", PriceSource::Yahoo, DateRange::new(start, end), bars).unwrap()
    }

    fn walk(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn pct_change_example() {
        let changes = pct_change(&[10.0, 11.0, 9.9]);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0], None);
        assert!(close_enough(changes[1], Some(10.0)));
        assert!(close_enough(changes[2], Some(-10.0)));
    }

    #[test]
    fn pct_change_matches_formula() {
        let closes = walk(40);
        let changes = pct_change(&closes);
        for i in 1..closes.len() {
            let expected = (closes[i] - closes[i - 1]) / closes[i - 1] * 100.0;
            assert!(close_enough(changes[i], Some(expected)), "index {i}");
        }
    }

    #[test]
    fn pct_change_edges() {
        assert!(pct_change(&[]).is_empty());
        assert_eq!(pct_change(&[5.0]), vec![None]);
        assert_eq!(pct_change(&[0.0, 5.0]), vec![None, None]);
    }

    #[test]
    fn ma20_is_trailing_mean() {
        let closes = walk(60);
        let ma20 = rolling_mean(&closes, 20);

        assert_eq!(ma20.len(), closes.len());
        assert!(ma20[..19].iter().all(Option::is_none));
        for i in 19..closes.len() {
            let expected = closes[i - 19..=i].iter().sum::<f64>() / 20.0;
            assert!(close_enough(ma20[i], Some(expected)), "index {i}");
        }
    }

    #[test]
    fn ma50_is_trailing_mean() {
        let closes = walk(75);
        let ma50 = rolling_mean(&closes, 50);

        assert!(ma50[..49].iter().all(Option::is_none));
        for i in 49..closes.len() {
            let expected = closes[i - 49..=i].iter().sum::<f64>() / 50.0;
            assert!(close_enough(ma50[i], Some(expected)), "index {i}");
        }
    }

    #[test]
    fn short_series_have_no_averages() {
        let closes = walk(10);
        assert_eq!(rolling_mean(&closes, 20), vec![None; 10]);
        assert_eq!(rolling_mean(&closes, 0), vec![None; 10]);
        assert!(rolling_mean(&[], 20).is_empty());
    }

    #[test]
    fn no_look_ahead() {
        let closes = walk(60);
        let full = derive(&series(&closes).bars);
        let prefix = derive(&series(&closes[..30]).bars);

        for i in 0..30 {
            assert_eq!(full.daily_return_pct[i], prefix.daily_return_pct[i]);
            assert_eq!(full.ma20[i], prefix.ma20[i]);
            assert_eq!(full.ma50[i], prefix.ma50[i]);
        }
    }

    #[test]
    fn summary_of_series() {
        let summary = series(&[10.0, 11.0, 9.9]).summary().unwrap();

        assert_eq!(summary.bars, 3);
        assert_eq!(summary.min_close, 9.9);
        assert_eq!(summary.max_close, 11.0);
        assert!(close_enough(summary.change_pct, Some(-1.0)));
        assert!(close_enough(summary.mean_return_pct, Some(0.0)));
        // returns +10 and -10, sample variance 200
        assert!(close_enough(summary.volatility_pct, Some(200f64.sqrt())));
    }

    #[test]
    fn single_bar_summary_has_no_returns() {
        let summary = series(&[42.0]).summary().unwrap();
        assert_eq!(summary.mean_return_pct, None);
        assert_eq!(summary.volatility_pct, None);
    }
}
