use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use stockdash_core::cache::CacheStats;
use stockdash_core::metrics::Summary;
use stockdash_core::{NewsItem, PriceSeries, Snapshot, SymbolCandidate};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const CHART_WIDTH: usize = 60;
const SUMMARY_CHARS: usize = 280;

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Progress
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

pub fn spinner(msg: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Await `fut` behind a spinner, clearing it afterwards.
pub async fn with_spinner<F: Future>(msg: impl Into<String>, fut: F) -> F::Output {
    let pb = spinner(msg);
    let out = fut.await;
    pb.finish_and_clear();
    out
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Formatting
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// Unicode block chart of `values`, squeezed to `width` columns. Gaps stay blank.
pub fn sparkline(values: &[Option<f64>], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }

    // keep the last value of each bucket
    let sampled: Vec<Option<f64>> = if values.len() > width {
        (1..=width).map(|b| values[b * values.len() / width - 1]).collect()
    } else {
        values.to_vec()
    };

    let (lo, hi) = sampled
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));

    sampled
        .iter()
        .map(|value| match value {
            None => ' ',
            Some(_) if hi <= lo => BARS[3],
            Some(v) => BARS[((v - lo) / (hi - lo) * 7.0).round() as usize],
        })
        .collect()
}

pub fn fmt_num(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

pub fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:+.2}%"))
}

/// `82488700` -> `"82,488,700"`.
pub fn fmt_volume(value: Option<u64>) -> String {
    let Some(value) = value else {
        return "-".to_string();
    };
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Cut `text` to at most `max` characters, ending with an ellipsis when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn colored_pct(value: Option<f64>, width: usize) -> String {
    let text = format!("{:>width$}", fmt_pct(value));
    match value {
        Some(v) if v > 0.0 => text.green().to_string(),
        Some(v) if v < 0.0 => text.red().to_string(),
        _ => text,
    }
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Output
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

pub fn print_candidates(candidates: &[SymbolCandidate]) {
    if candidates.is_empty() {
        println!("{}", "No matching symbols.".yellow());
        return;
    }

    println!(
        "{}",
        format!("{:>3}  {:<10} {:<40} {:<20} {:<5} {:>6}", "#", "SYMBOL", "NAME", "REGION", "CCY", "SCORE").bold()
    );
    for (i, c) in candidates.iter().enumerate() {
        println!(
            "{:>3}  {} {:<40} {:<20} {:<5} {:>6}",
            i + 1,
            format!("{:<10}", c.symbol).cyan(),
            truncate(&c.display_name, 40),
            truncate(c.region.as_deref().unwrap_or("-"), 20),
            c.currency.as_deref().unwrap_or("-"),
            c.match_score.map_or_else(|| "-".to_string(), |s| format!("{s:.2}")),
        );
    }
}

/// The last `rows` rows of the table, followed by close and moving-average charts.
pub fn print_series(label: &str, series: &PriceSeries, rows: usize) {
    println!(
        "\n{} {}",
        label.bold(),
        format!("[{}, {}, {} days]", series.source, series.range, series.len()).dimmed()
    );

    println!(
        "{}",
        format!(
            "{:<10} {:>10} {:>10} {:>10} {:>10} {:>14} {:>9} {:>10} {:>10}",
            "DATE", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME", "RETURN", "MA20", "MA50"
        )
        .bold()
    );
    let tail = series.tail(rows);
    if tail.len() < series.len() {
        println!("{}", format!("... {} earlier rows", series.len() - tail.len()).dimmed());
    }
    for row in tail {
        println!(
            "{:<10} {:>10} {:>10} {:>10} {:>10} {:>14} {} {:>10} {:>10}",
            row.bar.date,
            fmt_num(row.bar.open),
            fmt_num(row.bar.high),
            fmt_num(row.bar.low),
            fmt_num(Some(row.bar.close)),
            fmt_volume(row.bar.volume),
            colored_pct(row.daily_return_pct, 9),
            fmt_num(row.ma20),
            fmt_num(row.ma50),
        );
    }

    let closes: Vec<Option<f64>> = series.bars.iter().map(|bar| Some(bar.close)).collect();
    println!();
    println!("{:<8} {}", "close", sparkline(&closes, CHART_WIDTH).cyan());
    println!("{:<8} {}", "ma20", sparkline(&series.derived.ma20, CHART_WIDTH).blue());
    println!("{:<8} {}", "ma50", sparkline(&series.derived.ma50, CHART_WIDTH).magenta());
    println!("{:<8} {}", "return", sparkline(&series.derived.daily_return_pct, CHART_WIDTH));
}

pub fn print_summary(summary: &Summary) {
    println!(
        "\n{} {} closes, {} -> {} ({}), low {} high {}",
        "Summary:".bold(),
        summary.bars,
        fmt_num(Some(summary.first_close)),
        fmt_num(Some(summary.last_close)),
        colored_pct(summary.change_pct, 0),
        fmt_num(Some(summary.min_close)),
        fmt_num(Some(summary.max_close)),
    );
    println!(
        "{:9}mean daily return {}, volatility {}",
        "",
        colored_pct(summary.mean_return_pct, 0),
        fmt_pct(summary.volatility_pct),
    );
}

pub fn print_news(items: &[NewsItem]) {
    if items.is_empty() {
        println!("\n{}", "No news found.".dimmed());
        return;
    }

    println!("\n{}", "Latest news".bold().underline());
    for item in items {
        println!("\n{}", item.title.bold());

        let mut byline = item.published_at.clone();
        if let Some(source) = &item.source {
            byline = format!("{source} | {byline}");
        }
        if let Some(sentiment) = &item.sentiment {
            byline = format!("{byline} | {sentiment}");
        }
        println!("{}", byline.dimmed());

        println!("{}", truncate(&item.summary, SUMMARY_CHARS));
        if !item.link.is_empty() {
            println!("{}", item.link.blue().underline());
        }
        if let Some(image) = &item.image_url {
            println!("{} {}", "image:".dimmed(), image.dimmed());
        }
    }
}

pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }
}

pub fn print_snapshot(snapshot: &Snapshot, rows: usize) {
    print_series(&snapshot.label, &snapshot.series, rows);
    if let Some(summary) = snapshot.series.summary() {
        print_summary(&summary);
    }
    print_news(&snapshot.news);
    print_warnings(&snapshot.warnings);
}

pub fn print_saved(path: Option<&Path>) {
    match path {
        Some(path) => println!("{} {}", "Saved".green(), path.display()),
        None => println!("{}", "Nothing fetched yet; fetch prices before exporting.".yellow()),
    }
}

pub fn print_cache_stats(prices: CacheStats, news: CacheStats) {
    for (name, stats) in [("prices", prices), ("news", news)] {
        println!(
            "{:<7} {}/{} entries, {} hits, {} misses",
            name, stats.entries, stats.capacity, stats.hits, stats.misses
        );
    }
}

/// The error chain, plus a hint when the dashboard knows what kind of failure it was.
pub fn describe(err: &anyhow::Error) -> (String, Option<&'static str>) {
    let hint = err
        .downcast_ref::<stockdash_core::Error>()
        .map(|e| e.kind().hint());
    (format!("{err:#}"), hint)
}

pub fn print_error(err: &anyhow::Error) {
    let (message, hint) = describe(err);
    eprintln!("{} {message}", "error:".red().bold());
    if let Some(hint) = hint {
        eprintln!("{} {hint}", "hint:".cyan());
    }
}
