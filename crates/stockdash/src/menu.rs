use crate::ui;
use anyhow::{bail, Result};
use chrono::NaiveDate;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, FuzzySelect, Input, Select};
use std::fmt;
use std::path::Path;
use stockdash_core::{Dashboard, DateRange, Error, NewsSource, PriceSource, Session};
use tracing::{debug, info};

const PRICE_SOURCES: [PriceSource; 2] = [PriceSource::AlphaVantage, PriceSource::Yahoo];
const NEWS_SOURCES: [Option<NewsSource>; 4] = [
    Some(NewsSource::AlphaVantage),
    Some(NewsSource::Yahoo),
    Some(NewsSource::Both),
    None,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    Pick,
    Symbol,
    Range,
    Sources,
    Fetch,
    News,
    Export,
    Cache,
    ClearCache,
    Quit,
}

const ACTIONS: [Action; 11] = [
    Action::Search,
    Action::Pick,
    Action::Symbol,
    Action::Range,
    Action::Sources,
    Action::Fetch,
    Action::News,
    Action::Export,
    Action::Cache,
    Action::ClearCache,
    Action::Quit,
];

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Action::Search => "Search for a company",
            Action::Pick => "Pick from the last search",
            Action::Symbol => "Enter a ticker symbol",
            Action::Range => "Set the date range",
            Action::Sources => "Choose price and news sources",
            Action::Fetch => "Fetch prices and news",
            Action::News => "Refresh news only",
            Action::Export => "Export the last fetch to CSV",
            Action::Cache => "Show cache statistics",
            Action::ClearCache => "Clear the cache",
            Action::Quit => "Quit",
        };
        f.write_str(text)
    }
}

/// Fetch settings that persist between actions.
struct Preferences {
    source: PriceSource,
    news: Option<NewsSource>,
    rows: usize,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            source: PriceSource::AlphaVantage,
            news: Some(NewsSource::AlphaVantage),
            rows: 10,
        }
    }
}

/// Where the cursor starts: the next step a user would usually take.
fn default_action(session: &Session) -> Action {
    match (&session.symbol, session.snapshot()) {
        (None, _) => Action::Search,
        (Some(_), None) => Action::Fetch,
        (Some(_), Some(_)) => Action::Export,
    }
}

fn position(action: Action) -> usize {
    ACTIONS.iter().position(|a| *a == action).unwrap_or(0)
}

fn status_line(session: &Session, prefs: &Preferences) -> String {
    let symbol = match &session.symbol {
        Some(_) => session.label(),
        None => "no symbol".to_string(),
    };
    let news = prefs.news.map_or_else(|| "no news".to_string(), |n| format!("{n} news"));
    format!("{symbol} | {} | {} | {news}", session.range, prefs.source)
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Loop
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// Interactive dashboard. A failing action is reported and the loop carries on;
/// only the terminal going away ends it early.
pub async fn run(dashboard: &mut Dashboard, mut session: Session) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut prefs = Preferences::default();

    loop {
        println!("\n{}", status_line(&session, &prefs).dimmed());
        let choice = Select::with_theme(&theme)
            .with_prompt("What next?")
            .items(&ACTIONS)
            .default(position(default_action(&session)))
            .interact()?;

        let action = ACTIONS[choice];
        debug!("Action chosen: {action:?}");
        if action == Action::Quit {
            break;
        }

        if let Err(e) = step(action, dashboard, &mut session, &mut prefs, &theme).await {
            ui::print_error(&e);
        }
    }

    let (prices, news) = dashboard.cache_stats();
    info!("Session ended; price cache {prices:?}, news cache {news:?}");
    Ok(())
}

async fn step(
    action: Action,
    dashboard: &mut Dashboard,
    session: &mut Session,
    prefs: &mut Preferences,
    theme: &ColorfulTheme,
) -> Result<()> {
    match action {
        Action::Search => {
            let company: String = Input::with_theme(theme)
                .with_prompt("Company name")
                .interact_text()?;
            let candidates = ui::with_spinner(
                format!("Searching for \"{}\"", company.trim()),
                dashboard.search(&company),
            )
            .await?;
            session.set_candidates(&company, candidates);
            pick(session)?;
        }

        Action::Pick => pick(session)?,

        Action::Symbol => {
            let symbol: String = Input::with_theme(theme)
                .with_prompt("Ticker symbol")
                .interact_text()?;
            session.set_symbol(&symbol);
        }

        // ---------------------------------------------------------------------------
        Action::Range => {
            let start: NaiveDate = Input::with_theme(theme)
                .with_prompt("Start date (YYYY-MM-DD)")
                .default(session.range.start)
                .interact_text()?;
            let end: NaiveDate = Input::with_theme(theme)
                .with_prompt("End date (YYYY-MM-DD)")
                .default(session.range.end)
                .interact_text()?;

            let range = DateRange::new(start, end);
            if range.is_inverted() {
                bail!("start date {start} is after end date {end}");
            }
            session.set_range(range);
        }

        Action::Sources => {
            let source = Select::with_theme(theme)
                .with_prompt("Price source")
                .items(&PRICE_SOURCES)
                .default(PRICE_SOURCES.iter().position(|s| *s == prefs.source).unwrap_or(0))
                .interact()?;
            prefs.source = PRICE_SOURCES[source];

            let labels: Vec<String> = NEWS_SOURCES
                .iter()
                .map(|n| n.map_or_else(|| "No news".to_string(), |n| n.to_string()))
                .collect();
            let news = Select::with_theme(theme)
                .with_prompt("News source")
                .items(&labels)
                .default(NEWS_SOURCES.iter().position(|n| *n == prefs.news).unwrap_or(0))
                .interact()?;
            prefs.news = NEWS_SOURCES[news];
        }

        // ---------------------------------------------------------------------------
        Action::Fetch => {
            let snapshot = ui::with_spinner(
                format!("Fetching {} for {}", session.label(), session.range),
                dashboard.refresh(session, prefs.source, prefs.news),
            )
            .await?;
            ui::print_snapshot(snapshot, prefs.rows);
        }

        Action::News => {
            let Some(symbol) = session.symbol.clone() else {
                return Err(Error::NoSelection.into());
            };
            let source = prefs.news.unwrap_or(NewsSource::Both);
            let (items, warnings) = ui::with_spinner(
                format!("Fetching {source} news for {symbol}"),
                dashboard.news(&symbol, source),
            )
            .await;
            ui::print_news(&items);
            ui::print_warnings(&warnings);
        }

        Action::Export => {
            if session.snapshot().is_none() {
                ui::print_saved(None);
                return Ok(());
            }
            let target: String = Input::with_theme(theme)
                .with_prompt("Save to (file or directory)")
                .default(".".to_string())
                .interact_text()?;
            let saved = session.save_csv(Some(Path::new(target.trim()))).await?;
            ui::print_saved(saved.as_deref());
        }

        // ---------------------------------------------------------------------------
        Action::Cache => {
            let (prices, news) = dashboard.cache_stats();
            ui::print_cache_stats(prices, news);
        }

        Action::ClearCache => {
            dashboard.clear_cache();
            println!("{}", "Cache cleared.".green());
        }

        Action::Quit => {}
    }

    Ok(())
}

/// Let the user choose among the session's candidates. No candidates, no prompt.
pub fn pick(session: &mut Session) -> Result<()> {
    if session.candidates.is_empty() {
        ui::print_candidates(&session.candidates);
        return Ok(());
    }

    let labels: Vec<String> = session.candidates.iter().map(|c| c.label()).collect();
    let selection = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Symbol")
        .default(0)
        .items(&labels)
        .interact()?;

    if let Some(chosen) = session.select(&labels[selection]) {
        info!("Selected [{}] {}", chosen.symbol, chosen.display_name);
    }
    Ok(())
}
