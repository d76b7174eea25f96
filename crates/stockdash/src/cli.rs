use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use stockdash_core::{NewsSource, PriceSource};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Defaults to the interactive dashboard.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Sets the level of tracing
    #[arg(long, global = true, default_value = "WARN", ignore_case = true)]
    pub trace: TraceLevel,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List ticker symbols matching a company name.
    Search {
        company: String,
    },

    /// Fetch prices (and news) for a company, print them, optionally export to CSV.
    Fetch(FetchArgs),

    /// Print the latest news for a ticker symbol.
    News {
        symbol: String,

        #[arg(long, default_value = "both")]
        source: NewsChoice,
    },

    /// Interactive dashboard: search, pick, fetch, read news, export.
    Dashboard,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Company name to search for (or the ticker itself, with --symbol).
    pub query: String,

    /// Treat QUERY as a ticker symbol and skip the search.
    #[arg(long)]
    pub symbol: bool,

    /// Take the first search match instead of asking.
    #[arg(long)]
    pub first: bool,

    /// First day of the range [default: a year before --end]
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the range [default: today]
    #[arg(long)]
    pub end: Option<NaiveDate>,

    #[arg(long, default_value = "alpha")]
    pub source: SourceChoice,

    #[arg(long, default_value = "alpha")]
    pub news: NewsChoice,

    /// Rows of the price table to print.
    #[arg(long, default_value_t = 5)]
    pub rows: usize,

    /// Write the table to this file (or into this directory as <QUERY>_data.csv).
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum SourceChoice {
    Alpha,
    Yahoo,
}

impl From<SourceChoice> for PriceSource {
    fn from(choice: SourceChoice) -> Self {
        match choice {
            SourceChoice::Alpha => PriceSource::AlphaVantage,
            SourceChoice::Yahoo => PriceSource::Yahoo,
        }
    }
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum NewsChoice {
    Alpha,
    Yahoo,
    Both,
    None,
}

impl NewsChoice {
    pub fn source(self) -> Option<NewsSource> {
        match self {
            NewsChoice::Alpha => Some(NewsSource::AlphaVantage),
            NewsChoice::Yahoo => Some(NewsSource::Yahoo),
            NewsChoice::Both => Some(NewsSource::Both),
            NewsChoice::None => None,
        }
    }
}

#[derive(ValueEnum, Copy, Clone, Debug)]
pub enum TraceLevel {
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn fetch_parses_dates_and_sources() {
        let cli = Cli::try_parse_from([
            "stockdash", "fetch", "apple", "--start", "2024-01-01", "--end", "2024-06-30",
            "--source", "yahoo", "--news", "none", "--first",
        ])
        .unwrap();

        let Some(Commands::Fetch(args)) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.query, "apple");
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(PriceSource::from(args.source), PriceSource::Yahoo);
        assert_eq!(args.news.source(), None);
        assert!(args.first && !args.symbol);
        assert_eq!(args.rows, 5);
    }

    #[test]
    fn no_subcommand_means_dashboard() {
        let cli = Cli::try_parse_from(["stockdash", "--trace", "DEBUG"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(cli.trace, TraceLevel::DEBUG));
    }
}
