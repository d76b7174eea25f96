use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Parser;
use cli::{Cli, Commands, FetchArgs, TraceLevel};
use dotenv::dotenv;
use stockdash_core::{Config, Dashboard, DateRange, Session};
use tracing::{debug, info, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod menu;
mod ui;

/// Range shown when the user gives no start date.
const DEFAULT_DAYS: u64 = 365;

fn preprocess(trace_level: Level) -> Result<()> {
    dotenv().ok();
    // stdout is for tables
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .with_writer(std::io::stderr)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(())
}

fn default_range(start: Option<NaiveDate>, end: Option<NaiveDate>, today: NaiveDate) -> DateRange {
    let end = end.unwrap_or(today);
    match start {
        Some(start) => DateRange::new(start, end),
        None => DateRange::last_days(end, DEFAULT_DAYS),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.trace {
        TraceLevel::DEBUG => Level::DEBUG,
        TraceLevel::INFO => Level::INFO,
        TraceLevel::WARN => Level::WARN,
        TraceLevel::ERROR => Level::ERROR,
    };

    preprocess(log_level)?;
    trace!("Command line input recorded: {cli:#?}");

    let config = Config::from_env()?;
    debug!("Configuration loaded: {} cache slots, {} news items", config.cache_capacity, config.news_limit);
    let mut dashboard = Dashboard::new(config)?;
    let today = Local::now().date_naive();

    ////////////////////////////////////////////////////////////////////////////////////////////////////

    // cli framework:
    // "> stockdash <COMMAND>"
    match cli.command.unwrap_or(Commands::Dashboard) {
        // "> stockdash search <COMPANY>"
        Commands::Search { company } => {
            let candidates = ui::with_spinner(
                format!("Searching for \"{}\"", company.trim()),
                dashboard.search(&company),
            )
            .await?;
            ui::print_candidates(&candidates);
        }

        // "> stockdash fetch <QUERY> [--symbol] [--first] ..."
        // search, pick, fetch, show and optionally export in one go
        Commands::Fetch(args) => fetch(&mut dashboard, args, today).await?,

        // "> stockdash news <SYMBOL> [--source]"
        Commands::News { symbol, source } => {
            let Some(source) = source.source() else {
                info!("News source \"none\" selected; nothing to fetch");
                return Ok(());
            };
            let (items, warnings) = ui::with_spinner(
                format!("Fetching {source} news for {}", symbol.trim().to_uppercase()),
                dashboard.news(&symbol, source),
            )
            .await;
            ui::print_news(&items);
            ui::print_warnings(&warnings);
        }

        // "> stockdash [dashboard]"
        Commands::Dashboard => {
            let session = Session::new(default_range(None, None, today));
            menu::run(&mut dashboard, session).await?;
        }
    }

    Ok(())
}

async fn fetch(dashboard: &mut Dashboard, args: FetchArgs, today: NaiveDate) -> Result<()> {
    let mut session = Session::new(default_range(args.start, args.end, today));

    if args.symbol {
        session.set_symbol(&args.query);
    } else {
        let candidates = ui::with_spinner(
            format!("Searching for \"{}\"", args.query.trim()),
            dashboard.search(&args.query),
        )
        .await?;
        session.set_candidates(&args.query, candidates);

        if args.first || session.candidates.len() == 1 {
            session.select_first();
        } else {
            menu::pick(&mut session)?;
        }
        if session.symbol.is_none() {
            ui::print_candidates(&session.candidates);
            return Ok(());
        }
    }

    // ---------------------------------------------------------------------------
    let snapshot = ui::with_spinner(
        format!("Fetching {} for {}", session.label(), session.range),
        dashboard.refresh(&mut session, args.source.into(), args.news.source()),
    )
    .await?;
    ui::print_snapshot(snapshot, args.rows);

    if let Some(path) = &args.csv {
        let saved = session.save_csv(Some(path.as_path())).await?;
        ui::print_saved(saved.as_deref());
    }

    Ok(())
}
