//! Data-retrieval and derived-metrics pipeline behind the `stockdash` dashboard.
//!
//! ```ignore
//! let mut dashboard = Dashboard::new(Config::from_env()?)?;
//! let mut session = Session::new(DateRange::last_days(today, 365));
//! session.set_candidates("apple", dashboard.search("apple").await?);
//! session.select_first();
//! dashboard.refresh(&mut session, PriceSource::AlphaVantage, Some(NewsSource::Both)).await?;
//! ```
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod schema;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use schema::news::{NewsItem, NewsSource};
pub use schema::stock::search::SymbolCandidate;
pub use schema::stock::series::{DateRange, PriceBar, PriceSeries, PriceSource};
pub use session::{Dashboard, Session, Snapshot};
