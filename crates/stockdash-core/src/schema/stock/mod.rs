/// Alpha Vantage `SYMBOL_SEARCH`; company name -> ticker candidates.
pub mod search;

/// Price table types shared by every price provider.
pub mod series;

/// Alpha Vantage `TIME_SERIES_DAILY`.
pub mod daily;

/// Yahoo! Finance `v8/finance/chart`.
pub mod chart;
