use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the dashboard can surface to the user.
///
/// Missing optional fields in provider records are not errors; they are
/// replaced with defaults while mapping.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("{url} responded with {status}")]
    Status { status: StatusCode, url: String },

    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The service answered, but with a notice instead of data (rate limit, bad key).
    #[error("service unavailable: {0}")]
    Service(String),

    #[error("no data found for {symbol}: {reason}")]
    NoData { symbol: String, reason: String },

    #[error("no symbol selected; search for a company first")]
    NoSelection,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        // urls carry the API key, so they never reach the message
        match e.status() {
            Some(status) => Error::Status {
                status,
                url: e
                    .url()
                    .map(|url| crate::api::redact(url))
                    .unwrap_or_default(),
            },
            None => Error::Network(e.without_url()),
        }
    }
}

/// The three outcomes a user needs to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure or an unexpected response; try again later.
    NetworkOrService,
    /// Well-formed response without data; try another symbol.
    NoDataFound,
    /// Local problem: configuration, selection or export.
    Local,
}

impl ErrorKind {
    pub fn hint(&self) -> &'static str {
        match self {
            ErrorKind::NetworkOrService => "the data service could not be reached; try again later",
            ErrorKind::NoDataFound => "no data for this symbol and range; try another symbol",
            ErrorKind::Local => "check the configuration and inputs",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network(_) | Error::Status { .. } | Error::Decode { .. } | Error::Service(_) => {
                ErrorKind::NetworkOrService
            }
            Error::NoData { .. } => ErrorKind::NoDataFound,
            Error::NoSelection | Error::Config(_) | Error::Csv(_) | Error::Io(_) => ErrorKind::Local,
        }
    }
}
