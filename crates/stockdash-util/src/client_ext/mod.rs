pub mod util;

pub use reqwest::Client;
use std::time::Duration;

/// Build the one [`reqwest::Client`] shared by every request of a session.
///
/// ```ignore
/// let client = stockdash_util::build_client("stockdash/0.1", Duration::from_secs(30))?;
/// ```
pub fn build_client(user_agent: &str, timeout: Duration) -> reqwest::Result<Client> {
    reqwest::ClientBuilder::new()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
}
