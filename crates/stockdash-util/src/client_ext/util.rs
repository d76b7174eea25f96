use reqwest::{Client, StatusCode};
use std::future::Future;
use tracing::{error, trace};

pub trait ClientUtilExt {
    /// GET `url` and return the raw body; non-2xx statuses are errors.
    ///
    /// Returned errors never carry `url`, which may hold credentials.
    fn get_bytes(&self, url: &str) -> impl Future<Output = reqwest::Result<Vec<u8>>> + Send;

    /// GET `url` and return the status with the raw body, whatever the status.
    fn get_body(&self, url: &str) -> impl Future<Output = reqwest::Result<(StatusCode, Vec<u8>)>> + Send;
}

impl ClientUtilExt for Client {
    async fn get_bytes(&self, url: &str) -> reqwest::Result<Vec<u8>> {
        let client = self;

        // send the request and reject any non-2xx status
        let response = client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                let e = e.without_url();
                error!("GET request failed: {e}");
                e
            })?;

        read_body(response).await
    }

    async fn get_body(&self, url: &str) -> reqwest::Result<(StatusCode, Vec<u8>)> {
        let response = self.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            error!("GET request failed: {e}");
            e
        })?;

        let status = response.status();
        trace!("responded with {status}");
        Ok((status, read_body(response).await?))
    }
}

async fn read_body(response: reqwest::Response) -> reqwest::Result<Vec<u8>> {
    let body = response.bytes().await.map_err(|e| {
        let e = e.without_url();
        error!("failed reading response body: {e}");
        e
    })?;
    trace!("received {} bytes", body.len());

    Ok(body.to_vec())
}
