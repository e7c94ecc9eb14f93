// src/session.rs
use crate::types::{BucketFinderError, HttpConfig};
use reqwest::Client;
use std::time::Duration;

/// HTTP session shared by every probe of a run.
#[derive(Clone)]
pub struct Session {
    pub client: Client,
}

impl Session {
    pub fn new(config: &HttpConfig) -> Result<Self, BucketFinderError> {
        let connect_timeout = config.timeout.min(Duration::from_secs(10));

        let mut client_builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .connect_timeout(connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10);

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| BucketFinderError::ConfigError(format!("Invalid proxy URL: {}", e)))?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build()
            .map_err(|e| BucketFinderError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Session { client })
    }

    /// Single GET, no retry.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, BucketFinderError> {
        Ok(self.client.get(url).send().await?)
    }
}
