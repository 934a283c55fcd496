//! Retrieve raw sitemap documents over HTTP or from disk.
//!
//! A plain GET per source: no retries, redirects are not followed and only a
//! 200 counts as success. No timeout is applied unless configured.

use std::path::Path;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

use crate::resolve::RemoteTarget;
use crate::types::{HarvestError, HarvestResult, TransportOptions};

/// Fetches sitemap documents for the harvest pipeline.
#[derive(Clone)]
pub struct ContentFetcher {
    client: reqwest::Client,
    headers: HeaderMap,
}

impl ContentFetcher {
    /// Build a fetcher from the run's transport options.
    ///
    /// Fails only on header names or values that cannot be sent.
    pub fn new(options: &TransportOptions) -> HarvestResult<Self> {
        let ua = concat!("sitemap-harvest/", env!("CARGO_PKG_VERSION"));

        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(ua);
        if let Some(ms) = options.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder.build()?;

        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| HarvestError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| HarvestError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }

        // An explicit authorization header takes precedence over `auth`.
        if let Some(value) = options.basic_authorization() {
            if !headers.contains_key(AUTHORIZATION) {
                let mut value =
                    HeaderValue::from_str(&value).map_err(|e| HarvestError::InvalidHeader {
                        name: AUTHORIZATION.to_string(),
                        reason: e.to_string(),
                    })?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        Ok(Self { client, headers })
    }

    /// GET the target and return the body decoded as UTF-8.
    ///
    /// A non-200 response is returned as [`HarvestError::Status`] without
    /// reading its body.
    pub async fn fetch_remote(&self, target: &RemoteTarget) -> HarvestResult<String> {
        let resp = self
            .client
            .get(target.request_url())
            .headers(self.headers.clone())
            .send()
            .await?;
        let status = resp.status().as_u16();
        if status != 200 {
            return Err(HarvestError::Status(status));
        }

        let body = resp.bytes().await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Read a whole local file, decoded as UTF-8.
    ///
    /// A path that does not exist yields [`HarvestError::InvalidSource`];
    /// any other I/O failure yields [`HarvestError::Read`].
    pub async fn fetch_local(&self, path: &Path) -> HarvestResult<String> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(HarvestError::InvalidSource(path.to_path_buf()));
        }

        let data = tokio::fs::read(path)
            .await
            .map_err(|source| HarvestError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}
