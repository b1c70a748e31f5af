use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

use crate::client::retry::RetryPolicy;
use crate::error::{AttemptError, FetchError, Result};
use crate::models::{ArchiveResponse, DateRange, Granularity, Location, VariableSet};
use crate::utils::constants::DEFAULT_TIMEZONE;

/// Build the HTTP session shared by every request of a run.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FetchError::ClientSetup)
}

/// Requests one date range at a time from the historical archive.
///
/// Borrows the session so the caller decides its lifetime.
pub struct ArchiveClient<'a> {
    http: &'a Client,
    base_url: Url,
    timezone: String,
    retry: RetryPolicy,
}

impl<'a> ArchiveClient<'a> {
    pub fn new(http: &'a Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::Url(format!("{}: {}", base_url, e)))?;

        Ok(Self {
            http,
            base_url,
            timezone: DEFAULT_TIMEZONE.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = timezone.to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Query URL for one location, date range and variable selection.
    pub fn request_url(
        &self,
        location: &Location,
        range: &DateRange,
        variables: &VariableSet,
    ) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("latitude", &location.latitude.to_string())
                .append_pair("longitude", &location.longitude.to_string())
                .append_pair("start_date", &range.start().format("%Y-%m-%d").to_string())
                .append_pair("end_date", &range.end().format("%Y-%m-%d").to_string())
                .append_pair("timezone", &self.timezone);

            for granularity in Granularity::ALL {
                let codes = variables.get(granularity);
                if !codes.is_empty() {
                    query.append_pair(granularity.key(), &codes.join(","));
                }
            }
        }
        url
    }

    /// Fetch one range, retrying per the client's policy.
    pub async fn fetch(
        &self,
        location: &Location,
        range: &DateRange,
        variables: &VariableSet,
    ) -> Result<ArchiveResponse> {
        let url = self.request_url(location, range, variables);
        debug!(%url, "requesting archive range");

        self.retry
            .run(|_| self.attempt(url.clone()))
            .await
            .map_err(|exhausted| FetchError::FetchExhausted {
                attempts: exhausted.attempts,
                url: url.to_string(),
                source: exhausted.last,
            })
    }

    /// Exactly one round trip. The body must decode completely.
    async fn attempt(&self, url: Url) -> std::result::Result<ArchiveResponse, AttemptError> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(AttemptError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status {
                status,
                url: url.to_string(),
            });
        }

        response.json::<ArchiveResponse>().await.map_err(|e| {
            if e.is_decode() {
                AttemptError::Decode(e)
            } else {
                AttemptError::Transport(e)
            }
        })
    }
}
