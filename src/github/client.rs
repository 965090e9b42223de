// GitHub API HTTP client.
// Handles authentication, rate limiting, retry with backoff, and request/response processing.

use std::time::Duration;

use chrono::Utc;
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{FetchFailure, FolioError, Result};

use super::retry::RetryPolicy;
use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// GitHub API client for a single user, with rate limit tracking and retries.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    username: String,
    retry: RetryPolicy,
    rate_limit: RwLock<Option<RateLimit>>,
}

impl GitHubClient {
    /// Create a client for `username`, authenticated when a token is given.
    pub fn new(username: &str, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| FolioError::Config(format!("invalid token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("folio-github/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: GITHUB_API_BASE.to_string(),
            username: username.to_string(),
            retry: RetryPolicy::default(),
            rate_limit: RwLock::new(None),
        })
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(&config.username, config.token.as_deref())?
            .with_base_url(&config.api_base_url)
            .with_retry_policy(config.retry.policy()))
    }

    /// Point the client at another API root (GitHub Enterprise, test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// The most recent rate limit observed, if any response carried one.
    pub async fn rate_limit(&self) -> Option<RateLimit> {
        *self.rate_limit.read().await
    }

    /// GET an endpoint with retries and decode its JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        let (response, attempts) = self.get_with_retry(&url, params, cancel).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| FolioError::FetchFailed {
                url,
                attempts,
                source: FetchFailure::Decode(e),
            })
    }

    /// Send a GET request, retrying rate limits, server errors, and network failures.
    /// Returns the successful response together with the number of attempts it took.
    async fn get_with_retry(
        &self,
        url: &str,
        params: &[(&str, String)],
        cancel: &CancellationToken,
    ) -> Result<(Response, u32)> {
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(FolioError::Cancelled);
            }
            self.wait_for_rate_limit(cancel).await?;

            debug!(url, attempt = attempt + 1, "requesting");
            let request = self.client.get(url).query(params);
            let sent = tokio::select! {
                _ = cancel.cancelled() => return Err(FolioError::Cancelled),
                result = request.send() => result,
            };

            let (failure, delay) = match sent {
                Ok(response) => {
                    self.update_rate_limit(response.headers()).await;
                    let quota_spent = self.quota_spent().await;

                    match response.status() {
                        status if status.is_success() => return Ok((response, attempt + 1)),
                        StatusCode::NOT_FOUND => return Err(FolioError::NotFound(url.to_string())),
                        StatusCode::TOO_MANY_REQUESTS => (
                            FetchFailure::RateLimited,
                            self.retry.rate_limited_delay(attempt, response.headers()),
                        ),
                        StatusCode::FORBIDDEN if quota_spent => {
                            warn!(url, "quota exhausted (HTTP 403), not retrying");
                            return Err(FolioError::FetchFailed {
                                url: url.to_string(),
                                attempts: attempt + 1,
                                source: FetchFailure::RateLimited,
                            });
                        }
                        status if status.is_server_error() => {
                            (FetchFailure::Server(status), self.retry.jittered_backoff(attempt))
                        }
                        status => {
                            return Err(FolioError::FetchFailed {
                                url: url.to_string(),
                                attempts: attempt + 1,
                                source: FetchFailure::Status(status),
                            });
                        }
                    }
                }
                Err(e) => (FetchFailure::Network(e), self.retry.jittered_backoff(attempt)),
            };

            if self.retry.is_last_attempt(attempt) {
                warn!(url, attempts = attempt + 1, error = %failure, "giving up");
                return Err(FolioError::FetchFailed {
                    url: url.to_string(),
                    attempts: attempt + 1,
                    source: failure,
                });
            }

            warn!(
                url,
                attempt = attempt + 1,
                max_attempts = self.retry.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "request failed, retrying"
            );
            sleep_or_cancel(delay, cancel).await?;
            attempt += 1;
        }
    }

    /// Sleep until the rate limit window resets when the last response spent the quota.
    async fn wait_for_rate_limit(&self, cancel: &CancellationToken) -> Result<()> {
        let Some(limit) = self.rate_limit().await else {
            return Ok(());
        };

        let now = Utc::now().timestamp();
        if !limit.is_exhausted_at(now) {
            return Ok(());
        }

        let wait = Duration::from_secs(limit.reset.saturating_sub(now as u64));
        warn!(
            wait_secs = wait.as_secs(),
            reset = limit.reset,
            "rate limit exhausted, waiting for reset"
        );
        sleep_or_cancel(wait, cancel).await
    }

    async fn quota_spent(&self) -> bool {
        self.rate_limit()
            .await
            .is_some_and(|limit| limit.remaining == 0)
    }

    /// Replace the rate limit snapshot when the response carries all three headers.
    async fn update_rate_limit(&self, headers: &HeaderMap) {
        let Some(observed) = parse_rate_limit(headers) else {
            return;
        };
        *self.rate_limit.write().await = Some(observed);
    }
}

fn parse_rate_limit(headers: &HeaderMap) -> Option<RateLimit> {
    let header = |name: &str| -> Option<u64> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    };

    Some(RateLimit {
        limit: header("x-ratelimit-limit")?,
        remaining: header("x-ratelimit-remaining")?,
        reset: header("x-ratelimit-reset")?,
    })
}

async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        _ = cancel.cancelled() => Err(FolioError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
