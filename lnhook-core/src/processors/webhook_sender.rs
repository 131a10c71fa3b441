//! WebhookSender.
//!
//! Sends one serialized event to one endpoint. There is no retry: a
//! non-2xx answer, a timeout or a transport error is reported to the caller,
//! which logs it and moves on.

use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// HTTP request error (connect failure, timeout, ...)
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Endpoint answered with a non-2xx status
    #[error("webhook delivery failed with status {status}: {body}")]
    DeliveryFailed { status: u16, body: String },
}

impl WebhookError {
    /// Whether the request ran into the delivery timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WebhookError::Request(e) if e.is_timeout())
    }
}

/// HTTP client for webhook POSTs.
#[derive(Debug, Clone)]
pub struct WebhookSender {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl WebhookSender {
    /// Create a sender whose requests time out after `timeout`.
    ///
    /// The timeout is also set on every request, so it holds even when the
    /// builder falls back to a default client.
    pub fn new(timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            timeout,
        }
    }

    /// POST `body` to `url` as JSON.
    ///
    /// Returns the response status on success.
    pub async fn send(&self, url: &Url, body: &str) -> Result<u16, WebhookError> {
        let response = self
            .http_client
            .post(url.clone())
            .timeout(self.timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(WebhookError::DeliveryFailed {
                status: status.as_u16(),
                body,
            })
        }
    }
}
