//! HTTP API client (merchant backend → lnhook relay).

use reqwest::Client;
use url::Url;

use super::ClientError;
use crate::objects::api::{
    CreateInvoiceRequest, CreateInvoiceResponse, HealthResponse, SubscribeRequest,
    SubscribeResponse,
};

/// Typed HTTP client for the relay's registration API.
///
/// The API is unauthenticated; put the relay behind something that is if
/// it is reachable from untrusted networks.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    base_url: Url,
}

impl RelayClient {
    /// Create a new `RelayClient`.
    ///
    /// * `base_url` - root URL of the relay (e.g. `http://localhost:3000`).
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /subscribe` - register `webhook_endpoint` for events about
    /// `invoice_id`.
    ///
    /// Registering the same pair twice stores it twice; the endpoint will
    /// then receive every event twice.
    pub async fn subscribe(
        &self,
        invoice_id: impl Into<String>,
        webhook_endpoint: &Url,
    ) -> Result<SubscribeResponse, ClientError> {
        let body = SubscribeRequest {
            invoice_id: invoice_id.into(),
            webhook_endpoint: webhook_endpoint.to_string(),
        };

        let url = self.base_url.join("/subscribe")?;
        let resp = self.http.post(url).json(&body).send().await?;

        parse_response(resp).await
    }

    /// `POST /create-invoice` - ask the node for a new invoice.
    pub async fn create_invoice(
        &self,
        amount: i64,
        memo: Option<String>,
    ) -> Result<CreateInvoiceResponse, ClientError> {
        let body = CreateInvoiceRequest { amount, memo };

        let url = self.base_url.join("/create-invoice")?;
        let resp = self.http.post(url).json(&body).send().await?;

        parse_response(resp).await
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = self.base_url.join("/health")?;
        let resp = self.http.get(url).send().await?;

        parse_response(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
