//! HTTP API handlers.
//!
//! # Endpoints
//!
//! - `POST /subscribe`      - register a webhook endpoint for an invoice
//! - `POST /create-invoice` - create an invoice on the node (testing aid)
//!
//! The realtime WebSocket endpoint lives on its own listener, see
//! [`realtime`].

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use lnhook_core::upstream::SourceError;
use lnhook_sdk::objects::ErrorResponse;

use crate::state::AppState;

mod create_invoice;
pub mod realtime;
mod subscribe;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(subscribe::subscribe))
        .route("/create-invoice", post(create_invoice::create_invoice))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in API handlers.
#[derive(Debug)]
enum ApiError {
    /// `invoiceId` or `webhookEndpoint` is missing or empty.
    MissingFields,
    /// `webhookEndpoint` is not an absolute URL.
    InvalidWebhookUrl,
    /// The request body could not be read as JSON.
    InvalidBody(String),
    /// The invoice amount is negative.
    InvalidAmount,
    /// The node refused or failed the request.
    Upstream(SourceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingFields => (StatusCode::BAD_REQUEST, "Missing required fields".into()),
            ApiError::InvalidWebhookUrl => {
                (StatusCode::BAD_REQUEST, "Invalid webhook URL".into())
            }
            ApiError::InvalidBody(reason) => (StatusCode::BAD_REQUEST, reason),
            ApiError::InvalidAmount => (
                StatusCode::BAD_REQUEST,
                "amount must not be negative".into(),
            ),
            ApiError::Upstream(e) => {
                tracing::error!(error = %e, "Node request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::state::AppState;
    use lnhook_core::config::LndConfig;
    use lnhook_core::entities::SubscriptionRegistry;
    use lnhook_core::processors::{ConsumerState, RealtimeHub};
    use lnhook_core::upstream::LndRestClient;
    use tokio::sync::watch;
    use url::Url;

    /// State pointing at `lnd_url` for node calls.
    pub fn state(lnd_url: &str) -> AppState {
        state_with_shutdown(lnd_url).0
    }

    /// Like [`state`], keeping the shutdown sender alive.
    pub fn state_with_shutdown(lnd_url: &str) -> (AppState, watch::Sender<bool>) {
        let lnd = LndRestClient::new(&LndConfig {
            rest_url: Url::parse(lnd_url).unwrap(),
            macaroon_hex: "0201ab".to_string(),
            tls_cert_pem: None,
        })
        .unwrap();
        let (_, upstream) = watch::channel(ConsumerState::Streaming);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let state = AppState::new(
            SubscriptionRegistry::new(),
            RealtimeHub::new(8),
            lnd,
            upstream,
            shutdown_rx,
        );
        (state, shutdown_tx)
    }

    pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
