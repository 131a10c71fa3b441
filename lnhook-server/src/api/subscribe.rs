use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use kanau::processor::Processor;
use lnhook_core::entities::RegisterSubscription;
use lnhook_sdk::objects::{SubscribeRequest, SubscribeResponse};
use url::Url;

use super::ApiError;
use crate::state::AppState;

/// `POST /subscribe` - register a webhook endpoint for an invoice.
///
/// Registering the same endpoint twice keeps both entries, so the endpoint
/// will receive every event twice.
pub(super) async fn subscribe(
    State(state): State<AppState>,
    body: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<Json<SubscribeResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;

    if req.invoice_id.is_empty() || req.webhook_endpoint.is_empty() {
        return Err(ApiError::MissingFields);
    }
    let endpoint = Url::parse(&req.webhook_endpoint).map_err(|_| ApiError::InvalidWebhookUrl)?;

    tracing::info!(
        invoice_id = %req.invoice_id,
        %endpoint,
        "Subscribing webhook to invoice"
    );

    let subscription_count = state
        .registry
        .process(RegisterSubscription {
            invoice_id: req.invoice_id,
            endpoint,
        })
        .await
        .unwrap_or_else(|never| match never {});

    Ok(Json(SubscribeResponse {
        success: true,
        subscription_count,
    }))
}
