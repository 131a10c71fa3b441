use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use lnhook_sdk::objects::{CreateInvoiceRequest, CreateInvoiceResponse};

use super::ApiError;
use crate::state::AppState;

const DEFAULT_MEMO: &str = "Test invoice";

/// `POST /create-invoice` - create an invoice on the node.
///
/// The returned `rHash` is the hex invoice id that `/subscribe` and the
/// event payloads use.
pub(super) async fn create_invoice(
    State(state): State<AppState>,
    body: Result<Json<CreateInvoiceRequest>, JsonRejection>,
) -> Result<Json<CreateInvoiceResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    if req.amount < 0 {
        return Err(ApiError::InvalidAmount);
    }
    let memo = req.memo.as_deref().unwrap_or(DEFAULT_MEMO);

    let added = state
        .lnd
        .add_invoice(req.amount, memo)
        .await
        .map_err(ApiError::Upstream)?;

    let r_hash = hex::encode(&added.r_hash);
    tracing::info!(%r_hash, amount = req.amount, "Invoice created");

    Ok(Json(CreateInvoiceResponse {
        payment_request: added.payment_request,
        r_hash,
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{json_body, state};
    use crate::server::build_router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use mockito::{Matcher, Server};
    use tower::ServiceExt;

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/create-invoice")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_invoice_returns_hex_hash() {
        let mut lnd = Server::new_async().await;
        let mock = lnd
            .mock("POST", "/v1/invoices")
            .match_header("grpc-metadata-macaroon", "0201ab")
            .match_body(Matcher::Json(
                serde_json::json!({"value": "1000", "memo": "Test invoice"}),
            ))
            .with_status(200)
            .with_body(r#"{"r_hash":"3q2+7w==","payment_request":"lnbc10u1p"}"#)
            .create_async()
            .await;

        let response = build_router(state(&lnd.url()))
            .oneshot(post(r#"{"amount":1000}"#))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({"paymentRequest": "lnbc10u1p", "rHash": "deadbeef"})
        );
    }

    #[tokio::test]
    async fn test_create_invoice_passes_memo() {
        let mut lnd = Server::new_async().await;
        let mock = lnd
            .mock("POST", "/v1/invoices")
            .match_body(Matcher::PartialJson(serde_json::json!({"memo": "coffee"})))
            .with_status(200)
            .with_body(r#"{"r_hash":"AAE=","payment_request":"lnbc1"}"#)
            .create_async()
            .await;

        let response = build_router(state(&lnd.url()))
            .oneshot(post(r#"{"amount":5,"memo":"coffee"}"#))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(json_body(response).await["rHash"], "0001");
    }

    #[tokio::test]
    async fn test_create_invoice_node_error_is_500() {
        let mut lnd = Server::new_async().await;
        let _mock = lnd
            .mock("POST", "/v1/invoices")
            .with_status(500)
            .with_body(r#"{"code":2,"message":"wallet locked"}"#)
            .create_async()
            .await;

        let response = build_router(state(&lnd.url()))
            .oneshot(post(r#"{"amount":1000}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("wallet locked"));
    }

    #[tokio::test]
    async fn test_create_invoice_rejects_negative_amount() {
        let response = build_router(state("http://127.0.0.1:9"))
            .oneshot(post(r#"{"amount":-1}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
