//! Axum server setup and router configuration.

use crate::api;
use crate::state::AppState;
use axum::{Json, Router, extract::State, routing::get};
use lnhook_sdk::objects::HealthResponse;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Build the main application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .merge(api::router())
        .with_state(state)
}

/// Build the router of the realtime listener.
pub fn build_realtime_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::realtime::realtime_ws))
        .with_state(state)
}

/// Health check with upstream state and registry counters.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        upstream: state.upstream_state().to_string(),
        subjects: state.registry.subject_count().await,
        subscriptions: state.registry.subscription_total().await,
    })
}

/// Bind `addr` and serve `router` until shutdown is requested.
pub async fn run_server(
    router: Router,
    addr: SocketAddr,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);
    serve(listener, router, shutdown_rx).await
}

/// Serve `router` on an already bound listener with graceful shutdown.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), std::io::Error> {
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{json_body, state, state_with_shutdown};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use lnhook_core::config::DeliveryConfig;
    use lnhook_core::events::{InvoiceEvent, InvoiceEventKind};
    use lnhook_core::processors::FanoutDispatcher;
    use lnhook_sdk::client::{EventStreamClient, RelayClient};
    use lnhook_sdk::objects::{InvoiceEventType, WsServerMessage};
    use std::time::Duration;
    use tower::ServiceExt;
    use url::Url;

    async fn spawn(router: Router, shutdown_rx: watch::Receiver<bool>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, router, shutdown_rx));
        addr
    }

    #[tokio::test]
    async fn test_health_reports_counters() {
        let state = state("http://127.0.0.1:9");
        let router = build_router(state.clone());
        let subscribe = |id: &str| {
            Request::builder()
                .method("POST")
                .uri("/subscribe")
                .header("content-type", "application/json")
                .body(Body::from(format!(
                    r#"{{"invoiceId":"{id}","webhookEndpoint":"http://x/y"}}"#
                )))
                .unwrap()
        };
        router.clone().oneshot(subscribe("a")).await.unwrap();
        router.clone().oneshot(subscribe("a")).await.unwrap();
        router.clone().oneshot(subscribe("b")).await.unwrap();

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["upstream"], "streaming");
        assert_eq!(body["subjects"], 2);
        assert_eq!(body["subscriptions"], 3);
    }

    #[tokio::test]
    async fn test_relay_client_against_api() {
        let mut lnd = mockito::Server::new_async().await;
        let add_invoice = lnd
            .mock("POST", "/v1/invoices")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"value": "250", "memo": "tea"}),
            ))
            .with_status(200)
            .with_body(r#"{"r_hash":"3q2+7w==","payment_request":"lnbc2500n1p"}"#)
            .create_async()
            .await;

        let (state, shutdown_tx) = state_with_shutdown(&lnd.url());
        let addr = spawn(build_router(state.clone()), state.shutdown_rx.clone()).await;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        let client = RelayClient::new(Url::parse(&format!("http://{addr}")).unwrap())
            .with_http_client(http);

        let invoice = client
            .create_invoice(250, Some("tea".to_string()))
            .await
            .unwrap();
        add_invoice.assert_async().await;
        assert_eq!(invoice.r_hash, "deadbeef");
        assert_eq!(invoice.payment_request, "lnbc2500n1p");

        let hook = Url::parse("http://merchant.example/hook").unwrap();
        let response = client.subscribe("deadbeef", &hook).await.unwrap();
        assert!(response.success);
        assert_eq!(response.subscription_count, 1);
        assert_eq!(state.registry.lookup("deadbeef").await, vec![hook]);

        let health = client.health().await.unwrap();
        assert_eq!(health.subscriptions, 1);

        shutdown_tx.send(true).unwrap();
    }

    #[tokio::test]
    async fn test_realtime_peer_receives_ack_then_events() {
        let (state, shutdown_tx) = state_with_shutdown("http://127.0.0.1:9");
        let addr = spawn(build_realtime_router(state.clone()), state.shutdown_rx.clone()).await;

        let url = Url::parse(&format!("ws://{addr}/")).unwrap();
        let mut client = EventStreamClient::connect(&url).await.unwrap();
        assert_eq!(
            client.next_message().await.unwrap(),
            Some(WsServerMessage::Connected)
        );
        assert_eq!(state.hub.peer_count().await, 1);

        // A second client that leaves on its own is removed from the hub.
        let mut leaving = EventStreamClient::connect(&url).await.unwrap();
        assert_eq!(
            leaving.next_message().await.unwrap(),
            Some(WsServerMessage::Connected)
        );
        leaving.close().await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), async {
            while state.hub.peer_count().await > 1 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        let dispatcher = FanoutDispatcher::new(
            state.registry.clone(),
            state.hub.clone(),
            &DeliveryConfig::default(),
        );
        let report = dispatcher
            .dispatch(&InvoiceEvent {
                invoice_id: "deadbeef".to_string(),
                kind: InvoiceEventKind::Expired,
                amount: 42,
                memo: String::new(),
                settled: false,
                settle_date: 0,
                creation_date: 1_700_000_000,
            })
            .await;
        assert_eq!(report.peers.delivered, 1);

        match client.next_message().await.unwrap() {
            Some(WsServerMessage::Invoice(payload)) => {
                assert_eq!(payload.event_type, InvoiceEventType::InvoiceExpired);
                assert_eq!(payload.invoice_id, "deadbeef");
                assert_eq!(payload.amount, 42);
            }
            other => panic!("unexpected message: {other:?}"),
        }

        shutdown_tx.send(true).unwrap();
        let closed = tokio::time::timeout(Duration::from_secs(5), client.next_message())
            .await
            .unwrap()
            .unwrap();
        assert!(closed.is_none());

        // The handler removes the peer after the socket loop ends.
        tokio::time::timeout(Duration::from_secs(5), async {
            while state.hub.peer_count().await > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }
}
