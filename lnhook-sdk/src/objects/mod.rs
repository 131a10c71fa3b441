pub mod api;
pub mod webhook;
pub mod ws;

pub use api::{
    CreateInvoiceRequest, CreateInvoiceResponse, ErrorResponse, HealthResponse, SubscribeRequest,
    SubscribeResponse,
};
pub use webhook::{InvoiceEventPayload, InvoiceEventType};
pub use ws::WsServerMessage;
