//! LND REST gateway client.
//!
//! Invoice updates come from `GET /v1/invoices/subscribe`, which keeps the
//! response open and writes one JSON object per line:
//!
//! ```text
//! {"result":{"r_hash":"3q2+7w==","value":"1000","settled":true,...}}
//! {"error":{"code":2,"message":"..."}}
//! ```
//!
//! `int64` fields are rendered as JSON strings by the gateway, `bytes`
//! fields as base64.

use super::{InvoiceSource, InvoiceStream, SourceError};
use crate::config::LndConfig;
use crate::events::RawInvoice;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Header carrying the hex macaroon on every gateway request.
pub const MACAROON_HEADER: &str = "grpc-metadata-macaroon";

/// Timeout for unary calls. The subscription itself has none.
const UNARY_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest accepted line of the subscription body.
const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Invoice created through [`LndRestClient::add_invoice`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedInvoice {
    pub r_hash: Vec<u8>,
    pub payment_request: String,
}

/// Client for the node's REST gateway.
#[derive(Debug, Clone)]
pub struct LndRestClient {
    rest_url: Url,
    http_client: reqwest::Client,
}

impl LndRestClient {
    /// Build a client that authenticates with the configured macaroon and
    /// trusts the configured certificate.
    pub fn new(config: &LndConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        let mut macaroon = HeaderValue::from_str(&config.macaroon_hex)
            .map_err(|e| SourceError::Malformed(format!("macaroon is not a valid header: {e}")))?;
        macaroon.set_sensitive(true);
        headers.insert(MACAROON_HEADER, macaroon);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(pem) = &config.tls_cert_pem {
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(pem)?);
        }

        Ok(Self {
            rest_url: config.rest_url.clone(),
            http_client: builder.build()?,
        })
    }

    /// Create an invoice for `value` satoshis.
    pub async fn add_invoice(&self, value: i64, memo: &str) -> Result<AddedInvoice, SourceError> {
        #[derive(serde::Serialize)]
        struct AddInvoiceRequest<'a> {
            value: String,
            memo: &'a str,
        }

        #[derive(Deserialize)]
        struct AddInvoiceResponse {
            r_hash: String,
            payment_request: String,
        }

        let url = self.endpoint("/v1/invoices")?;
        let response = self
            .http_client
            .post(url)
            .timeout(UNARY_TIMEOUT)
            .json(&AddInvoiceRequest {
                value: value.to_string(),
                memo,
            })
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body: AddInvoiceResponse = response.json().await?;

        Ok(AddedInvoice {
            r_hash: decode_bytes(&body.r_hash)?,
            payment_request: body.payment_request,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        self.rest_url
            .join(path)
            .map_err(|e| SourceError::Malformed(format!("invalid gateway url: {e}")))
    }
}

#[async_trait]
impl InvoiceSource for LndRestClient {
    async fn subscribe(&self) -> Result<InvoiceStream, SourceError> {
        let url = self.endpoint("/v1/invoices/subscribe")?;
        info!(%url, "Opening invoice subscription");

        let response = self.http_client.get(url).send().await?;
        let response = ensure_success(response).await?;

        Ok(invoice_records(response.bytes_stream()))
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(SourceError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

// ---------------------------------------------------------------------------
// Stream framing
// ---------------------------------------------------------------------------

struct LineReader {
    body: BoxStream<'static, Result<Bytes, reqwest::Error>>,
    buf: BytesMut,
    done: bool,
}

impl LineReader {
    /// Next complete line, or the unterminated tail once the body ended.
    fn take_line(&mut self) -> Option<BytesMut> {
        if let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let mut line = self.buf.split_to(pos + 1);
            line.truncate(pos);
            return Some(line);
        }
        if self.done && !self.buf.is_empty() {
            return Some(self.buf.split());
        }
        None
    }
}

/// Split a newline-delimited body into parsed invoice records.
///
/// Ends after the first error.
fn invoice_records<S>(body: S) -> InvoiceStream
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    let reader = LineReader {
        body: body.boxed(),
        buf: BytesMut::new(),
        done: false,
    };

    stream::unfold(reader, |mut reader| async move {
        loop {
            if let Some(line) = reader.take_line() {
                if line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                let record = parse_frame(&line);
                if record.is_err() {
                    reader.done = true;
                    reader.buf.clear();
                }
                return Some((record, reader));
            }
            if reader.done {
                return None;
            }
            if reader.buf.len() > MAX_LINE_BYTES {
                reader.done = true;
                let len = reader.buf.len();
                reader.buf.clear();
                return Some((
                    Err(SourceError::Malformed(format!(
                        "line exceeds {MAX_LINE_BYTES} bytes ({len} buffered)"
                    ))),
                    reader,
                ));
            }
            match reader.body.next().await {
                Some(Ok(chunk)) => reader.buf.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    reader.done = true;
                    reader.buf.clear();
                    return Some((Err(SourceError::Request(e)), reader));
                }
                None => reader.done = true,
            }
        }
    })
    .boxed()
}

#[derive(Deserialize)]
struct StreamFrame {
    result: Option<LndInvoice>,
    error: Option<StreamFrameError>,
}

#[derive(Deserialize)]
struct StreamFrameError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Invoice fields used by the relay.
///
/// `memo` and `settle_date` may be omitted for unpopulated invoices; the
/// remaining fields are required and their absence ends the stream.
#[derive(Deserialize)]
struct LndInvoice {
    r_hash: String,
    #[serde(deserialize_with = "de_int64")]
    value: i64,
    #[serde(default)]
    memo: String,
    settled: bool,
    #[serde(default, deserialize_with = "de_int64")]
    settle_date: i64,
    #[serde(deserialize_with = "de_int64")]
    creation_date: i64,
}

fn parse_frame(line: &[u8]) -> Result<RawInvoice, SourceError> {
    let frame: StreamFrame =
        serde_json::from_slice(line).map_err(|e| SourceError::Malformed(e.to_string()))?;

    if let Some(error) = frame.error {
        return Err(SourceError::Upstream(format!(
            "code {}: {}",
            error.code, error.message
        )));
    }
    let Some(invoice) = frame.result else {
        return Err(SourceError::Malformed(
            "frame has neither result nor error".to_string(),
        ));
    };

    let r_hash = decode_bytes(&invoice.r_hash)?;
    debug!(r_hash = %hex::encode(&r_hash), settled = invoice.settled, "Parsed invoice record");

    Ok(RawInvoice {
        r_hash,
        value: invoice.value,
        memo: invoice.memo,
        settled: invoice.settled,
        settle_date: invoice.settle_date,
        creation_date: invoice.creation_date,
    })
}

fn decode_bytes(encoded: &str) -> Result<Vec<u8>, SourceError> {
    STANDARD
        .decode(encoded)
        .or_else(|_| URL_SAFE.decode(encoded))
        .map_err(|e| SourceError::Malformed(format!("invalid base64 bytes field: {e}")))
}

/// Accept an `int64` rendered either as a JSON number or a JSON string.
fn de_int64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Number(i64),
        Text(String),
    }

    match Int64::deserialize(deserializer)? {
        Int64::Number(n) => Ok(n),
        Int64::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
