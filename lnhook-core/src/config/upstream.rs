//! LND connection configuration.

use url::Url;

/// Connection settings for the node's REST gateway.
#[derive(Clone)]
pub struct LndConfig {
    /// Base URL of the REST gateway, e.g. `https://node.example.com:8080`.
    pub rest_url: Url,
    /// Hex-encoded macaroon sent with every request.
    pub macaroon_hex: String,
    /// PEM certificate to trust in addition to the system roots. LND nodes
    /// usually run with a self-signed `tls.cert`.
    pub tls_cert_pem: Option<Vec<u8>>,
}

impl std::fmt::Debug for LndConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LndConfig")
            .field("rest_url", &self.rest_url.as_str())
            .field("macaroon_hex", &"<redacted>")
            .field("tls_cert_pem", &self.tls_cert_pem.as_ref().map(Vec::len))
            .finish()
    }
}
