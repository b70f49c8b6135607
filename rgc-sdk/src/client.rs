//! HTTP client for the checkout API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

use reqwest::StatusCode;
use url::Url;

use crate::objects::{CheckoutPayload, CheckoutResponse, ErrorBody};
use crate::signature::{self, SIGNATURE_HEADER, TIMESTAMP_HEADER};

/// Errors produced by the SDK HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request with a structured error body.
    #[error("checkout rejected: status {status}, reason {}", body.reason)]
    Rejected { status: StatusCode, body: ErrorBody },

    /// The server returned a non-2xx status with an unparseable body.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Request or response body could not be (de)serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Typed client for `POST /checkout`.
///
/// Serializes the payload once, signs those exact bytes with
/// `HMAC-SHA256("{timestamp_ms}.{body}", secret)`, and sends the same bytes
/// on the wire so the server verifies what the client signed.
#[derive(Debug, Clone)]
pub struct CheckoutClient {
    http: reqwest::Client,
    base_url: Url,
    secret: Vec<u8>,
}

impl CheckoutClient {
    /// Create a new `CheckoutClient`.
    ///
    /// * `base_url` – root URL of the checkout backend.
    /// * `secret` – the shared HMAC secret.
    pub fn new(base_url: Url, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            secret: secret.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Submit a checkout payload and return the invoice reference.
    pub async fn submit(&self, payload: &CheckoutPayload) -> Result<CheckoutResponse, ClientError> {
        let body = serde_json::to_vec(payload)?;
        let timestamp_ms = signature::now_ms();
        let sig = signature::sign(&self.secret, timestamp_ms, &body);

        let url = self.base_url.join("/checkout")?;

        let resp = self
            .http
            .post(url)
            .header(TIMESTAMP_HEADER, timestamp_ms.to_string())
            .header(SIGNATURE_HEADER, sig)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return match serde_json::from_slice::<ErrorBody>(&bytes) {
                Ok(body) => Err(ClientError::Rejected { status, body }),
                Err(_) => Err(ClientError::Api {
                    status,
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                }),
            };
        }
        serde_json::from_slice(&bytes).map_err(ClientError::Json)
    }
}
