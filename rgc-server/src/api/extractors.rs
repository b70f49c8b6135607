//! Custom Axum extractor for request authentication.
//!
//! `SignedBody<T>` verifies the `X-RG-Timestamp` / `X-RG-Signature` header
//! pair against the raw request body, then deserializes the JSON payload.
//!
//! The MAC covers the exact bytes on the wire, so the body is read and
//! verified before any JSON parsing happens; re-serialized JSON would
//! defeat the signature. All cryptographic operations are delegated to
//! [`rgc_sdk::signature`].

use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use compact_str::CompactString;
use rgc_sdk::objects::ErrorBody;
use rgc_sdk::signature::{self, SIGNATURE_HEADER, SignatureError, TIMESTAMP_HEADER};
use serde::de::DeserializeOwned;

use crate::state::AppState;

/// Maximum accepted body size (1 MiB).
const BODY_LIMIT: usize = 1024 * 1024;

/// An Axum extractor that authenticates and deserializes the request body.
///
/// # Header format
///
/// ```text
/// X-RG-Timestamp: {unix_milliseconds}
/// X-RG-Signature: {lowercase_hex_hmac_sha256}
/// ```
///
/// The signature is `HMAC-SHA256("{timestamp}.{body}", shared_secret)`.
#[derive(Debug)]
pub struct SignedBody<T>(pub T);

/// Errors that can occur during signed-body verification.
#[derive(Debug)]
pub enum SignedBodyError {
    /// Authentication failed; maps to 401 with the verifier's reason code.
    Signature(SignatureError),
    /// The request body could not be read.
    BodyRead,
    /// The body authenticated but is not valid JSON for the target type.
    Json(serde_json::Error),
}

impl From<SignatureError> for SignedBodyError {
    fn from(err: SignatureError) -> Self {
        Self::Signature(err)
    }
}

impl IntoResponse for SignedBodyError {
    fn into_response(self) -> Response {
        let (status, reason, message) = match &self {
            SignedBodyError::Signature(e) => {
                (StatusCode::UNAUTHORIZED, e.reason(), e.to_string())
            }
            SignedBodyError::BodyRead => (
                StatusCode::BAD_REQUEST,
                "body_read",
                "failed to read request body".to_owned(),
            ),
            SignedBodyError::Json(_) => (
                StatusCode::BAD_REQUEST,
                "invalid_payload",
                "invalid JSON body".to_owned(),
            ),
        };
        (
            status,
            Json(ErrorBody {
                reason: CompactString::const_new(reason),
                message,
                request_id: None,
                order_id: None,
            }),
        )
            .into_response()
    }
}

impl<T: DeserializeOwned + Send> FromRequest<AppState> for SignedBody<T> {
    type Rejection = SignedBodyError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let headers = req.headers();
        let (Some(timestamp_value), Some(signature_value)) =
            (headers.get(TIMESTAMP_HEADER), headers.get(SIGNATURE_HEADER))
        else {
            return Err(SignatureError::MissingHeaders.into());
        };

        let timestamp_ms = timestamp_value
            .to_str()
            .map_err(|_| SignatureError::BadTimestamp)
            .and_then(signature::parse_timestamp)?;
        let signature_hex = signature_value
            .to_str()
            .map_err(|_| SignatureError::BadSignature)?
            .to_owned();

        let body: Bytes = axum::body::to_bytes(req.into_body(), BODY_LIMIT)
            .await
            .map_err(|_| SignedBodyError::BodyRead)?;

        signature::verify(
            state.config.signing.secret_bytes(),
            timestamp_ms,
            &body,
            &signature_hex,
            state.config.signing.max_skew_ms,
        )?;

        let payload = serde_json::from_slice(&body).map_err(SignedBodyError::Json)?;
        Ok(SignedBody(payload))
    }
}
