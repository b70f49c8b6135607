//! Request signing and verification for the `/checkout` endpoint.
//!
//! Every checkout submission carries two headers:
//!
//! ```text
//! X-RG-Timestamp: {unix_milliseconds}
//! X-RG-Signature: {lowercase_hex_hmac}
//! ```
//!
//! The signature is `HMAC-SHA256("{timestamp_ms}.{raw_body}", secret)`
//! rendered as lowercase hex. The MAC covers the exact body bytes the client
//! sent; the server must verify before any JSON parsing touches the body.

/// Header carrying the signing timestamp (decimal milliseconds since epoch).
pub const TIMESTAMP_HEADER: &str = "X-RG-Timestamp";

/// Header carrying the lowercase hex HMAC-SHA256 signature.
pub const SIGNATURE_HEADER: &str = "X-RG-Signature";

/// Default maximum allowed clock skew between client and server (5 minutes).
pub const DEFAULT_MAX_SKEW_MS: i64 = 5 * 60 * 1000;

/// Errors produced by signature verification.
///
/// [`SignatureError::reason`] yields the stable machine-readable code used
/// in error responses. The expected signature value is never included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("missing signature headers")]
    MissingHeaders,
    #[error("timestamp header is not a decimal integer")]
    BadTimestamp,
    #[error("timestamp outside the allowed skew window")]
    TimestampSkew,
    #[error("signature verification failed")]
    BadSignature,
}

impl SignatureError {
    /// Stable reason code for error responses.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingHeaders => "missing_headers",
            Self::BadTimestamp => "bad_timestamp",
            Self::TimestampSkew => "timestamp_skew",
            Self::BadSignature => "bad_signature",
        }
    }
}

/// Compute the signature for a body at the given timestamp, as lowercase hex.
pub fn sign(secret: &[u8], timestamp_ms: i64, raw_body: &[u8]) -> String {
    let key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret);
    let mut data = Vec::with_capacity(24 + raw_body.len());
    data.extend_from_slice(timestamp_ms.to_string().as_bytes());
    data.push(b'.');
    data.extend_from_slice(raw_body);
    hex::encode(ring::hmac::sign(&key, &data).as_ref())
}

/// Parse the `X-RG-Timestamp` header value.
pub fn parse_timestamp(value: &str) -> Result<i64, SignatureError> {
    value.trim().parse().map_err(|_| SignatureError::BadTimestamp)
}

/// Verify a signature against the current wall clock.
pub fn verify(
    secret: &[u8],
    timestamp_ms: i64,
    raw_body: &[u8],
    signature_hex: &str,
    max_skew_ms: i64,
) -> Result<(), SignatureError> {
    verify_at(secret, timestamp_ms, raw_body, signature_hex, max_skew_ms, now_ms())
}

/// Verify a signature against an explicit `now`, in milliseconds.
///
/// The MAC comparison is delegated to [`ring::hmac::verify`], which is
/// constant-time. Hex decoding failures report [`SignatureError::BadSignature`]
/// without distinguishing malformed from mismatched input.
pub fn verify_at(
    secret: &[u8],
    timestamp_ms: i64,
    raw_body: &[u8],
    signature_hex: &str,
    max_skew_ms: i64,
    now_ms: i64,
) -> Result<(), SignatureError> {
    let provided = hex::decode(signature_hex).map_err(|_| SignatureError::BadSignature)?;

    let key = ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret);
    let mut data = Vec::with_capacity(24 + raw_body.len());
    data.extend_from_slice(timestamp_ms.to_string().as_bytes());
    data.push(b'.');
    data.extend_from_slice(raw_body);
    ring::hmac::verify(&key, &data, &provided).map_err(|_| SignatureError::BadSignature)?;

    check_skew(timestamp_ms, now_ms, max_skew_ms)
}

/// Check that a timestamp is within `max_skew_ms` of `now_ms`, in either
/// direction. Exactly at the bound passes.
pub fn check_skew(timestamp_ms: i64, now_ms: i64, max_skew_ms: i64) -> Result<(), SignatureError> {
    if (now_ms - timestamp_ms).abs() > max_skew_ms {
        return Err(SignatureError::TimestampSkew);
    }
    Ok(())
}

/// Current wall clock in unix milliseconds.
pub fn now_ms() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
