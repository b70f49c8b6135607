//! Shared wire contract for the RoofGlaze checkout backend.
//!
//! This crate defines everything both sides of the `/checkout` boundary must
//! agree on: the request signing scheme ([`signature`]), the payload and
//! response shapes ([`objects`]), and — behind the `client` feature — a typed
//! HTTP client that signs and submits payloads.

pub mod objects;
pub mod signature;

#[cfg(feature = "client")]
pub mod client;
