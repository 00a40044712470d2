// packages/httptap/src/body.rs
//! Body type shared by every transport, plus small helpers to build and
//! drain it.

use crate::utils::errors::{BoxError, Result, TapError};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use std::convert::Infallible;

/// Request and response body handed across the transport boundary
pub type TransportBody = BoxBody<Bytes, BoxError>;

/// Body over a complete in-memory buffer
pub fn full(data: impl Into<Bytes>) -> TransportBody {
    Full::new(data.into())
        .map_err(|never: Infallible| match never {})
        .boxed()
}

/// Body with no content
pub fn empty() -> TransportBody {
    Empty::<Bytes>::new()
        .map_err(|never: Infallible| match never {})
        .boxed()
}

/// Drain a body into memory
pub async fn collect_bytes(body: TransportBody) -> Result<Bytes> {
    body.collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(TapError::Body)
}

/// Drain a body and decode it as UTF-8 (lossy)
pub async fn read_to_string(body: TransportBody) -> Result<String> {
    let bytes = collect_bytes(body).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
