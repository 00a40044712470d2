// packages/httptap/src/recording/mod.rs
//! Request recording
//!
//! This module keeps the record of what the interceptor answered:
//!
//! - **Request Log**: ordered, index-addressable log of intercepted requests
//! - **Exporter**: export the log to JSON or HAR for diagnostics
//!
//! Pass-through requests never reach the log.
//!
//! # Body capture
//!
//! ```text
//! intercept() → LoggedRequest { body: Pending(stream) }
//!                      │
//!        first body_bytes() drains the stream
//!                      ↓
//!               Captured(Bytes) ──→ body_text() / body_stream() (fresh cursor)
//! ```

pub mod exporter;
pub mod request_log;

// Re-export commonly used types
pub use exporter::{ExportFormat, Exporter};
pub use request_log::{LoggedRequest, RequestLog};
