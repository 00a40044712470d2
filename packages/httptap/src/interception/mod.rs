// packages/httptap/src/interception/mod.rs
//! Request interception layer
//!
//! This module replaces the real HTTP transport with a recording double:
//!
//! - **Transport**: the plug-in point clients send requests through
//! - **HTTP Interceptor**: resolves requests against registered expectations
//! - **Routing Table**: (method, URL) to response strategy mapping
//! - **Response**: canned responses, handlers and pass-through markers
//!
//! # Architecture
//!
//! ```text
//! Client Code (Unmodified)
//!     │
//!     └─ Request → Interceptor ─┬─ Fixed / Handler → synthesized response (logged)
//!                               ├─ Unmatched       → 404 or UnregisteredRoute (logged)
//!                               └─ PassThrough     → real transport (not logged)
//! ```

pub mod http_interceptor;
pub mod response;
pub mod routing_table;
pub mod transport;

// Re-export commonly used types
pub use http_interceptor::Interceptor;
pub use response::{CannedResponse, OriginRequest, ResponseHandler, ResponseStrategy};
pub use routing_table::{Binder, ExpectationKey, RegistrationTable};
pub use transport::{HyperTransport, Transport};
