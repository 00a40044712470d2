// packages/httptap/src/lib.rs
//! httptap: a recording test double for outbound HTTP
//!
//! An [`Interceptor`] stands in for the real transport of an HTTP client.
//! Tests register expectations keyed by method and URL, run the code under
//! test, then inspect the ordered log of intercepted requests.
//!
//! # Architecture
//!
//! The crate is structured into several key modules:
//!
//! - **interception**: transport trait, interceptor, registration table, responses
//! - **recording**: request log with re-readable bodies, JSON/HAR export
//! - **activation**: process-wide default transport swap (`start` / `end`)
//! - **client**: minimal client sending through a transport
//! - **observability**: tracing setup and metric names
//! - **utils**: errors and configuration
//!
//! # Example
//!
//! ```no_run
//! use hyper::StatusCode;
//! use httptap::{body, HttpClient};
//!
//! # async fn run() -> httptap::Result<()> {
//! let scope = httptap::start_scoped();
//! scope
//!     .when("GET", "http://example.com/")
//!     .respond(StatusCode::OK, "body", "text/plain");
//!
//! let response = HttpClient::new().get("http://example.com/").await?;
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(body::read_to_string(response.into_body()).await?, "body");
//! assert_eq!(scope.len(), 1);
//! # Ok(())
//! # }
//! ```

// Public module exports
pub mod activation;
pub mod body;
pub mod client;
pub mod interception;
pub mod observability;
pub mod recording;
pub mod utils;

// Re-export commonly used types
pub use activation::{end, start, start_scoped, start_scoped_with_config, start_with_config, InterceptScope};
pub use body::TransportBody;
pub use client::HttpClient;
pub use interception::{
    Binder, CannedResponse, ExpectationKey, HyperTransport, Interceptor, OriginRequest,
    RegistrationTable, ResponseStrategy, Transport,
};
pub use recording::{ExportFormat, LoggedRequest, RequestLog};
pub use utils::config::{InterceptorConfig, UnmatchedPolicy};
pub use utils::errors::{Result, TapError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
