// packages/httptap/src/utils/mod.rs
//! Common utilities
//!
//! - **errors**: crate error type and `Result` alias
//! - **config**: interceptor configuration

pub mod config;
pub mod errors;

pub use config::{InterceptorConfig, UnmatchedPolicy};
pub use errors::{BoxError, Result, TapError};
