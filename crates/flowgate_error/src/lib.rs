//! Error types for the Flowgate resilience layer.
//!
//! This crate provides the foundation error types shared by the rate limiter,
//! retry policy, embedding cache and tool bridge crates.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Retry decisions are driven by [`ErrorCode`], which any error type can
//! report through the [`RetryableError`] trait.
//!
//! # Examples
//!
//! ```
//! use flowgate_error::{ConfigError, FlowgateResult};
//!
//! fn load() -> FlowgateResult<u32> {
//!     Err(ConfigError::new("missing [retry] section"))?
//! }
//!
//! match load() {
//!     Ok(value) => println!("Got: {}", value),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod code;
mod config;
mod error;
mod provider;
mod tool;

pub use builder::{BuilderError, BuilderErrorKind};
pub use code::{ErrorCode, RetryableError};
pub use config::ConfigError;
pub use error::{FlowgateError, FlowgateErrorKind, FlowgateResult};
pub use provider::ProviderError;
pub use tool::{ToolError, ToolErrorKind};
