//! Configuration and shared utilities for the userpool client.
//!
//! This crate provides:
//! - Configuration loading with fail-fast validation of the pool and
//!   client identifiers
//! - File system paths for runtime files (`~/.userpool`)
//! - Logging initialization built on `tracing-subscriber`

mod config;
mod error;
mod logging;
mod paths;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use logging::init_logging;
pub use paths::Paths;
