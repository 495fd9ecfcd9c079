//! # JetBridge Telemetry
//!
//! Structured logging setup shared by hosts embedding the client and by the
//! integration tests.
//!
//! ```rust,ignore
//! use jetbridge_telemetry::{init_tracing, TelemetryConfig};
//!
//! init_tracing(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `JB_SERVICE_NAME` | `jetbridge` | Service name attached to the startup log |
//! | `JB_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `JB_JSON_LOGS` | `false` | Emit JSON lines instead of pretty output |

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{init_test_tracing, init_tracing};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}
