//! # JetBridge Test Suite
//!
//! End-to-end flows between `JetBridgeClient` and a module over the
//! in-memory client-data bus.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs     # Bus, client and hand-driven remote setup
//!     ├── flows.rs        # Text request/response correlation
//!     └── calculator.rs   # Binary opcodes against ModuleService
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p jetbridge-tests
//! cargo test -p jetbridge-tests integration::flows::
//! ```

pub mod integration;
