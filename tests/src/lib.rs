//! # Gateway Test Suite
//!
//! End-to-end tests that boot the real axum server on an ephemeral port and
//! talk to it over WebSocket and HTTP.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs        # Server + client fixtures
//!     ├── subscriptions.rs  # subscribe / push / unsubscribe flows
//!     ├── protocol.rs       # malformed input, batches, limits
//!     └── http.rs           # health and metrics endpoints
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gateway-tests
//! cargo bench -p gateway-tests
//! ```

pub mod integration;
