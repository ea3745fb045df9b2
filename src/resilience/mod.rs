//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Connector call:
//!     → timeouts.rs (enforce connect/request deadline)
//!     → On expiry: typed error, mapped by the connector
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries in the core: a handler that wants them layers them itself

pub mod timeouts;
