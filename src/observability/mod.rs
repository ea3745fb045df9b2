//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Host adapter and connectors produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows from the host adapter into every log line of a request
//! - The dispatcher stays silent; its caller logs the outcome

pub mod logging;
pub mod metrics;
