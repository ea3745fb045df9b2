//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (exact path lookup, default on miss)
//!     → handler(Request, Capabilities)
//!     → Response, or a 500 built from the failure
//!
//! Route Registration (at startup):
//!     handlers::register(builder, config)
//!     → Freeze as immutable Dispatcher
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Exact match only; a lookup table instead of nested conditionals
//! - Deterministic: same path always reaches the same handler

pub mod router;

pub use router::{handler, Dispatcher, DispatcherBuilder, HandlerFn, HandlerFuture};
