//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, wire → Request)
//!     → routing::Dispatcher (handler lookup and invocation)
//!     → response.rs (Response built by the handler)
//!     → server.rs (Response → wire)
//!     → Send to client
//! ```

pub mod body;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use body::Buffer;
pub use headers::KeyValues;
pub use request::{Method, OutboundRequest, Request};
pub use response::Response;
pub use server::{HttpServer, X_REQUEST_ID};
