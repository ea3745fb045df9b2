//! HTTP trigger: request dispatch and outbound connectors.

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod outbound;
pub mod resilience;
pub mod routing;

pub use config::schema::TriggerConfig;
pub use error::{TriggerError, TriggerResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::Dispatcher;
