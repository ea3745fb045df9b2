//! Outbound connectors handed to handlers.
//!
//! # Data Flow
//! ```text
//! handler
//!     → Capabilities::http()   → http.rs  (reqwest, allowed hosts)
//!     → Capabilities::kv()     → redis.rs (GET / SET)
//!     → Capabilities::pubsub() → redis.rs (PUBLISH)
//!                                  → resp.rs (RESP2 frames over TCP)
//! ```
//!
//! # Design Decisions
//! - Connectors are addressed per call; no handle outlives a call
//! - Store and broker sit behind traits so hosts can swap backends
//! - Everything is `Send + Sync` and immutable, shared across requests

pub mod http;
pub mod redis;
pub mod resp;

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::config::TriggerConfig;
use crate::error::TriggerResult;
use crate::http::body::Buffer;

pub use self::http::OutboundHttp;
pub use self::redis::RedisConnector;

/// Key-value store addressed by connection string.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Fetch `key`; `NotFound` when absent.
    fn get<'a>(&'a self, address: &'a str, key: &'a str) -> BoxFuture<'a, TriggerResult<Buffer>>;

    /// Store `value` under `key`.
    fn set<'a>(
        &'a self,
        address: &'a str,
        key: &'a str,
        value: Buffer,
    ) -> BoxFuture<'a, TriggerResult<()>>;
}

/// Publish side of a pub/sub broker.
pub trait PubSub: Send + Sync + std::fmt::Debug {
    /// Hand `payload` to the broker. Delivery to subscribers is not reported.
    fn publish<'a>(
        &'a self,
        address: &'a str,
        channel: &'a str,
        payload: Buffer,
    ) -> BoxFuture<'a, TriggerResult<()>>;
}

/// The outbound clients a handler is allowed to use.
#[derive(Debug, Clone)]
pub struct Capabilities {
    http: OutboundHttp,
    kv: Arc<dyn KeyValueStore>,
    pubsub: Arc<dyn PubSub>,
}

impl Capabilities {
    pub fn new(http: OutboundHttp, kv: Arc<dyn KeyValueStore>, pubsub: Arc<dyn PubSub>) -> Self {
        Self { http, kv, pubsub }
    }

    /// Real connectors built from configuration.
    pub fn from_config(config: &TriggerConfig) -> TriggerResult<Self> {
        let http = OutboundHttp::new(&config.outbound, &config.timeouts)?;
        let redis = Arc::new(RedisConnector::from_config(&config.timeouts));
        Ok(Self::new(http, redis.clone(), redis))
    }

    pub fn http(&self) -> &OutboundHttp {
        &self.http
    }

    pub fn kv(&self) -> &dyn KeyValueStore {
        self.kv.as_ref()
    }

    pub fn pubsub(&self) -> &dyn PubSub {
        self.pubsub.as_ref()
    }
}
