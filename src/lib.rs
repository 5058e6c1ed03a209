//! # redisbloom
//!
//! An async Rust client for the probabilistic data structures of a
//! RedisBloom-enabled server: Bloom filters, Cuckoo filters, Count-Min
//! Sketches, Top-K and T-Digest.
//!
//! ## Quick Start
//!
//! ```no_run
//! use redisbloom::AsyncClient;
//!
//! #[tokio::main]
//! async fn main() -> redisbloom::Result<()> {
//!     let client = AsyncClient::connect("127.0.0.1", 6379).await?;
//!
//!     client.bf_reserve("visitors", 0.01, 10_000).await?;
//!     client.bf_add("visitors", "alice").await?;
//!     assert!(client.bf_exists("visitors", "alice").await?);
//!
//!     client.cms_init_by_dim("hits", 2000, 5).await?;
//!     let counts = client.cms_incr_by("hits", &[("/", 3), ("/about", 1)]).await?;
//!     assert_eq!(counts.len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Connection Pooling
//!
//! Every client owns (or shares) a [`Pool`]. Each operation checks out one
//! connection, sends one command, reads one reply and returns the
//! connection, including when the call fails.
//!
//! ```no_run
//! use std::sync::Arc;
//! use redisbloom::{AsyncClient, ConnectionConfig, Pool, PoolConfig};
//!
//! # async fn example() -> redisbloom::Result<()> {
//! let pool = Arc::new(Pool::new(PoolConfig {
//!     connection: ConnectionConfig::from_url("redis://:secret@10.0.0.5:6379/0")?,
//!     max_size: 16,
//!     ..Default::default()
//! }));
//! let ingest = AsyncClient::from_pool(pool.clone(), "ingest");
//! let report = AsyncClient::from_pool(pool, "report");
//! # Ok(())
//! # }
//! ```
//!
//! ## Blocking API
//!
//! [`Client`] wraps [`AsyncClient`] with its own runtime for callers that
//! are not async.

pub mod async_client;
pub mod client;
pub mod commands;
pub mod connection;
pub mod error;
pub mod pool;
pub mod resp;
pub mod types;

mod reply;

pub use async_client::AsyncClient;
pub use client::Client;
pub use commands::bloom::{InsertOptions as BloomInsertOptions, ReserveOptions as BloomReserveOptions};
pub use commands::cuckoo::{
    InsertOptions as CuckooInsertOptions, ReserveOptions as CuckooReserveOptions,
};
pub use commands::unset_if_negative;
pub use connection::ConnectionConfig;
pub use error::{Error, Result, ValueKind};
pub use indexmap::IndexMap;
pub use pool::{Pool, PoolConfig};
pub use types::{Chunk, TDigestInfo, ToArg, Value};
