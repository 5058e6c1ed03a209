//! Connection pooling.
//!
//! A small, thread-safe pool of connections with a bounded number of
//! concurrent checkouts. Connections are dialed lazily, returned on drop and
//! discarded instead of reused once they have seen a transport error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::connection::{Connection, ConnectionConfig};
use crate::error::{Error, Result};

/// Configuration for the connection pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Connection settings for each pooled connection.
    pub connection: ConnectionConfig,
    /// Maximum number of connections checked out at the same time.
    pub max_size: usize,
    /// How long `get` waits for a free slot. `None` waits indefinitely;
    /// on expiry [`Error::PoolExhausted`] is returned.
    pub checkout_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            max_size: 8,
            checkout_timeout: None,
        }
    }
}

/// A pool of reusable connections.
///
/// The pool lazily creates connections up to `max_size` and hands them out
/// through a semaphore-guarded checkout. Wrap it in an [`Arc`] to share it
/// between several clients.
pub struct Pool {
    config: ConnectionConfig,
    connections: parking_lot::Mutex<Vec<Connection>>,
    semaphore: Arc<Semaphore>,
    max_size: usize,
    checkout_timeout: Option<Duration>,
    closed: AtomicBool,
}

impl Pool {
    /// Create a new connection pool with the given configuration.
    pub fn new(config: PoolConfig) -> Self {
        let max_size = config.max_size.max(1);
        Self {
            config: config.connection,
            connections: parking_lot::Mutex::new(Vec::with_capacity(max_size)),
            semaphore: Arc::new(Semaphore::new(max_size)),
            max_size,
            checkout_timeout: config.checkout_timeout,
            closed: AtomicBool::new(false),
        }
    }

    /// Get a connection from the pool.
    ///
    /// If an idle connection is available it is returned immediately.
    /// Otherwise a new connection is dialed, as long as fewer than `max_size`
    /// connections are checked out; beyond that the call waits for a release.
    pub async fn get(&self) -> Result<PooledConnection<'_>> {
        let permit = self.acquire_permit().await?;

        let conn = { self.connections.lock().pop() };
        let conn = match conn {
            Some(c) => c,
            None => {
                debug!(host = %self.config.host, port = self.config.port, "dialing pooled connection");
                Connection::connect(&self.config).await?
            }
        };

        Ok(PooledConnection {
            conn: Some(conn),
            pool: self,
            _permit: permit,
        })
    }

    async fn acquire_permit(&self) -> Result<OwnedSemaphorePermit> {
        let acquire = self.semaphore.clone().acquire_owned();
        let permit = match self.checkout_timeout {
            Some(limit) => tokio::time::timeout(limit, acquire)
                .await
                .map_err(|_| Error::PoolExhausted {
                    max_size: self.max_size,
                })?,
            None => acquire.await,
        };
        permit.map_err(|_| Error::PoolClosed)
    }

    /// Return a connection to the pool for reuse.
    fn put_back(&self, conn: Connection) {
        if conn.is_broken() {
            debug!("discarding broken connection");
            return;
        }
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        self.connections.lock().push(conn);
    }

    /// Close the pool: idle connections are dropped and further checkouts fail
    /// with [`Error::PoolClosed`]. Connections still checked out are dropped
    /// when they are released.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.semaphore.close();
        self.connections.lock().clear();
        debug!("pool closed");
    }

    /// Returns `true` once [`Pool::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Current number of idle connections sitting in the pool.
    pub fn idle_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Maximum number of concurrent checkouts.
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

/// A connection checked out from the pool.
///
/// When dropped, the connection is returned to the pool automatically, on
/// every exit path of the caller.
pub struct PooledConnection<'a> {
    conn: Option<Connection>,
    pool: &'a Pool,
    _permit: OwnedSemaphorePermit,
}

impl<'a> std::fmt::Debug for PooledConnection<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection").finish_non_exhaustive()
    }
}

impl<'a> PooledConnection<'a> {
    /// Access the underlying connection.
    pub fn conn(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("connection taken")
    }
}

impl<'a> Drop for PooledConnection<'a> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.put_back(conn);
        }
    }
}

impl<'a> std::ops::Deref for PooledConnection<'a> {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect("connection taken")
    }
}

impl<'a> std::ops::DerefMut for PooledConnection<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect("connection taken")
    }
}
