//! Async RedisBloom client.
//!
//! This module provides the primary client. Every method builds its
//! arguments, checks a connection out of the pool, sends exactly one
//! command, decodes the reply and returns the connection, whatever the
//! outcome. Arguments that fail validation never reach the pool.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;

use crate::commands::{bloom, cms, cuckoo, exec, tdigest, topk};
use crate::connection::ConnectionConfig;
use crate::error::Result;
use crate::pool::{Pool, PoolConfig};
use crate::reply;
use crate::types::{Chunk, TDigestInfo, ToArg, Value};

/// An asynchronous RedisBloom client.
///
/// Wraps a connection pool and exposes one async method per engine
/// operation. The client is `Send + Sync`; share it behind an [`Arc`] or
/// build several clients over one pool with [`AsyncClient::from_pool`].
///
/// # Examples
///
/// ```ignore
/// use redisbloom::AsyncClient;
///
/// let client = AsyncClient::connect("127.0.0.1", 6379).await?;
/// client.bf_reserve("seen", 0.01, 10_000).await?;
/// let added = client.bf_add_multi("seen", &["a", "b", "c"]).await?;
/// ```
pub struct AsyncClient {
    pool: Arc<Pool>,
    name: Option<String>,
}

impl AsyncClient {
    /// Connect to a server with default settings.
    pub async fn connect(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::connect_with(ConnectionConfig::from_addr(host, port)).await
    }

    /// Connect using a full [`ConnectionConfig`].
    pub async fn connect_with(config: ConnectionConfig) -> Result<Self> {
        Self::connect_pooled(PoolConfig {
            connection: config,
            ..Default::default()
        })
        .await
    }

    /// Connect using a full [`PoolConfig`] with custom pool settings.
    pub async fn connect_pooled(config: PoolConfig) -> Result<Self> {
        let name = config.connection.client_name.clone();
        Ok(Self {
            pool: Arc::new(Pool::new(config)),
            name,
        })
    }

    /// Build a client from a `host:port` address, a client name and an
    /// optional password. Connections are dialed on first use.
    pub fn new(addr: &str, name: impl Into<String>, password: Option<&str>) -> Result<Self> {
        let mut config = ConnectionConfig::parse_addr(addr)?.with_client_name(name);
        config.password = password.map(str::to_string);
        Ok(Self {
            name: config.client_name.clone(),
            pool: Arc::new(Pool::new(PoolConfig {
                connection: config,
                ..Default::default()
            })),
        })
    }

    /// Build a client over an existing pool. Several clients may share one
    /// pool; `name` identifies this client to its owner only, connections
    /// keep the name configured on the pool.
    pub fn from_pool(pool: Arc<Pool>, name: impl Into<String>) -> Self {
        Self {
            pool,
            name: Some(name.into()),
        }
    }

    /// The client name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The pool backing this client.
    pub fn pool(&self) -> &Arc<Pool> {
        &self.pool
    }

    /// Check out a connection and send arguments that are already built.
    async fn send(&self, args: Vec<Bytes>) -> Result<Value> {
        let mut conn = self.pool.get().await?;
        exec(conn.conn(), args).await
    }

    // ── Bloom filter ────────────────────────────────────────────────────

    /// BF.RESERVE key error_rate capacity: create an empty filter.
    pub async fn bf_reserve(&self, key: impl ToArg, error_rate: f64, capacity: u64) -> Result<()> {
        self.bf_reserve_with(key, error_rate, capacity, &bloom::ReserveOptions::default())
            .await
    }

    /// BF.RESERVE with `EXPANSION` / `NONSCALING`.
    pub async fn bf_reserve_with(
        &self,
        key: impl ToArg,
        error_rate: f64,
        capacity: u64,
        options: &bloom::ReserveOptions,
    ) -> Result<()> {
        let mut conn = self.pool.get().await?;
        bloom::reserve(conn.conn(), key, error_rate, capacity, options).await
    }

    /// BF.ADD key item: `true` if the item was not present before.
    pub async fn bf_add(&self, key: impl ToArg, item: impl ToArg) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        bloom::add(conn.conn(), key, item).await
    }

    /// BF.EXISTS key item: `true` if the item may be present.
    pub async fn bf_exists(&self, key: impl ToArg, item: impl ToArg) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        bloom::exists(conn.conn(), key, item).await
    }

    /// BF.MADD key item [item ...]: `result[i]` is `true` if `items[i]` was
    /// not present before.
    pub async fn bf_add_multi(&self, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<bool>> {
        let args = bloom::encode_madd(key, items)?;
        bloom::decode_added_each(self.send(args).await?)
    }

    /// BF.MEXISTS key item [item ...]: `result[i]` is `true` if `items[i]`
    /// may be present.
    pub async fn bf_exists_multi(&self, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<bool>> {
        let args = bloom::encode_mexists(key, items)?;
        bloom::decode_present_each(self.send(args).await?)
    }

    /// BF.INSERT key [options] ITEMS item [item ...].
    pub async fn bf_insert(
        &self,
        key: impl ToArg,
        options: &bloom::InsertOptions,
        items: &[impl ToArg],
    ) -> Result<Vec<i64>> {
        let args = bloom::encode_insert(key, options, items)?;
        reply::integers(self.send(args).await?)
    }

    /// BF.INFO key.
    pub async fn bf_info(&self, key: impl ToArg) -> Result<HashMap<String, i64>> {
        let mut conn = self.pool.get().await?;
        bloom::info(conn.conn(), key).await
    }

    /// BF.SCANDUMP key iterator: start with `0`, stop when `0` comes back.
    pub async fn bf_scan_dump(&self, key: impl ToArg, iterator: i64) -> Result<(i64, Bytes)> {
        let mut conn = self.pool.get().await?;
        bloom::scandump(conn.conn(), key, iterator).await
    }

    /// BF.LOADCHUNK key iterator data: replay chunks in dump order.
    pub async fn bf_load_chunk(&self, key: impl ToArg, iterator: i64, data: impl ToArg) -> Result<()> {
        let mut conn = self.pool.get().await?;
        bloom::loadchunk(conn.conn(), key, iterator, data).await
    }

    /// Export a whole filter by running the scan-dump loop to completion.
    ///
    /// The key must not be modified while the dump is in progress.
    pub async fn bf_dump(&self, key: impl ToArg) -> Result<Vec<Chunk>> {
        let key = key.to_arg();
        let mut chunks = Vec::new();
        let mut iterator = 0;
        loop {
            let (next, data) = self.bf_scan_dump(key.clone(), iterator).await?;
            if next == 0 {
                break;
            }
            chunks.push(Chunk::new(next, data));
            iterator = next;
        }
        Ok(chunks)
    }

    /// Rebuild a filter from chunks produced by [`AsyncClient::bf_dump`].
    /// Stops at the first failure, leaving the key partially loaded.
    pub async fn bf_restore(&self, key: impl ToArg, chunks: &[Chunk]) -> Result<()> {
        let key = key.to_arg();
        for chunk in chunks {
            self.bf_load_chunk(key.clone(), chunk.iterator, chunk.data.clone())
                .await?;
        }
        Ok(())
    }

    // ── Cuckoo filter ───────────────────────────────────────────────────

    /// CF.RESERVE key capacity.
    pub async fn cf_reserve(&self, key: impl ToArg, capacity: u64) -> Result<()> {
        self.cf_reserve_with(key, capacity, &cuckoo::ReserveOptions::default())
            .await
    }

    /// CF.RESERVE with `BUCKETSIZE` / `MAXITERATIONS` / `EXPANSION`.
    pub async fn cf_reserve_with(
        &self,
        key: impl ToArg,
        capacity: u64,
        options: &cuckoo::ReserveOptions,
    ) -> Result<()> {
        let mut conn = self.pool.get().await?;
        cuckoo::reserve(conn.conn(), key, capacity, options).await
    }

    /// CF.ADD key item.
    pub async fn cf_add(&self, key: impl ToArg, item: impl ToArg) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        cuckoo::add(conn.conn(), key, item).await
    }

    /// CF.ADDNX key item: `false` if the item may already be present.
    pub async fn cf_add_nx(&self, key: impl ToArg, item: impl ToArg) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        cuckoo::addnx(conn.conn(), key, item).await
    }

    /// CF.INSERT key [options] ITEMS item [item ...].
    pub async fn cf_insert(
        &self,
        key: impl ToArg,
        options: &cuckoo::InsertOptions,
        items: &[impl ToArg],
    ) -> Result<Vec<i64>> {
        let args = cuckoo::encode_insert("CF.INSERT", key, options, items)?;
        reply::integers(self.send(args).await?)
    }

    /// CF.INSERTNX key [options] ITEMS item [item ...].
    pub async fn cf_insert_nx(
        &self,
        key: impl ToArg,
        options: &cuckoo::InsertOptions,
        items: &[impl ToArg],
    ) -> Result<Vec<i64>> {
        let args = cuckoo::encode_insert("CF.INSERTNX", key, options, items)?;
        reply::integers(self.send(args).await?)
    }

    /// CF.EXISTS key item.
    pub async fn cf_exists(&self, key: impl ToArg, item: impl ToArg) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        cuckoo::exists(conn.conn(), key, item).await
    }

    /// CF.DEL key item: `true` if an item was deleted.
    pub async fn cf_del(&self, key: impl ToArg, item: impl ToArg) -> Result<bool> {
        let mut conn = self.pool.get().await?;
        cuckoo::del(conn.conn(), key, item).await
    }

    /// CF.COUNT key item.
    pub async fn cf_count(&self, key: impl ToArg, item: impl ToArg) -> Result<i64> {
        let mut conn = self.pool.get().await?;
        cuckoo::count(conn.conn(), key, item).await
    }

    /// CF.SCANDUMP key iterator.
    pub async fn cf_scan_dump(&self, key: impl ToArg, iterator: i64) -> Result<(i64, Bytes)> {
        let mut conn = self.pool.get().await?;
        cuckoo::scandump(conn.conn(), key, iterator).await
    }

    /// CF.LOADCHUNK key iterator data.
    pub async fn cf_load_chunk(&self, key: impl ToArg, iterator: i64, data: impl ToArg) -> Result<()> {
        let mut conn = self.pool.get().await?;
        cuckoo::loadchunk(conn.conn(), key, iterator, data).await
    }

    /// CF.INFO key.
    pub async fn cf_info(&self, key: impl ToArg) -> Result<HashMap<String, i64>> {
        let mut conn = self.pool.get().await?;
        cuckoo::info(conn.conn(), key).await
    }

    /// Export a whole cuckoo filter; see [`AsyncClient::bf_dump`].
    pub async fn cf_dump(&self, key: impl ToArg) -> Result<Vec<Chunk>> {
        let key = key.to_arg();
        let mut chunks = Vec::new();
        let mut iterator = 0;
        loop {
            let (next, data) = self.cf_scan_dump(key.clone(), iterator).await?;
            if next == 0 {
                break;
            }
            chunks.push(Chunk::new(next, data));
            iterator = next;
        }
        Ok(chunks)
    }

    /// Rebuild a cuckoo filter from chunks produced by [`AsyncClient::cf_dump`].
    pub async fn cf_restore(&self, key: impl ToArg, chunks: &[Chunk]) -> Result<()> {
        let key = key.to_arg();
        for chunk in chunks {
            self.cf_load_chunk(key.clone(), chunk.iterator, chunk.data.clone())
                .await?;
        }
        Ok(())
    }

    // ── Count-Min Sketch ────────────────────────────────────────────────

    /// CMS.INITBYDIM key width depth.
    pub async fn cms_init_by_dim(&self, key: impl ToArg, width: u64, depth: u64) -> Result<()> {
        let mut conn = self.pool.get().await?;
        cms::init_by_dim(conn.conn(), key, width, depth).await
    }

    /// CMS.INITBYPROB key error probability.
    pub async fn cms_init_by_prob(&self, key: impl ToArg, error: f64, probability: f64) -> Result<()> {
        let mut conn = self.pool.get().await?;
        cms::init_by_prob(conn.conn(), key, error, probability).await
    }

    /// CMS.INCRBY key item increment [item increment ...]: `result[i]` is the
    /// new count of `increments[i]`.
    pub async fn cms_incr_by(&self, key: impl ToArg, increments: &[(impl ToArg, i64)]) -> Result<Vec<i64>> {
        let args = cms::encode_incrby(key, increments)?;
        reply::integers(self.send(args).await?)
    }

    /// CMS.QUERY key item [item ...].
    pub async fn cms_query(&self, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<i64>> {
        let args = cms::encode_query(key, items)?;
        reply::integers(self.send(args).await?)
    }

    /// CMS.MERGE dest numKeys src [src ...] [WEIGHTS w [w ...]].
    ///
    /// Fails with [`Error::InvalidArgument`](crate::Error::InvalidArgument),
    /// before touching the network, if `weights` is not one per source.
    pub async fn cms_merge(
        &self,
        dest: impl ToArg,
        sources: &[impl ToArg],
        weights: Option<&[i64]>,
    ) -> Result<()> {
        let args = cms::encode_merge(dest, sources, weights)?;
        reply::ok(self.send(args).await?)
    }

    /// CMS.INFO key.
    pub async fn cms_info(&self, key: impl ToArg) -> Result<HashMap<String, i64>> {
        let mut conn = self.pool.get().await?;
        cms::info(conn.conn(), key).await
    }

    // ── Top-K ───────────────────────────────────────────────────────────

    /// TOPK.RESERVE key k width depth decay.
    pub async fn topk_reserve(
        &self,
        key: impl ToArg,
        k: u64,
        width: u64,
        depth: u64,
        decay: f64,
    ) -> Result<()> {
        let mut conn = self.pool.get().await?;
        topk::reserve(conn.conn(), key, k, width, depth, decay).await
    }

    /// TOPK.ADD key item [item ...]: items expelled from the list, per input.
    pub async fn topk_add(&self, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<Option<String>>> {
        let args = topk::encode_add(key, items)?;
        reply::optional_strings(self.send(args).await?)
    }

    /// TOPK.INCRBY key item increment [item increment ...].
    pub async fn topk_incr_by(
        &self,
        key: impl ToArg,
        increments: &[(impl ToArg, i64)],
    ) -> Result<Vec<Option<String>>> {
        let args = topk::encode_incrby(key, increments)?;
        reply::optional_strings(self.send(args).await?)
    }

    /// TOPK.QUERY key item [item ...].
    pub async fn topk_query(&self, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<i64>> {
        let args = topk::encode_query(key, items)?;
        reply::integers(self.send(args).await?)
    }

    /// TOPK.COUNT key item [item ...].
    pub async fn topk_count(&self, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<i64>> {
        let args = topk::encode_count(key, items)?;
        reply::integers(self.send(args).await?)
    }

    /// TOPK.LIST key: most frequent first.
    pub async fn topk_list(&self, key: impl ToArg) -> Result<Vec<String>> {
        let mut conn = self.pool.get().await?;
        topk::list(conn.conn(), key).await
    }

    /// TOPK.LIST key WITHCOUNT: iteration order is rank order.
    pub async fn topk_list_with_count(&self, key: impl ToArg) -> Result<IndexMap<String, i64>> {
        let mut conn = self.pool.get().await?;
        topk::list_with_count(conn.conn(), key).await
    }

    /// TOPK.INFO key.
    pub async fn topk_info(&self, key: impl ToArg) -> Result<HashMap<String, String>> {
        let mut conn = self.pool.get().await?;
        topk::info(conn.conn(), key).await
    }

    // ── T-Digest ────────────────────────────────────────────────────────

    /// TDIGEST.CREATE key compression.
    pub async fn td_create(&self, key: impl ToArg, compression: u64) -> Result<()> {
        let mut conn = self.pool.get().await?;
        tdigest::create(conn.conn(), key, compression).await
    }

    /// TDIGEST.RESET key.
    pub async fn td_reset(&self, key: impl ToArg) -> Result<()> {
        let mut conn = self.pool.get().await?;
        tdigest::reset(conn.conn(), key).await
    }

    /// TDIGEST.ADD key value weight [value weight ...].
    pub async fn td_add(&self, key: impl ToArg, samples: &[(f64, f64)]) -> Result<()> {
        let args = tdigest::encode_add(key, samples)?;
        reply::ok(self.send(args).await?)
    }

    /// TDIGEST.MERGE to-key from-key.
    pub async fn td_merge(&self, to_key: impl ToArg, from_key: impl ToArg) -> Result<()> {
        let mut conn = self.pool.get().await?;
        tdigest::merge(conn.conn(), to_key, from_key).await
    }

    /// TDIGEST.MIN key.
    pub async fn td_min(&self, key: impl ToArg) -> Result<f64> {
        let mut conn = self.pool.get().await?;
        tdigest::min(conn.conn(), key).await
    }

    /// TDIGEST.MAX key.
    pub async fn td_max(&self, key: impl ToArg) -> Result<f64> {
        let mut conn = self.pool.get().await?;
        tdigest::max(conn.conn(), key).await
    }

    /// TDIGEST.QUANTILE key quantile.
    pub async fn td_quantile(&self, key: impl ToArg, quantile: f64) -> Result<f64> {
        let mut conn = self.pool.get().await?;
        tdigest::quantile(conn.conn(), key, quantile).await
    }

    /// TDIGEST.CDF key value.
    pub async fn td_cdf(&self, key: impl ToArg, value: f64) -> Result<f64> {
        let mut conn = self.pool.get().await?;
        tdigest::cdf(conn.conn(), key, value).await
    }

    /// TDIGEST.INFO key.
    pub async fn td_info(&self, key: impl ToArg) -> Result<TDigestInfo> {
        let mut conn = self.pool.get().await?;
        tdigest::info(conn.conn(), key).await
    }

    // ── Server ──────────────────────────────────────────────────────────

    /// FLUSHALL: remove every key on the server.
    pub async fn flush_all(&self) -> Result<()> {
        reply::ok(self.send(vec![Bytes::from("FLUSHALL")]).await?)
    }

    /// Execute an arbitrary command with raw arguments.
    ///
    /// Useful for commands not covered by the typed API. An error reply is
    /// returned as [`Error::Server`](crate::Error::Server).
    ///
    /// # Examples
    ///
    /// ```ignore
    /// client.execute(&["SET", "string_key", "value"]).await?;
    /// ```
    pub async fn execute(&self, args: &[impl ToArg]) -> Result<Value> {
        let raw: Vec<Bytes> = args.iter().map(|a| a.to_arg()).collect();
        let mut conn = self.pool.get().await?;
        conn.conn().execute(&raw).await?.into_result()
    }

    /// Close the underlying pool. Every client sharing it stops working.
    pub fn close(&self) {
        self.pool.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_client_is_send_sync() {
        assert_send_sync::<AsyncClient>();
    }

    #[test]
    fn test_new_parses_address_lazily() {
        let client = AsyncClient::new("db.internal:6390", "reporting", Some("pw")).unwrap();
        assert_eq!(client.name(), Some("reporting"));
        assert_eq!(client.pool().idle_count(), 0);
        assert!(AsyncClient::new("db.internal:nope", "c", None).is_err());
    }
}
