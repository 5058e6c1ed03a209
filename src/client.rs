//! Synchronous (blocking) RedisBloom client.
//!
//! This module wraps the async client in a dedicated Tokio runtime,
//! providing a blocking API suitable for scripts, tests, and non-async code.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;

use crate::async_client::AsyncClient;
use crate::commands::{bloom, cuckoo};
use crate::connection::ConnectionConfig;
use crate::error::{Error, Result};
use crate::pool::{Pool, PoolConfig};
use crate::types::{Chunk, TDigestInfo, ToArg, Value};

/// A blocking RedisBloom client.
///
/// Internally spawns a single-threaded Tokio runtime and delegates to
/// [`AsyncClient`]. Do not call it from inside an async context.
///
/// # Examples
///
/// ```ignore
/// use redisbloom::Client;
///
/// let client = Client::connect("127.0.0.1", 6379)?;
/// client.topk_reserve("trending", 3, 50, 3, 0.9)?;
/// client.topk_add("trending", &["A", "B", "C"])?;
/// println!("{:?}", client.topk_list("trending")?);
/// ```
pub struct Client {
    inner: AsyncClient,
    rt: tokio::runtime::Runtime,
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::Io)
}

impl Client {
    /// Connect to a server with default settings.
    pub fn connect(host: impl Into<String>, port: u16) -> Result<Self> {
        let rt = runtime()?;
        let inner = rt.block_on(AsyncClient::connect(host, port))?;
        Ok(Self { inner, rt })
    }

    /// Connect using a full [`ConnectionConfig`].
    pub fn connect_with(config: ConnectionConfig) -> Result<Self> {
        let rt = runtime()?;
        let inner = rt.block_on(AsyncClient::connect_with(config))?;
        Ok(Self { inner, rt })
    }

    /// Connect using a full [`PoolConfig`].
    pub fn connect_pooled(config: PoolConfig) -> Result<Self> {
        let rt = runtime()?;
        let inner = rt.block_on(AsyncClient::connect_pooled(config))?;
        Ok(Self { inner, rt })
    }

    /// See [`AsyncClient::new`].
    pub fn new(addr: &str, name: impl Into<String>, password: Option<&str>) -> Result<Self> {
        Ok(Self {
            inner: AsyncClient::new(addr, name, password)?,
            rt: runtime()?,
        })
    }

    /// See [`AsyncClient::from_pool`].
    pub fn from_pool(pool: Arc<Pool>, name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            inner: AsyncClient::from_pool(pool, name),
            rt: runtime()?,
        })
    }

    /// The client name, if any.
    pub fn name(&self) -> Option<&str> {
        self.inner.name()
    }

    /// The pool backing this client.
    pub fn pool(&self) -> &Arc<Pool> {
        self.inner.pool()
    }

    /// Close the underlying pool.
    pub fn close(&self) {
        self.inner.close();
    }

    // ── Bloom filter ────────────────────────────────────────────────────

    /// BF.RESERVE key error_rate capacity.
    pub fn bf_reserve(&self, key: impl ToArg, error_rate: f64, capacity: u64) -> Result<()> {
        self.rt.block_on(self.inner.bf_reserve(key, error_rate, capacity))
    }

    /// BF.RESERVE with options.
    pub fn bf_reserve_with(
        &self,
        key: impl ToArg,
        error_rate: f64,
        capacity: u64,
        options: &bloom::ReserveOptions,
    ) -> Result<()> {
        self.rt
            .block_on(self.inner.bf_reserve_with(key, error_rate, capacity, options))
    }

    /// BF.ADD key item.
    pub fn bf_add(&self, key: impl ToArg, item: impl ToArg) -> Result<bool> {
        self.rt.block_on(self.inner.bf_add(key, item))
    }

    /// BF.EXISTS key item.
    pub fn bf_exists(&self, key: impl ToArg, item: impl ToArg) -> Result<bool> {
        self.rt.block_on(self.inner.bf_exists(key, item))
    }

    /// BF.MADD key item [item ...].
    pub fn bf_add_multi(&self, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<bool>> {
        self.rt.block_on(self.inner.bf_add_multi(key, items))
    }

    /// BF.MEXISTS key item [item ...].
    pub fn bf_exists_multi(&self, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<bool>> {
        self.rt.block_on(self.inner.bf_exists_multi(key, items))
    }

    /// BF.INSERT key [options] ITEMS item [item ...].
    pub fn bf_insert(
        &self,
        key: impl ToArg,
        options: &bloom::InsertOptions,
        items: &[impl ToArg],
    ) -> Result<Vec<i64>> {
        self.rt.block_on(self.inner.bf_insert(key, options, items))
    }

    /// BF.INFO key.
    pub fn bf_info(&self, key: impl ToArg) -> Result<HashMap<String, i64>> {
        self.rt.block_on(self.inner.bf_info(key))
    }

    /// BF.SCANDUMP key iterator.
    pub fn bf_scan_dump(&self, key: impl ToArg, iterator: i64) -> Result<(i64, Bytes)> {
        self.rt.block_on(self.inner.bf_scan_dump(key, iterator))
    }

    /// BF.LOADCHUNK key iterator data.
    pub fn bf_load_chunk(&self, key: impl ToArg, iterator: i64, data: impl ToArg) -> Result<()> {
        self.rt.block_on(self.inner.bf_load_chunk(key, iterator, data))
    }

    /// See [`AsyncClient::bf_dump`].
    pub fn bf_dump(&self, key: impl ToArg) -> Result<Vec<Chunk>> {
        self.rt.block_on(self.inner.bf_dump(key))
    }

    /// See [`AsyncClient::bf_restore`].
    pub fn bf_restore(&self, key: impl ToArg, chunks: &[Chunk]) -> Result<()> {
        self.rt.block_on(self.inner.bf_restore(key, chunks))
    }

    // ── Cuckoo filter ───────────────────────────────────────────────────

    /// CF.RESERVE key capacity.
    pub fn cf_reserve(&self, key: impl ToArg, capacity: u64) -> Result<()> {
        self.rt.block_on(self.inner.cf_reserve(key, capacity))
    }

    /// CF.RESERVE with options.
    pub fn cf_reserve_with(
        &self,
        key: impl ToArg,
        capacity: u64,
        options: &cuckoo::ReserveOptions,
    ) -> Result<()> {
        self.rt
            .block_on(self.inner.cf_reserve_with(key, capacity, options))
    }

    /// CF.ADD key item.
    pub fn cf_add(&self, key: impl ToArg, item: impl ToArg) -> Result<bool> {
        self.rt.block_on(self.inner.cf_add(key, item))
    }

    /// CF.ADDNX key item.
    pub fn cf_add_nx(&self, key: impl ToArg, item: impl ToArg) -> Result<bool> {
        self.rt.block_on(self.inner.cf_add_nx(key, item))
    }

    /// CF.INSERT key [options] ITEMS item [item ...].
    pub fn cf_insert(
        &self,
        key: impl ToArg,
        options: &cuckoo::InsertOptions,
        items: &[impl ToArg],
    ) -> Result<Vec<i64>> {
        self.rt.block_on(self.inner.cf_insert(key, options, items))
    }

    /// CF.INSERTNX key [options] ITEMS item [item ...].
    pub fn cf_insert_nx(
        &self,
        key: impl ToArg,
        options: &cuckoo::InsertOptions,
        items: &[impl ToArg],
    ) -> Result<Vec<i64>> {
        self.rt.block_on(self.inner.cf_insert_nx(key, options, items))
    }

    /// CF.EXISTS key item.
    pub fn cf_exists(&self, key: impl ToArg, item: impl ToArg) -> Result<bool> {
        self.rt.block_on(self.inner.cf_exists(key, item))
    }

    /// CF.DEL key item.
    pub fn cf_del(&self, key: impl ToArg, item: impl ToArg) -> Result<bool> {
        self.rt.block_on(self.inner.cf_del(key, item))
    }

    /// CF.COUNT key item.
    pub fn cf_count(&self, key: impl ToArg, item: impl ToArg) -> Result<i64> {
        self.rt.block_on(self.inner.cf_count(key, item))
    }

    /// CF.SCANDUMP key iterator.
    pub fn cf_scan_dump(&self, key: impl ToArg, iterator: i64) -> Result<(i64, Bytes)> {
        self.rt.block_on(self.inner.cf_scan_dump(key, iterator))
    }

    /// CF.LOADCHUNK key iterator data.
    pub fn cf_load_chunk(&self, key: impl ToArg, iterator: i64, data: impl ToArg) -> Result<()> {
        self.rt.block_on(self.inner.cf_load_chunk(key, iterator, data))
    }

    /// See [`AsyncClient::cf_dump`].
    pub fn cf_dump(&self, key: impl ToArg) -> Result<Vec<Chunk>> {
        self.rt.block_on(self.inner.cf_dump(key))
    }

    /// See [`AsyncClient::cf_restore`].
    pub fn cf_restore(&self, key: impl ToArg, chunks: &[Chunk]) -> Result<()> {
        self.rt.block_on(self.inner.cf_restore(key, chunks))
    }

    /// CF.INFO key.
    pub fn cf_info(&self, key: impl ToArg) -> Result<HashMap<String, i64>> {
        self.rt.block_on(self.inner.cf_info(key))
    }

    // ── Count-Min Sketch ────────────────────────────────────────────────

    /// CMS.INITBYDIM key width depth.
    pub fn cms_init_by_dim(&self, key: impl ToArg, width: u64, depth: u64) -> Result<()> {
        self.rt.block_on(self.inner.cms_init_by_dim(key, width, depth))
    }

    /// CMS.INITBYPROB key error probability.
    pub fn cms_init_by_prob(&self, key: impl ToArg, error: f64, probability: f64) -> Result<()> {
        self.rt
            .block_on(self.inner.cms_init_by_prob(key, error, probability))
    }

    /// CMS.INCRBY key item increment [item increment ...].
    pub fn cms_incr_by(&self, key: impl ToArg, increments: &[(impl ToArg, i64)]) -> Result<Vec<i64>> {
        self.rt.block_on(self.inner.cms_incr_by(key, increments))
    }

    /// CMS.QUERY key item [item ...].
    pub fn cms_query(&self, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<i64>> {
        self.rt.block_on(self.inner.cms_query(key, items))
    }

    /// CMS.MERGE dest numKeys src [src ...] [WEIGHTS w [w ...]].
    pub fn cms_merge(
        &self,
        dest: impl ToArg,
        sources: &[impl ToArg],
        weights: Option<&[i64]>,
    ) -> Result<()> {
        self.rt.block_on(self.inner.cms_merge(dest, sources, weights))
    }

    /// CMS.INFO key.
    pub fn cms_info(&self, key: impl ToArg) -> Result<HashMap<String, i64>> {
        self.rt.block_on(self.inner.cms_info(key))
    }

    // ── Top-K ───────────────────────────────────────────────────────────

    /// TOPK.RESERVE key k width depth decay.
    pub fn topk_reserve(&self, key: impl ToArg, k: u64, width: u64, depth: u64, decay: f64) -> Result<()> {
        self.rt
            .block_on(self.inner.topk_reserve(key, k, width, depth, decay))
    }

    /// TOPK.ADD key item [item ...].
    pub fn topk_add(&self, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<Option<String>>> {
        self.rt.block_on(self.inner.topk_add(key, items))
    }

    /// TOPK.INCRBY key item increment [item increment ...].
    pub fn topk_incr_by(
        &self,
        key: impl ToArg,
        increments: &[(impl ToArg, i64)],
    ) -> Result<Vec<Option<String>>> {
        self.rt.block_on(self.inner.topk_incr_by(key, increments))
    }

    /// TOPK.QUERY key item [item ...].
    pub fn topk_query(&self, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<i64>> {
        self.rt.block_on(self.inner.topk_query(key, items))
    }

    /// TOPK.COUNT key item [item ...].
    pub fn topk_count(&self, key: impl ToArg, items: &[impl ToArg]) -> Result<Vec<i64>> {
        self.rt.block_on(self.inner.topk_count(key, items))
    }

    /// TOPK.LIST key.
    pub fn topk_list(&self, key: impl ToArg) -> Result<Vec<String>> {
        self.rt.block_on(self.inner.topk_list(key))
    }

    /// TOPK.LIST key WITHCOUNT.
    pub fn topk_list_with_count(&self, key: impl ToArg) -> Result<IndexMap<String, i64>> {
        self.rt.block_on(self.inner.topk_list_with_count(key))
    }

    /// TOPK.INFO key.
    pub fn topk_info(&self, key: impl ToArg) -> Result<HashMap<String, String>> {
        self.rt.block_on(self.inner.topk_info(key))
    }

    // ── T-Digest ────────────────────────────────────────────────────────

    /// TDIGEST.CREATE key compression.
    pub fn td_create(&self, key: impl ToArg, compression: u64) -> Result<()> {
        self.rt.block_on(self.inner.td_create(key, compression))
    }

    /// TDIGEST.RESET key.
    pub fn td_reset(&self, key: impl ToArg) -> Result<()> {
        self.rt.block_on(self.inner.td_reset(key))
    }

    /// TDIGEST.ADD key value weight [value weight ...].
    pub fn td_add(&self, key: impl ToArg, samples: &[(f64, f64)]) -> Result<()> {
        self.rt.block_on(self.inner.td_add(key, samples))
    }

    /// TDIGEST.MERGE to-key from-key.
    pub fn td_merge(&self, to_key: impl ToArg, from_key: impl ToArg) -> Result<()> {
        self.rt.block_on(self.inner.td_merge(to_key, from_key))
    }

    /// TDIGEST.MIN key.
    pub fn td_min(&self, key: impl ToArg) -> Result<f64> {
        self.rt.block_on(self.inner.td_min(key))
    }

    /// TDIGEST.MAX key.
    pub fn td_max(&self, key: impl ToArg) -> Result<f64> {
        self.rt.block_on(self.inner.td_max(key))
    }

    /// TDIGEST.QUANTILE key quantile.
    pub fn td_quantile(&self, key: impl ToArg, quantile: f64) -> Result<f64> {
        self.rt.block_on(self.inner.td_quantile(key, quantile))
    }

    /// TDIGEST.CDF key value.
    pub fn td_cdf(&self, key: impl ToArg, value: f64) -> Result<f64> {
        self.rt.block_on(self.inner.td_cdf(key, value))
    }

    /// TDIGEST.INFO key.
    pub fn td_info(&self, key: impl ToArg) -> Result<TDigestInfo> {
        self.rt.block_on(self.inner.td_info(key))
    }

    // ── Server ──────────────────────────────────────────────────────────

    /// FLUSHALL.
    pub fn flush_all(&self) -> Result<()> {
        self.rt.block_on(self.inner.flush_all())
    }

    /// Execute an arbitrary command with raw arguments.
    pub fn execute(&self, args: &[impl ToArg]) -> Result<Value> {
        self.rt.block_on(self.inner.execute(args))
    }
}
