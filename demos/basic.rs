//! Basic usage example for the RedisBloom client.
//!
//! Start a RedisBloom-enabled server on 127.0.0.1:6379, then run:
//!
//! ```sh
//! RUST_LOG=redisbloom=debug cargo run --example basic
//! ```

use redisbloom::{AsyncClient, BloomInsertOptions, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = AsyncClient::connect("127.0.0.1", 6379).await?;

    // Bloom filter
    client.bf_reserve("demo:visitors", 0.01, 10_000).await?;
    client
        .bf_add_multi("demo:visitors", &["alice", "bob", "carol"])
        .await?;
    println!(
        "BF.EXISTS demo:visitors bob -> {}",
        client.bf_exists("demo:visitors", "bob").await?
    );

    let options = BloomInsertOptions::new(1000, 0.001);
    let added = client
        .bf_insert("demo:auto", &options, &["x", "y"])
        .await?;
    println!("BF.INSERT demo:auto -> {:?}", added);

    // Copy a filter chunk by chunk
    let chunks = client.bf_dump("demo:visitors").await?;
    client.bf_restore("demo:visitors-copy", &chunks).await?;
    println!("copied demo:visitors in {} chunks", chunks.len());

    // Count-Min Sketch
    client.cms_init_by_prob("demo:hits", 0.001, 0.01).await?;
    client
        .cms_incr_by("demo:hits", &[("/", 10), ("/about", 2)])
        .await?;
    println!(
        "CMS.QUERY demo:hits -> {:?}",
        client.cms_query("demo:hits", &["/", "/about", "/missing"]).await?
    );

    // Top-K
    client.topk_reserve("demo:trending", 3, 50, 3, 0.9).await?;
    client
        .topk_add("demo:trending", &["rust", "go", "rust", "zig", "rust", "go"])
        .await?;
    for (item, count) in client.topk_list_with_count("demo:trending").await? {
        println!("TOPK {item} -> {count}");
    }

    // T-Digest
    client.td_create("demo:latency", 100).await?;
    client
        .td_add("demo:latency", &[(12.0, 1.0), (15.0, 3.0), (250.0, 1.0)])
        .await?;
    println!(
        "TDIGEST p50 -> {}, p99 -> {}",
        client.td_quantile("demo:latency", 0.5).await?,
        client.td_quantile("demo:latency", 0.99).await?
    );

    Ok(())
}
