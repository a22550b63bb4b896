// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Redis-backed cache.
//!
//! Reads the endpoint from `REMCACHE_ENDPOINT` (default `redis://127.0.0.1:6379`).

use std::time::Duration;

use remcache::{Cache, CacheConfig};
use tick::Clock;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CacheConfig::from_env();
    println!("connecting to {}", config.endpoint()?);

    let mut cache = Cache::builder(Clock::new_tokio()).config(config).redis()?.name("redis").build();

    if let Err(e) = cache.start().await {
        println!("cannot reach the store: {e}");
        return Ok(());
    }

    cache.set("greeting", "hello", Duration::from_secs(30)).await?;
    println!("greeting = {}", cache.get("greeting").await?);
    println!("ttl = {:?}", cache.get_ttl("greeting").await?);
    println!("stats = {:?}", cache.get_stats().await?);

    cache.remove("greeting").await?;
    cache.end().await?;
    Ok(())
}
