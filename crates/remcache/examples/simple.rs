// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Simple Cache Example
//!
//! Demonstrates the basic lifecycle and data operations on an in-memory store.

use std::time::Duration;

use remcache::Cache;
use serde_json::json;
use tick::Clock;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let clock = Clock::new_tokio();
    let mut cache = Cache::builder(clock).memory().name("simple").build();

    // Operations fail until the cache is started
    let rejected = cache.get("user:1").await;
    println!("before start: {}", rejected.map_or_else(|e| e.to_string(), |v| v.to_string()));

    cache.start().await?;

    // Store a value that expires after a minute
    cache.set("user:1", json!({ "name": "Alice" }), Duration::from_secs(60)).await?;
    println!("user:1 = {}", cache.get("user:1").await?);
    println!("user:1 ttl = {:?}", cache.get_ttl("user:1").await?);

    // Store a value without expiry, then give it one
    cache.set("user:2", "Bob", Duration::ZERO).await?;
    println!("user:2 has ttl: {}", cache.exists_ttl("user:2").await?);
    cache.set_ttl("user:2", Duration::from_secs(30)).await?;
    println!("user:2 has ttl: {}", cache.exists_ttl("user:2").await?);

    println!("keys = {:?}", cache.get_keys().await?);
    println!("stats = {:?}", cache.get_stats().await?);

    // Remove a key, then check it is gone
    cache.remove("user:1").await?;
    println!("user:1 exists: {}", cache.exists("user:1").await?);

    cache.end().await?;
    Ok(())
}
