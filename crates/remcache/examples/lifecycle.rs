// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Lifecycle events, pausing and structured logs.

use std::time::Duration;

use remcache::{Cache, CacheEvent};
use tick::Clock;
use tracing::Level;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let mut cache = Cache::builder(Clock::new_tokio()).memory().name("lifecycle").enable_logs().build();

    let _id = cache.subscribe(|event| match event {
        CacheEvent::Start { cache } => println!("[{cache}] started"),
        CacheEvent::Stop { cache } => println!("[{cache}] stopped"),
        CacheEvent::Error { cache, error } => println!("[{cache}] error: {error}"),
        _ => {}
    });

    cache.start().await?;
    cache.set("counter", 1, Duration::ZERO).await?;

    // A paused cache stays started but defers delivery until resumed
    let _paused = cache.pause();
    println!("paused: {}, started: {}", cache.is_paused(), cache.is_started());
    let _resumed = cache.resume();

    println!("counter = {}", cache.get("counter").await?);

    // Graceful shutdown waits for in-flight operations
    cache.end().await?;

    // Rejected operations are logged as warnings
    let _rejected = cache.get("counter").await;
    Ok(())
}
