// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! `MockStore` for testing: record store commands and inject failures.

use std::time::Duration;

use remcache::{Cache, MemoryStore, MockStore, StoreOp};
use tick::Clock;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let clock = Clock::new_tokio();
    let store = MockStore::new(MemoryStore::new(clock.clone()));
    let mut cache = Cache::builder(clock).store(store).build();

    // Rejected operations never reach the store
    let _rejected = cache.get("key").await;
    println!("commands while stopped: {}", cache.store().operations().len());

    cache.start().await?;
    cache.set("key", 42, Duration::from_secs(10)).await?;
    let _value = cache.get("key").await?;
    println!("commands: {:?}", cache.store().operations());

    // Inject failures for testing error paths
    cache.store().fail_when(|op| matches!(op, StoreOp::Get(_)));
    match cache.get("key").await {
        Ok(value) => println!("after fail_when: unexpected success {value}"),
        Err(e) => println!("after fail_when: {e}"),
    }

    // Answer writes without acknowledging them
    cache.store().clear_failures();
    cache.store().reply_set_with("QUEUED");
    match cache.set("key", 43, Duration::ZERO).await {
        Ok(_) => println!("after reply_set_with: unexpected success"),
        Err(e) => println!("after reply_set_with: {e}"),
    }

    cache.stop().await?;
    Ok(())
}
